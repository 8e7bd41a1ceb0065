use reqwest::StatusCode;
use thiserror::Error;

use crate::soap::{ResponseError, SoapFault};

// -----------------------------------------------------------------------------
// ----- CallError -------------------------------------------------------------

/// Failure of a single call on the connection handle.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("service fault: {0}")]
    Fault(SoapFault),

    #[error("http transport error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("unexpected http status {0}")]
    Status(StatusCode),

    #[error("response exceeds the maximum received message size of {limit} bytes")]
    MessageTooLarge { limit: u64 },

    #[error("cannot decode response: {0}")]
    Decode(#[from] ResponseError),

    #[error("tls setup failed: {0}")]
    Tls(String),

    #[error("channel is closed")]
    Closed,

    #[error("channel is faulted")]
    Faulted,
}

impl CallError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CallError::Http(e) if e.is_timeout())
    }
}

// -----------------------------------------------------------------------------
// ----- GatewayError ----------------------------------------------------------

/// The gateway could not be constructed.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("cannot open channel to {endpoint}: {source}")]
    Open {
        endpoint: String,
        #[source]
        source: CallError,
    },
}

// -----------------------------------------------------------------------------
// ----- FailureReason ---------------------------------------------------------

/// Why a login did not produce a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The credential already holds a session opened from another address.
    CredentialInUse,
    /// Unknown login or wrong password.
    InvalidCredentials,
    /// Any other fault raised by the service.
    Rejected,
    /// The service answered without a ticket.
    NoTicket,
    /// Network, timeout, HTTP or decoding problems; the channel may be faulted.
    Transport,
    Cancelled,
    Disposed,
}

impl FailureReason {
    pub fn message(self) -> &'static str {
        match self {
            FailureReason::CredentialInUse => {
                "credential already authenticated from another address"
            }
            FailureReason::InvalidCredentials => "invalid login/password",
            FailureReason::Rejected => "login failed",
            FailureReason::NoTicket => "service returned no ticket",
            FailureReason::Transport => "security service unreachable",
            FailureReason::Cancelled => "login cancelled",
            FailureReason::Disposed => "gateway already disposed",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// -----------------------------------------------------------------------------
// ----- LoginError ------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("credential already authenticated from another address ({0})")]
    CredentialInUse(SoapFault),

    #[error("invalid login/password ({0})")]
    InvalidCredentials(SoapFault),

    #[error("login failed ({0})")]
    Rejected(SoapFault),

    #[error("service returned no ticket")]
    NoTicket,

    #[error(transparent)]
    Transport(CallError),

    #[error("login cancelled")]
    Cancelled,

    #[error("gateway already disposed")]
    Disposed,
}

impl LoginError {
    pub fn reason(&self) -> FailureReason {
        match self {
            LoginError::CredentialInUse(_) => FailureReason::CredentialInUse,
            LoginError::InvalidCredentials(_) => FailureReason::InvalidCredentials,
            LoginError::Rejected(_) => FailureReason::Rejected,
            LoginError::NoTicket => FailureReason::NoTicket,
            LoginError::Transport(_) => FailureReason::Transport,
            LoginError::Cancelled => FailureReason::Cancelled,
            LoginError::Disposed => FailureReason::Disposed,
        }
    }

    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            LoginError::CredentialInUse(f)
            | LoginError::InvalidCredentials(f)
            | LoginError::Rejected(f) => Some(f),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_and_messages_line_up() {
        let fault = SoapFault::new("s:Sender", "SSEG_E029: nope");
        let err = LoginError::InvalidCredentials(fault.clone());

        assert_eq!(err.reason(), FailureReason::InvalidCredentials);
        assert_eq!(err.fault(), Some(&fault));
        assert!(err.to_string().starts_with("invalid login/password"));

        assert_eq!(LoginError::Cancelled.reason().message(), "login cancelled");
        assert!(LoginError::Disposed.fault().is_none());
    }

    #[test]
    fn transport_is_transparent() {
        let err = LoginError::Transport(CallError::Faulted);
        assert_eq!(err.to_string(), "channel is faulted");
        assert_eq!(err.reason(), FailureReason::Transport);
        assert!(!CallError::Closed.is_timeout());
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

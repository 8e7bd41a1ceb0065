use secrecy::SecretString;
use std::future::Future;

use crate::errors::CallError;
use crate::shared_types::{ChannelState, Ticket};
use crate::soap::OutboundHeaders;

// -----------------------------------------------------------------------------
// ----- SecurityService -------------------------------------------------------

/// A connection handle to the remote security service.
///
/// One handle is shared by every call a gateway makes, so implementations
/// must tolerate concurrent `login` calls. `close` and `abort` are
/// synchronous and must never panic.
pub trait SecurityService: Send + Sync {
    /// One remote `Login` invocation. No retries.
    fn login(&self, call: LoginCall) -> impl Future<Output = Result<Ticket, CallError>> + Send;

    fn state(&self) -> ChannelState;

    /// Graceful close. Fails if the channel can no longer be closed cleanly.
    fn close(&self) -> Result<(), CallError>;

    /// Forced close. Always leaves the handle `Closed`.
    fn abort(&self);
}

// -----------------------------------------------------------------------------
// ----- LoginCall -------------------------------------------------------------

/// Arguments of one `Login` call, headers included.
#[derive(Debug, Clone)]
pub struct LoginCall {
    pub login: String,
    pub password: SecretString,
    pub headers: OutboundHeaders,
}

impl LoginCall {
    pub fn new(login: impl Into<String>, password: SecretString, headers: OutboundHeaders) -> Self {
        Self {
            login: login.into(),
            password,
            headers,
        }
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

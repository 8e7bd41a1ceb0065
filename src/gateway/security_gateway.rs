use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::credentials::Credentials;
use crate::config::EndpointSettings;
use crate::errors::{CallError, GatewayError, LoginError};
use crate::shared_types::{ChannelState, Ticket};
use crate::soap::{CALLER_IP_HEADER, OutboundHeaders, ResponseError, SYSTEM_ORIGIN_HEADER};
use crate::transport::{LoginCall, SecurityService, SoapSecurityClient};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// Fault code: the credential is already authenticated from another address.
pub const CREDENTIAL_IN_USE_CODE: &str = "SSEG_E026";

/// Fault code: unknown login or wrong password.
pub const INVALID_CREDENTIALS_CODE: &str = "SSEG_E029";

// -----------------------------------------------------------------------------
// ----- SecurityGateway -------------------------------------------------------

/// Authenticates users against the security service through one long-lived
/// connection handle.
///
/// The gateway owns the handle exclusively. Every failure is logged and
/// returned as a [`LoginError`]; nothing panics and nothing is retried.
#[derive(Debug)]
pub struct SecurityGateway<S: SecurityService> {
    service: S,
    system_id: String,
    disposed: AtomicBool,
}

// -----------------------------------------------------------------------------
// ----- SecurityGateway: Static -----------------------------------------------

impl SecurityGateway<SoapSecurityClient> {
    /// Opens the SOAP channel described by `settings`. Fails fast: a gateway
    /// that cannot reach a usable handle is never handed out.
    pub fn connect(settings: &EndpointSettings) -> Result<Self, GatewayError> {
        match SoapSecurityClient::open(settings) {
            Ok(client) => {
                info!(endpoint = %settings.endpoint, "security gateway started");
                Ok(Self::new(client, settings.system_id.clone()))
            }
            Err(e) => {
                error!(endpoint = %settings.endpoint, "failed to start security gateway: {e}");
                Err(GatewayError::Open {
                    endpoint: settings.endpoint.to_string(),
                    source: e,
                })
            }
        }
    }
}

impl<S: SecurityService> SecurityGateway<S> {
    pub fn new(service: S, system_id: impl Into<String>) -> Self {
        Self {
            service,
            system_id: system_id.into(),
            disposed: AtomicBool::new(false),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- SecurityGateway: Public -----------------------------------------------

impl<S: SecurityService> SecurityGateway<S> {
    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// True while the gateway can still issue calls.
    pub fn is_usable(&self) -> bool {
        !self.is_disposed() && self.service.state() == ChannelState::Opened
    }

    /// Logs in on behalf of the user at `caller_ip`.
    ///
    /// Setting `cancel` to `true` only abandons the local wait: the request is
    /// dropped, but the service may still complete the login on its side.
    pub async fn login(
        &self,
        credentials: &Credentials,
        caller_ip: &str,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<Ticket, LoginError> {
        if self.is_disposed() {
            let err = LoginError::Disposed;
            error!(login = %credentials.login, "login error: {err}");
            return Err(err);
        }

        let mut headers = OutboundHeaders::new();
        headers.set(SYSTEM_ORIGIN_HEADER, &self.system_id);
        headers.set(CALLER_IP_HEADER, caller_ip);

        let call = LoginCall::new(
            credentials.login.clone(),
            credentials.password.clone(),
            headers,
        );
        let pending = self.service.login(call);

        let outcome = match cancel {
            Some(mut cancel) => tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => Err(LoginError::Cancelled),
                res = pending => res.map_err(classify),
            },
            None => pending.await.map_err(classify),
        };

        match &outcome {
            Ok(_) => debug!(login = %credentials.login, caller_ip, "login succeeded"),
            Err(err) => log_failure(&credentials.login, caller_ip, err),
        }

        outcome
    }

    /// Releases the connection handle. Tries a graceful close first and
    /// aborts if that fails. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Err(e) = self.service.close() {
            warn!("graceful close failed, aborting channel: {e}");
            self.service.abort();
        }
    }
}

impl<S: SecurityService> Drop for SecurityGateway<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

/// Resolves once the flag turns `true`. A dropped sender never cancels.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|set| *set).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// E029 takes precedence when a fault mentions both codes.
fn classify(err: CallError) -> LoginError {
    match err {
        CallError::Fault(fault) if fault.mentions(INVALID_CREDENTIALS_CODE) => {
            LoginError::InvalidCredentials(fault)
        }
        CallError::Fault(fault) if fault.mentions(CREDENTIAL_IN_USE_CODE) => {
            LoginError::CredentialInUse(fault)
        }
        CallError::Fault(fault) => LoginError::Rejected(fault),
        CallError::Decode(ResponseError::NilTicket) => LoginError::NoTicket,
        other => LoginError::Transport(other),
    }
}

fn log_failure(login: &str, caller_ip: &str, err: &LoginError) {
    let reason = err.reason();

    match err {
        LoginError::Transport(e) => error!(
            login,
            caller_ip,
            timeout = e.is_timeout(),
            "login error: {e}"
        ),
        _ => match err.fault() {
            Some(fault) => error!(
                login,
                caller_ip,
                fault_code = %fault.code,
                fault = %fault.reason,
                "login error: {reason}"
            ),
            None => error!(login, caller_ip, "login error: {reason}"),
        },
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

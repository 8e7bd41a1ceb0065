use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use reqwest::{Response, Url, header::CONTENT_TYPE};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use super::service::{LoginCall, SecurityService};
use crate::config::EndpointSettings;
use crate::errors::CallError;
use crate::shared_types::{ChannelState, Ticket};
use crate::soap::{LoginEnvelope, LoginReply, decode_login_reply};
use crate::tls;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const USER_AGENT: &str = concat!("sseg-gateway/", env!("CARGO_PKG_VERSION"));

// -----------------------------------------------------------------------------
// ----- SoapSecurityClient ----------------------------------------------------

/// SOAP 1.2 over HTTP(S) connection handle.
#[derive(Debug)]
pub struct SoapSecurityClient {
    endpoint: Url,
    action: String,
    service_namespace: String,
    header_namespace: String,
    max_received_message_size: Option<u64>,
    channel: Mutex<Channel>,
}

#[derive(Debug)]
struct Channel {
    http: Option<reqwest::Client>,
    state: ChannelState,
}

// -----------------------------------------------------------------------------
// ----- SoapSecurityClient: Static --------------------------------------------

impl SoapSecurityClient {
    pub fn open(settings: &EndpointSettings) -> Result<Self, CallError> {
        let mut builder = reqwest::Client::builder()
            .timeout(settings.send_timeout)
            .user_agent(USER_AGENT)
            .https_only(settings.security_mode.requires_https());

        if let Some(tls) = tls::client_config(settings.ca_file.as_deref()).map_err(CallError::Tls)? {
            builder = builder.use_preconfigured_tls(tls);
        }

        let http = builder.build().map_err(CallError::Http)?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            action: settings.action.clone(),
            service_namespace: settings.service_namespace.clone(),
            header_namespace: settings.header_namespace.clone(),
            max_received_message_size: settings.max_received_message_size,
            channel: Mutex::new(Channel {
                http: Some(http),
                state: ChannelState::Opened,
            }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

// -----------------------------------------------------------------------------
// ----- SoapSecurityClient: SecurityService -----------------------------------

impl SecurityService for SoapSecurityClient {
    async fn login(&self, call: LoginCall) -> Result<Ticket, CallError> {
        let http = self.http_client()?;

        let envelope = LoginEnvelope {
            action: &self.action,
            to: self.endpoint.as_str(),
            service_namespace: &self.service_namespace,
            header_namespace: &self.header_namespace,
            headers: &call.headers,
            login: &call.login,
            password: call.password.expose_secret(),
        };
        let content_type = envelope.content_type();
        let payload = envelope.to_bytes();

        let response = http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, content_type)
            .body(payload)
            .send()
            .await
            .map_err(|e| self.fault(e))?;

        let status = response.status();
        let body = self.read_body(response).await?;
        debug!(status = status.as_u16(), bytes = body.len(), "login response received");

        match decode_login_reply(&body) {
            Ok(LoginReply::Ticket(ticket)) if status.is_success() => Ok(ticket),
            Ok(LoginReply::Ticket(_)) => Err(CallError::Status(status)),
            Ok(LoginReply::Fault(fault)) => Err(CallError::Fault(fault)),
            Err(_) if !status.is_success() => Err(CallError::Status(status)),
            Err(e) => Err(CallError::Decode(e)),
        }
    }

    fn state(&self) -> ChannelState {
        self.channel.lock().state
    }

    fn close(&self) -> Result<(), CallError> {
        let mut channel = self.channel.lock();
        match channel.state {
            ChannelState::Opened => {
                channel.http = None;
                channel.state = ChannelState::Closed;
                Ok(())
            }
            ChannelState::Closed => Ok(()),
            ChannelState::Faulted => Err(CallError::Faulted),
        }
    }

    fn abort(&self) {
        let mut channel = self.channel.lock();
        channel.http = None;
        channel.state = ChannelState::Closed;
    }
}

// -----------------------------------------------------------------------------
// ----- SoapSecurityClient: Private -------------------------------------------

impl SoapSecurityClient {
    fn http_client(&self) -> Result<reqwest::Client, CallError> {
        let channel = self.channel.lock();
        match (channel.state, channel.http.as_ref()) {
            (ChannelState::Opened, Some(http)) => Ok(http.clone()),
            (ChannelState::Faulted, _) => Err(CallError::Faulted),
            _ => Err(CallError::Closed),
        }
    }

    /// Transport errors leave the channel unusable.
    fn fault(&self, err: reqwest::Error) -> CallError {
        let mut channel = self.channel.lock();
        if channel.state == ChannelState::Opened {
            warn!(endpoint = %self.endpoint, "channel faulted: {err}");
            channel.state = ChannelState::Faulted;
        }
        CallError::Http(err)
    }

    async fn read_body(&self, mut response: Response) -> Result<Bytes, CallError> {
        let limit = self.max_received_message_size;

        if let (Some(limit), Some(len)) = (limit, response.content_length()) {
            if len > limit {
                return Err(CallError::MessageTooLarge { limit });
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.fault(e))? {
            if let Some(limit) = limit {
                if (body.len() + chunk.len()) as u64 > limit {
                    return Err(CallError::MessageTooLarge { limit });
                }
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

pub mod config;
pub mod errors;
pub mod gateway;
pub mod shared_types;
pub mod soap;
pub mod tls;
pub mod transport;

pub use config::{Config, EndpointSettings, SecurityMode};
pub use errors::{CallError, FailureReason, GatewayError, LoginError};
pub use gateway::{Credentials, SecurityGateway};
pub use shared_types::{ChannelState, Ticket};
pub use transport::{LoginCall, SecurityService, SoapSecurityClient};

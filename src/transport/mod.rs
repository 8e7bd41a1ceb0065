pub mod service;
pub mod soap_client;

pub use service::{LoginCall, SecurityService};
pub use soap_client::SoapSecurityClient;

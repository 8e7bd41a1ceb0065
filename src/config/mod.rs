pub mod cli;
#[allow(clippy::module_inception)]
pub mod config;
pub mod endpoint;
pub mod types;

pub use config::Config;
pub use endpoint::{EndpointError, EndpointSettings};
pub use types::{LogLevel, SecurityMode};

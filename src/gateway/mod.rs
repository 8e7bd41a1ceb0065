pub mod credentials;
pub mod security_gateway;

pub use credentials::Credentials;
pub use security_gateway::{CREDENTIAL_IN_USE_CODE, INVALID_CREDENTIALS_CODE, SecurityGateway};

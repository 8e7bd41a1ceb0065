//! SOAP 1.2 codec for the security service's `Login` operation.

pub mod envelope;
pub mod headers;
pub mod response;
pub mod xml;

pub use envelope::LoginEnvelope;
pub use headers::{CALLER_IP_HEADER, OutboundHeaders, SYSTEM_ORIGIN_HEADER};
pub use response::{LoginReply, ResponseError, SoapFault, decode_login_reply};

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use super::headers::OutboundHeaders;
use super::xml::escape;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const SOAP12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const ADDRESSING_NS: &str = "http://www.w3.org/2005/08/addressing";

pub const CONTENT_TYPE_SOAP12: &str = "application/soap+xml; charset=utf-8";

const LOGIN_OPERATION: &str = "Login";
const LOGIN_PARAM: &str = "login";
const PASSWORD_PARAM: &str = "senha";

// -----------------------------------------------------------------------------
// ----- LoginEnvelope ---------------------------------------------------------

/// A SOAP 1.2 `Login` request with WS-Addressing headers.
#[derive(Debug)]
pub struct LoginEnvelope<'a> {
    pub action: &'a str,
    pub to: &'a str,
    pub service_namespace: &'a str,
    pub header_namespace: &'a str,
    pub headers: &'a OutboundHeaders,
    pub login: &'a str,
    pub password: &'a str,
}

impl LoginEnvelope<'_> {
    pub fn content_type(&self) -> String {
        format!("{CONTENT_TYPE_SOAP12}; action=\"{}\"", self.action)
    }

    pub fn to_bytes(&self) -> Bytes {
        self.to_bytes_with_id(&message_id())
    }

    fn to_bytes_with_id(&self, message_id: &str) -> Bytes {
        let mut buf = BytesMut::with_capacity(1024);

        put_str(&mut buf, "<s:Envelope xmlns:s=\"");
        put_str(&mut buf, SOAP12_NS);
        put_str(&mut buf, "\" xmlns:a=\"");
        put_str(&mut buf, ADDRESSING_NS);
        put_str(&mut buf, "\"><s:Header>");

        put_str(&mut buf, "<a:Action s:mustUnderstand=\"1\">");
        put_str(&mut buf, &escape(self.action));
        put_str(&mut buf, "</a:Action>");

        put_str(&mut buf, "<a:MessageID>");
        put_str(&mut buf, message_id);
        put_str(&mut buf, "</a:MessageID>");

        put_str(&mut buf, "<a:To s:mustUnderstand=\"1\">");
        put_str(&mut buf, &escape(self.to));
        put_str(&mut buf, "</a:To>");

        for header in self.headers.iter() {
            buf.put_u8(b'<');
            put_str(&mut buf, &header.name);
            put_str(&mut buf, " xmlns=\"");
            put_str(&mut buf, &escape(self.header_namespace));
            put_str(&mut buf, "\">");
            put_str(&mut buf, &escape(&header.value));
            put_str(&mut buf, "</");
            put_str(&mut buf, &header.name);
            buf.put_u8(b'>');
        }

        put_str(&mut buf, "</s:Header><s:Body>");

        buf.put_u8(b'<');
        put_str(&mut buf, LOGIN_OPERATION);
        put_str(&mut buf, " xmlns=\"");
        put_str(&mut buf, &escape(self.service_namespace));
        put_str(&mut buf, "\">");
        put_element(&mut buf, LOGIN_PARAM, self.login);
        put_element(&mut buf, PASSWORD_PARAM, self.password);
        put_str(&mut buf, "</");
        put_str(&mut buf, LOGIN_OPERATION);
        buf.put_u8(b'>');

        put_str(&mut buf, "</s:Body></s:Envelope>");

        buf.freeze()
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

#[inline]
fn put_str(buf: &mut BytesMut, s: &str) {
    buf.extend_from_slice(s.as_bytes());
}

#[inline]
fn put_element(buf: &mut BytesMut, name: &str, text: &str) {
    buf.put_u8(b'<');
    put_str(buf, name);
    buf.put_u8(b'>');
    put_str(buf, &escape(text));
    put_str(buf, "</");
    put_str(buf, name);
    buf.put_u8(b'>');
}

/// Random (v4) UUID in `urn:uuid:` form.
fn message_id() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

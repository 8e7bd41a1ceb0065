use thiserror::Error;

use super::xml::{self, Element, XmlError};
use crate::shared_types::Ticket;

// -----------------------------------------------------------------------------
// ----- LoginReply ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginReply {
    Ticket(Ticket),
    Fault(SoapFault),
}

/// Decodes a `Login` response envelope (SOAP 1.1 or 1.2).
pub fn decode_login_reply(body: &[u8]) -> Result<LoginReply, ResponseError> {
    let envelope_body = xml::find_element(body, "Body")?.ok_or(ResponseError::MissingBody)?;

    if let Some(fault) = envelope_body.find("Fault")? {
        return SoapFault::from_element(&fault).map(LoginReply::Fault);
    }

    let Some(response) = envelope_body.find("LoginResponse")? else {
        let first = envelope_body
            .children()?
            .first()
            .map(|e| String::from_utf8_lossy(e.local_name()).into_owned())
            .unwrap_or_default();
        return Err(ResponseError::UnexpectedBody(first));
    };

    let result = response.find("LoginResult")?.ok_or(ResponseError::NilTicket)?;
    if result.is_nil() {
        return Err(ResponseError::NilTicket);
    }

    ticket_from_element(&result).map(LoginReply::Ticket)
}

fn ticket_from_element(result: &Element<'_>) -> Result<Ticket, ResponseError> {
    let mut fields = Vec::new();
    for child in result.children()? {
        if child.is_nil() {
            continue;
        }
        let name = String::from_utf8_lossy(child.local_name()).into_owned();
        fields.push((name, child.text()?));
    }

    let raw = std::str::from_utf8(result.inner())
        .map_err(XmlError::InvalidUtf8)?
        .trim()
        .to_string();

    Ok(Ticket::new(raw, fields))
}

// -----------------------------------------------------------------------------
// ----- SoapFault -------------------------------------------------------------

/// A fault returned by the remote service in place of a result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapFault {
    pub code: String,
    pub reason: String,
    pub detail: Option<String>,
}

impl SoapFault {
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: reason.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Case-insensitive search for `needle` in the reason and detail text.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_uppercase();
        self.reason.to_uppercase().contains(&needle)
            || self
                .detail
                .as_deref()
                .is_some_and(|d| d.to_uppercase().contains(&needle))
    }

    fn from_element(fault: &Element<'_>) -> Result<Self, ResponseError> {
        // SOAP 1.2: Code/Value, Reason/Text, Detail
        // SOAP 1.1: faultcode, faultstring, detail
        // Direct children only; detail payloads may reuse these names.
        let code = match fault.child("Code")? {
            Some(code) => code.child("Value")?.map(|v| v.text()).transpose()?,
            None => fault.child("faultcode")?.map(|v| v.text()).transpose()?,
        };
        let reason = match fault.child("Reason")? {
            Some(reason) => reason.child("Text")?.map(|t| t.text()).transpose()?,
            None => fault.child("faultstring")?.map(|v| v.text()).transpose()?,
        };
        let detail = match fault.child("Detail")? {
            Some(d) => Some(d.spaced_text()?),
            None => fault.child("detail")?.map(|d| d.spaced_text()).transpose()?,
        };

        Ok(Self {
            code: code.map(|c| c.trim().to_string()).unwrap_or_default(),
            reason: reason.map(|r| r.trim().to_string()).unwrap_or_default(),
            detail: detail
                .map(|d| collapse_whitespace(&d))
                .filter(|d| !d.is_empty()),
        })
    }
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "[{}] {}", self.code, self.reason)
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response has no SOAP Body")]
    MissingBody,

    #[error("unexpected element <{0}> in SOAP Body")]
    UnexpectedBody(String),

    #[error("service returned no ticket")]
    NilTicket,

    #[error("malformed XML: {0}")]
    Xml(#[from] XmlError),
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

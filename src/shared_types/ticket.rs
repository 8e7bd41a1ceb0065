// -----------------------------------------------------------------------------
// ----- Ticket ----------------------------------------------------------------

/// Authentication ticket issued by the security service.
///
/// Opaque to the gateway: the raw `LoginResult` payload is kept verbatim and
/// its direct child elements are exposed as ordered name/text pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ticket {
    raw: String,
    fields: Vec<(String, String)>,
}

impl Ticket {
    pub fn new(raw: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            raw: raw.into(),
            fields,
        }
    }

    /// Ticket without a raw payload, mostly useful for stub services.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            raw: String::new(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn raw_xml(&self) -> &str {
        &self.raw
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

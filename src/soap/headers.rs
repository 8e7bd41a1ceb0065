use smallvec::SmallVec;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

/// Identifies the calling system.
pub const SYSTEM_ORIGIN_HEADER: &str = "sistemaOrigem";

/// IP address of the end user the login is made on behalf of.
pub const CALLER_IP_HEADER: &str = "origemIP";

// -----------------------------------------------------------------------------
// ----- OutboundHeaders -------------------------------------------------------

/// Custom SOAP headers attached to a single outgoing call.
///
/// Passed explicitly with each call; nothing is shared between calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutboundHeaders {
    entries: SmallVec<[OutboundHeader; 2]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundHeader {
    pub name: String,
    pub value: String,
}

impl OutboundHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`. Empty values are ignored and leave any previous
    /// value in place. Returns whether the header was stored.
    pub fn set(&mut self, name: impl Into<String>, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }

        let name = name.into();
        match self.entries.iter_mut().find(|h| h.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.entries.push(OutboundHeader {
                name,
                value: value.to_string(),
            }),
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutboundHeader> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

// -----------------------------------------------------------------------------
// ----- ChannelState ----------------------------------------------------------

/// Lifecycle of the connection handle to the security service.
///
/// A channel starts `Opened` and only ever moves forward: a transport error
/// faults it, a close or abort closes it. Nothing reopens a channel; callers
/// needing a fresh one build a new gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Accepting calls.
    Opened,

    /// A transport-level error occurred. Calls are refused and a graceful
    /// close is no longer possible, only an abort.
    Faulted,

    /// Closed or aborted. Terminal.
    Closed,
}

impl ChannelState {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelState::Opened => "opened",
            ChannelState::Faulted => "faulted",
            ChannelState::Closed => "closed",
        }
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

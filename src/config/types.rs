use serde::Deserialize;

// -------------------------------------------------------------------------------------------------
// ---- LogLevel -----------------------------------------------------------------------------------

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

// -------------------------------------------------------------------------------------------------
// ---- SecurityMode -------------------------------------------------------------------------------

/// How the channel to the security service is protected.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecurityMode {
    /// HTTPS only. Plain `http://` endpoints are rejected.
    #[default]
    Transport,

    /// No transport security. Meant for local stubs.
    None,
}

impl SecurityMode {
    pub fn requires_https(self) -> bool {
        matches!(self, SecurityMode::Transport)
    }
}

// -------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

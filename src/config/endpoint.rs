use reqwest::Url;
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tokio::fs;

use super::types::SecurityMode;

// -----------------------------------------------------------------------------
// ----- Defaults --------------------------------------------------------------

pub const DEFAULT_SYSTEM_ID: &str = "SISTEMA";
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(25);
pub const DEFAULT_ACTION: &str = "http://tempuri.org/ISeguranca/Login";
pub const DEFAULT_SERVICE_NAMESPACE: &str = "http://tempuri.org/";
pub const DEFAULT_HEADER_NAMESPACE: &str = "ns";

// -----------------------------------------------------------------------------
// ----- EndpointSettings ------------------------------------------------------

/// Everything needed to open a channel to the security service.
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    pub endpoint: Url,
    pub system_id: String,
    pub send_timeout: Duration,
    pub security_mode: SecurityMode,
    /// `None` means unbounded.
    pub max_received_message_size: Option<u64>,
    pub ca_file: Option<PathBuf>,
    pub action: String,
    pub service_namespace: String,
    pub header_namespace: String,
}

// -----------------------------------------------------------------------------
// ----- EndpointSettings: Static ----------------------------------------------

impl EndpointSettings {
    /// Settings for `endpoint` with every other field at its default.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            system_id: DEFAULT_SYSTEM_ID.to_string(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            security_mode: SecurityMode::default(),
            max_received_message_size: None,
            ca_file: None,
            action: DEFAULT_ACTION.to_string(),
            service_namespace: DEFAULT_SERVICE_NAMESPACE.to_string(),
            header_namespace: DEFAULT_HEADER_NAMESPACE.to_string(),
        }
    }

    pub async fn from_file_async(path: &Path) -> Result<EndpointSettings, EndpointError> {
        let raw = fs::read_to_string(path).await.map_err(|e| EndpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<EndpointSettings, EndpointError> {
        let doc: EndpointFile =
            toml::from_str(raw).map_err(|e| EndpointError::Toml { source: e })?;

        let endpoint = Url::parse(doc.endpoint.trim()).map_err(|e| EndpointError::InvalidUrl {
            url: doc.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let mut settings = Self::new(endpoint);
        settings.security_mode = doc.security_mode;
        settings.max_received_message_size = doc.max_received_message_size;
        settings.ca_file = doc.ca_file;

        if let Some(system_id) = doc.system_id {
            settings.system_id = system_id;
        }
        if let Some(timeout) = doc.send_timeout {
            settings.send_timeout = timeout;
        }
        if let Some(action) = doc.action {
            settings.action = action;
        }
        if let Some(ns) = doc.service_namespace {
            settings.service_namespace = ns;
        }
        if let Some(ns) = doc.header_namespace {
            settings.header_namespace = ns;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EndpointError> {
        match self.endpoint.scheme() {
            "https" => {}
            "http" if !self.security_mode.requires_https() => {}
            scheme => {
                return Err(EndpointError::InsecureScheme {
                    scheme: scheme.to_string(),
                });
            }
        }

        if self.system_id.trim().is_empty() {
            return Err(EndpointError::InvalidField("system_id".into()));
        }
        if self.send_timeout.is_zero() {
            return Err(EndpointError::InvalidField("send_timeout".into()));
        }
        if self.max_received_message_size == Some(0) {
            return Err(EndpointError::InvalidField(
                "max_received_message_size".into(),
            ));
        }
        if self.action.trim().is_empty() {
            return Err(EndpointError::InvalidField("action".into()));
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- Internal: On-disk format ----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EndpointFile {
    #[serde(alias = "url")]
    endpoint: String,

    #[serde(default)]
    system_id: Option<String>,

    #[serde(default, deserialize_with = "de_duration")]
    send_timeout: Option<Duration>,

    #[serde(default)]
    security_mode: SecurityMode,

    #[serde(default)]
    max_received_message_size: Option<u64>,

    #[serde(default)]
    ca_file: Option<PathBuf>,

    #[serde(default)]
    action: Option<String>,

    #[serde(default)]
    service_namespace: Option<String>,

    #[serde(default)]
    header_namespace: Option<String>,
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

/// Human-readable durations, e.g. "25s", "1m 30s", "500ms".
fn de_duration<'de, D>(d: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<String> = Option::deserialize(d)?;
    raw.map(|s| humantime::parse_duration(s.trim()).map_err(D::Error::custom))
        .transpose()
}

// -----------------------------------------------------------------------------
// ----- Errors ----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("scheme '{scheme}' not allowed; transport security requires https")]
    InsecureScheme { scheme: String },

    #[error("invalid or missing field '{0}'")]
    InvalidField(String),

    #[error("read error for {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("toml parse error: {source}")]
    Toml { source: toml::de::Error },
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_tmp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn minimal_file_takes_defaults() {
        let tmp = write_tmp(r#"endpoint = "https://testeappsre/SVC_Seguranca/Seguranca.svc""#);
        let settings = EndpointSettings::from_file_async(tmp.path()).await.unwrap();

        assert_eq!(settings.endpoint.host_str(), Some("testeappsre"));
        assert_eq!(settings.system_id, "SISTEMA");
        assert_eq!(settings.send_timeout, Duration::from_secs(25));
        assert_eq!(settings.security_mode, SecurityMode::Transport);
        assert_eq!(settings.max_received_message_size, None);
        assert_eq!(settings.header_namespace, "ns");
        assert_eq!(settings.action, DEFAULT_ACTION);
    }

    #[tokio::test]
    async fn full_file_overrides_everything() {
        let toml = r#"
            url = "http://127.0.0.1:8080/Seguranca.svc"
            system_id = "BOLETO"
            send_timeout = "1m 30s"
            security_mode = "none"
            max_received_message_size = 65536
            ca_file = "/etc/sseg/ca.pem"
            action = "urn:sseg/Login"
            service_namespace = "urn:sseg"
            header_namespace = "urn:sseg:headers"
        "#;

        let tmp = write_tmp(toml);
        let settings = EndpointSettings::from_file_async(tmp.path()).await.unwrap();

        assert_eq!(settings.system_id, "BOLETO");
        assert_eq!(settings.send_timeout, Duration::from_secs(90));
        assert_eq!(settings.security_mode, SecurityMode::None);
        assert_eq!(settings.max_received_message_size, Some(65536));
        assert_eq!(settings.ca_file, Some(PathBuf::from("/etc/sseg/ca.pem")));
        assert_eq!(settings.action, "urn:sseg/Login");
        assert_eq!(settings.service_namespace, "urn:sseg");
        assert_eq!(settings.header_namespace, "urn:sseg:headers");
    }

    #[test]
    fn transport_mode_rejects_plain_http() {
        let err = EndpointSettings::parse(r#"endpoint = "http://sseg.local/Seguranca.svc""#)
            .unwrap_err();
        match err {
            EndpointError::InsecureScheme { scheme } => assert_eq!(scheme, "http"),
            other => panic!("expected InsecureScheme, got {other}"),
        }
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            EndpointSettings::parse(r#"endpoint = "not a url""#),
            Err(EndpointError::InvalidUrl { .. })
        ));
        assert!(matches!(
            EndpointSettings::parse(
                r#"
                endpoint = "https://sseg.local/"
                send_timeout = "soon"
                "#
            ),
            Err(EndpointError::Toml { .. })
        ));
        assert!(matches!(
            EndpointSettings::parse(
                r#"
                endpoint = "https://sseg.local/"
                system_id = "  "
                "#
            ),
            Err(EndpointError::InvalidField(f)) if f == "system_id"
        ));
        assert!(matches!(
            EndpointSettings::parse(
                r#"
                endpoint = "https://sseg.local/"
                retries = 3
                "#
            ),
            Err(EndpointError::Toml { .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = EndpointSettings::from_file_async(Path::new("/nonexistent/sseg.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, EndpointError::Io { .. }));
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

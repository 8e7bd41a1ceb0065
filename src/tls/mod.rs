use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use tokio_rustls::rustls::pki_types::CertificateDer;
use tokio_rustls::rustls::{ClientConfig, RootCertStore, crypto};
use tracing::debug;

// -----------------------------------------------------------------------------
// ----- TLS: Exported ---------------------------------------------------------

/// Client TLS config trusting only the certificates in `ca_file`.
///
/// Returns `None` when no CA file is configured; the HTTP client then falls
/// back to its bundled web PKI roots.
pub fn client_config(ca_file: Option<&Path>) -> Result<Option<ClientConfig>, String> {
    let Some(ca_file) = ca_file else {
        return Ok(None);
    };

    let certs = load_certs(ca_file)?;

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if added == 0 {
        return Err(format!(
            "no usable CA certificates in {} ({ignored} rejected)",
            ca_file.display()
        ));
    }
    debug!("trusting {added} CA certificates from {}", ca_file.display());

    let provider = Arc::new(crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| format!("invalid tls protocol config: {e}"))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Some(config))
}

// -----------------------------------------------------------------------------
// ----- TLS: Private helpers --------------------------------------------------

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, String> {
    let file =
        File::open(path).map_err(|e| format!("failed to open tls ca {}: {e}", path.display()))?;
    let mut reader = BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("failed to read tls ca {}: {e}", path.display()))?;

    if certs.is_empty() {
        return Err(format!("no certificates found in {}", path.display()));
    }

    Ok(certs)
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

use parking_lot::RwLock;
use secrecy::SecretString;
use std::sync::{Arc, OnceLock};

use super::{cli::CliConfig, endpoint::EndpointSettings, types::LogLevel};

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static ROOT_CONFIG: OnceLock<Arc<RwLock<Config>>> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- Config ----------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Config {
    pub endpoint: EndpointSettings,
    pub log_level: LogLevel,
    pub login: String,
    pub password: SecretString,
    pub caller_ip: String,
}

// -----------------------------------------------------------------------------
// ----- Config: Static --------------------------------------------------------

impl Config {
    /// Async because the endpoint file is read with non-blocking IO.
    /// Panics on any error; do not continue with a bad state.
    pub async fn init() {
        CliConfig::init();

        Self::load().await;
    }

    pub fn snapshot() -> Config {
        Self::handle().read().clone()
    }
}

// -----------------------------------------------------------------------------
// ----- Config: Private -------------------------------------------------------

impl Config {
    async fn load() {
        let cli = CliConfig::snapshot();
        let path = &cli.config_file_location;

        let endpoint = EndpointSettings::from_file_async(path)
            .await
            .unwrap_or_else(|e| panic!("failed to load endpoint config from {:?}: {e}", path));

        let next = Config {
            endpoint,
            log_level: cli.log_level,
            login: cli.login,
            password: cli.password,
            caller_ip: cli.caller_ip,
        };

        if let Some(handle) = ROOT_CONFIG.get() {
            *handle.write() = next;
        } else {
            let _ = ROOT_CONFIG.set(Arc::new(RwLock::new(next)));
        }
    }

    fn handle() -> Arc<RwLock<Config>> {
        ROOT_CONFIG
            .get()
            .expect("Config not initialized; call Config::init().await first")
            .clone()
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

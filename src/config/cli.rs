use clap::Parser;
use parking_lot::RwLock;
use secrecy::SecretString;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use super::types::LogLevel;

// -----------------------------------------------------------------------------
// ----- Global Singleton ------------------------------------------------------

static CLI_CONFIG: OnceLock<Arc<RwLock<CliConfig>>> = OnceLock::new();

// -----------------------------------------------------------------------------
// ----- CliConfig -------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub config_file_location: PathBuf,
    pub log_level: LogLevel,
    pub login: String,
    pub password: SecretString,
    pub caller_ip: String,
}

impl CliConfig {
    pub fn init() {
        CLI_CONFIG.get_or_init(|| {
            let cfg = Self::from_args();
            cfg.validate();
            Arc::new(RwLock::new(cfg))
        });
    }

    pub fn snapshot() -> CliConfig {
        handle().read().clone()
    }
}

// -----------------------------------------------------------------------------
// ----- CliConfig: Private ----------------------------------------------------

impl CliConfig {
    fn from_args() -> Self {
        let args = Args::try_parse().unwrap_or_else(|e| e.exit());

        Self {
            config_file_location: args.config_file,
            log_level: args.log_level,
            login: args.login,
            password: SecretString::new(args.password.into_boxed_str()),
            caller_ip: args.caller_ip.unwrap_or_default(),
        }
    }

    fn validate(&self) {
        must_exist_file(&self.config_file_location, "--config / sseg.toml");

        if self.login.trim().is_empty() {
            panic!("--login / SSEG_LOGIN must not be empty");
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Args ------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sseg-gateway",
    version,
    about = "Log in against the SSEG security service"
)]
struct Args {
    // Must exist; no defaults.
    #[arg(long = "config", short = 'c', env = "SSEG_CONFIG_FILE")]
    config_file: PathBuf,

    // Not required via CLI or ENV (defaults to info).
    #[arg(long = "log", default_value = "info")]
    log_level: LogLevel,

    #[arg(long = "login", short = 'l', env = "SSEG_LOGIN")]
    login: String,

    // Hidden; prefer the ENV so it never shows up in `ps` or shell history.
    #[arg(long = "password", env = "SSEG_PASSWORD", hide_env_values = true, hide = true)]
    password: String,

    // Optional; when absent the origemIP header is not sent.
    #[arg(long = "caller-ip", env = "SSEG_CALLER_IP")]
    caller_ip: Option<String>,
}

// -----------------------------------------------------------------------------
// ----- Private Utils ---------------------------------------------------------

fn handle() -> Arc<RwLock<CliConfig>> {
    CLI_CONFIG
        .get()
        .expect("cli config not initialized; call CliConfig::init() first")
        .clone()
}

fn must_exist_file(path: &Path, hint: &str) {
    let md = fs::metadata(path).unwrap_or_else(|_| {
        panic!("required file missing: {} (from {hint})", path.display());
    });

    if !md.is_file() {
        panic!("path is not a file: {} (from {hint})", path.display());
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "sseg-gateway",
            "--config",
            "sseg.toml",
            "--login",
            "alice",
            "--password",
            "pw123",
            "--caller-ip",
            "10.0.0.5",
            "--log",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.config_file, PathBuf::from("sseg.toml"));
        assert_eq!(args.log_level, LogLevel::Debug);
        assert_eq!(args.login, "alice");
        assert_eq!(args.caller_ip.as_deref(), Some("10.0.0.5"));

        let secret = SecretString::new(args.password.into_boxed_str());
        assert_eq!(secret.expose_secret(), "pw123");
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

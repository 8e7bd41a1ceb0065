use std::process::ExitCode;

use tokio::{signal, sync::watch};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use sseg_gateway::{Config, Credentials, SecurityGateway};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "sseg-gateway";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    setup().await;
    run_once().await
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

async fn setup() {
    // This has to be the first thing we do, because it initializes the config
    Config::init().await;

    init_tracing();
}

fn init_tracing() {
    let config = Config::snapshot();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

async fn run_once() -> ExitCode {
    let config = Config::snapshot();

    let gateway = match SecurityGateway::connect(&config.endpoint) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("{APP_NAME} cannot start: {e}");
            return ExitCode::from(2);
        }
    };

    let (cancel, cancelled) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("{APP_NAME} interrupted; abandoning login");
            cancel.send_replace(true);
        }
    });

    let credentials = Credentials::from_secret(config.login.clone(), config.password.clone());
    let outcome = gateway
        .login(&credentials, &config.caller_ip, Some(cancelled))
        .await;

    gateway.dispose();

    match outcome {
        Ok(ticket) => {
            for (name, value) in ticket.fields() {
                println!("{name} = {value}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(reason = ?e.reason(), "{APP_NAME} login failed: {e}");
            ExitCode::FAILURE
        }
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------

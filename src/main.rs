use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use mailrelay::web::{shutdown_signal, WebServer};
use mailrelay::{Config, MailRelay, RelayError, SmtpTransport};

#[tokio::main]
async fn main() -> ExitCode {
    // Pick up a local .env file, if any
    dotenvy::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let mut config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = mailrelay::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        mailrelay::logging::init_console_only(&config.logging.level);
    }

    info!("mailrelay - HTTP to SMTP email relay");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> mailrelay::Result<()> {
    config.validate()?;

    info!(
        "SMTP transport: {}:{} (secure: {})",
        config.smtp.host, config.smtp.port, config.smtp.secure
    );
    let transport = SmtpTransport::from_config(&config.smtp)?;

    let sender = config
        .smtp
        .sender()
        .ok_or_else(|| RelayError::Config("no sender address configured".to_string()))?
        .to_string();
    let relay = MailRelay::new(Arc::new(transport), sender);

    if config.smtp.verify_on_startup {
        relay.verify().await?;
        info!("SMTP server is ready");
    }

    let server = WebServer::new(&config, relay)?;
    server.run(shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

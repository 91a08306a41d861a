//! Account Service CLI
//!
//! Headless GraphQL account server suitable for deployment as a systemd
//! service, Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/account-service/config.toml)
//! account-service
//!
//! # Custom config path
//! account-service --config /etc/account-service/config.toml
//!
//! # Override the listen port
//! account-service --port 8080
//!
//! # Validate config without starting
//! account-service --check
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info};

use account_service::config::AppConfig;
use account_service::server::{init_tracing, ServerHandle, ServerOptions};

/// Account Service: GraphQL user accounts with JWT authentication.
#[derive(Parser, Debug)]
#[command(
    name = "account-service",
    version,
    about = "GraphQL user account service",
    long_about = "Account Service: GraphQL API for sign-in, sign-up and \
                  admin user management.\n\n\
                  Default config: ~/.config/account-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "ACCOUNT_SERVICE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(account_service::default_config_path);

    let mut load_error = None;
    let mut config = match AppConfig::load(&config_path) {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            // Init tracing first so subsequent logs are formatted properly
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let mut cfg = AppConfig::default();
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            load_error = Some(e.to_string());
            cfg
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        let report = check_report(&config_path, &config, load_error.as_deref())?;
        println!("{}", report);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("Press Ctrl+C to shutdown gracefully.");

    // Wait for shutdown signal, then clean up
    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

/// Summary printed by `--check`. A config that failed to load is invalid,
/// even though the server would fall back to defaults.
fn check_report(
    config_path: &Path,
    config: &AppConfig,
    load_error: Option<&str>,
) -> Result<String, String> {
    if let Some(e) = load_error {
        return Err(format!(
            "Configuration is invalid: {}: {}",
            config_path.display(),
            e
        ));
    }

    Ok(format!(
        "Configuration is valid\n   \
         Config file : {}\n   \
         Address     : {}\n   \
         Database    : {}\n   \
         Log level   : {}\n   \
         Log format  : {}",
        config_path.display(),
        config.server.address(),
        config.database.url,
        config.logging.level,
        config.logging.format,
    ))
}

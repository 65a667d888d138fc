use anyhow::{Context, Result};
use clap::Parser;
use task_server::{
    init_telemetry, initialize_app, log_startup_info, report_error, startup_exit_code, Config,
    Overrides, EXIT_INVALID_CONFIG, EXIT_SERVER_ERROR,
};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "task-server")]
#[command(about = "Task Management HTTP Server")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<String>,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Listen address override
    #[arg(long)]
    listen_addr: Option<String>,

    /// Port override
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level override
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            database_url: self.database_url.clone(),
            listen_addr: self.listen_addr.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env(cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides());
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet
            eprintln!("Error: {e:#}");
            std::process::exit(EXIT_INVALID_CONFIG);
        }
    };

    init_telemetry(&config.logging).context("Failed to initialize telemetry")?;
    log_startup_info(&config);

    let app = match initialize_app(&config).await {
        Ok(app) => app,
        Err(e) => {
            report_error(&e, "startup");
            std::process::exit(startup_exit_code(&e));
        }
    };

    let addr = config.server_address();
    info!("Starting task server on {}", addr);

    let served = app.server.serve(&addr, shutdown_signal()).await;

    if let Err(e) = app.connections.close().await {
        warn!(error = %e, "Failed to close database connection");
    }

    match served {
        Ok(()) => {
            info!("Task server shut down cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Task server error");
            std::process::exit(EXIT_SERVER_ERROR);
        }
    }
}

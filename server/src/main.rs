use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracker_server::{
    boundary::{handle_error, ErrorBody},
    cli::{dispatch, Cli},
    config::Config,
    setup::initialize_app,
    telemetry::{init_telemetry, log_startup_info, report_error},
};

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(config_file) => Config::from_file(config_file)?,
        None => Config::from_env()?,
    };

    // Apply CLI overrides
    if let Some(ref database_url) = cli.database_url {
        config.database.url = Some(database_url.clone());
    }

    if let Some(ref log_level) = cli.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

fn print_json<S: Serialize>(body: &S) -> Result<()> {
    let text = serde_json::to_string_pretty(body).context("Failed to render output")?;
    println!("{text}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(&cli).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_telemetry(&config.logging).context("Failed to initialize telemetry")?;
    log_startup_info(&config);

    let lifecycle = match initialize_app(&config).await {
        Ok(lifecycle) => lifecycle,
        Err(e) => {
            report_error(&e, "startup");
            let body = ErrorBody::internal();
            print_json(&body)?;
            std::process::exit(body.exit_code());
        }
    };

    match dispatch(&lifecycle, &cli.command).await {
        Ok(output) => {
            info!(command = ?cli.command, "Command completed");
            print_json(&output)
        }
        Err(e) => {
            let body = handle_error(&e);
            print_json(&body)?;
            std::process::exit(body.exit_code());
        }
    }
}

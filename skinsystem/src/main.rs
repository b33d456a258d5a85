mod config;
mod telemetry;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use telemetry::TelemetryError;
use textures::TexturesError;
use textures::config::ValidationError;

#[derive(Parser)]
#[command(name = "skinsystem", version, about = "Skin and cape lookups for game clients")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the texture API and the admin probes
    Serve(ConfigArgs),
    /// Load and validate a config file, then exit
    CheckConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long, short = 'c', default_value = "skinsystem.yaml")]
    config_file_path: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Textures(#[from] TexturesError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        CliCommand::Serve(args) => serve(&args.config_file_path),
        CliCommand::CheckConfig(args) => check_config(&args.config_file_path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "skinsystem exited with an error");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn serve(config_file_path: &Path) -> Result<(), CliError> {
    let config = Config::from_file(config_file_path)?;

    let _sentry_guard = telemetry::init_logging(&config.common.logging)?;
    if let Some(metrics) = &config.common.metrics {
        telemetry::init_metrics(metrics)?;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_file_path.display(),
        "starting skinsystem"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(textures::run(config.textures))?;

    Ok(())
}

fn check_config(config_file_path: &Path) -> Result<(), CliError> {
    let config = Config::from_file(config_file_path)?;
    config.textures.validate()?;

    println!("{} is valid", config_file_path.display());
    Ok(())
}

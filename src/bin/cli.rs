//! Rotation bot CLI
//!
//! Local execution entry point. For AWS Lambda, use `rotation-bot-lambda`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rotation_bot::{
    config::{DEFAULT_CONFIG_PATH, load_config},
    error::Result,
    models::Config,
    pipeline::{self, CheckReport},
    services::Connections,
};

/// Announces the free champion rotation in a Discord channel
#[derive(Parser, Debug)]
#[command(name = "rotation-bot", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish the rotation if the announcement is outdated
    Run {
        /// Publish even when the announcement is up to date
        #[arg(long)]
        force: bool,
    },

    /// Compare the rotation with the announcement without changing anything
    Check,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    init_logging(cli.verbose, &config.logging.level);

    log::info!("Loaded configuration from {}", cli.config.display());

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    config.validate()?;

    match command {
        Command::Run { force } => {
            let summary = pipeline::execute(config, force).await?;
            if summary.published() {
                log::info!("Published rotation of {} champions", summary.champion_count);
            } else {
                log::info!("Rotation unchanged, nothing published");
            }
        }

        Command::Check => {
            let connections = Connections::new(config)?;
            let collaborators = connections.collaborators(config).await?;
            let report = pipeline::check_rotation(collaborators.context(config)).await?;
            print_check(&report);
        }

        Command::Validate => {
            log::info!("Configuration is valid");
            if config.broken_list_channel().is_none() {
                log::info!("Broken champion check disabled");
            }
        }
    }

    Ok(())
}

fn print_check(report: &CheckReport) {
    println!("Current rotation:");
    for (role, champions) in &report.rotation.by_role {
        let names: Vec<&str> = champions.iter().map(|c| c.name.as_str()).collect();
        println!("  {:<8} {}", role.display_name(), names.join(", "));
    }

    if let Some(low_level) = &report.rotation.by_role_low_level {
        println!("Low level rotation:");
        for (role, champions) in low_level {
            let names: Vec<&str> = champions.iter().map(|c| c.name.as_str()).collect();
            println!("  {:<8} {}", role.display_name(), names.join(", "));
        }
    }

    let verdict = if report.staleness.is_stale() {
        "stale"
    } else {
        "up to date"
    };
    println!("Announcement is {} ({})", verdict, report.staleness);
}

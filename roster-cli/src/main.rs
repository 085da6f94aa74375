//! Roster CLI - Command line interface for the review roster engine
//!
//! Every command opens the configured SQLite database, runs one engine
//! operation and prints the result as JSON.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use roster_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, StatsArgs, TeamArgs, UserArgs};

/// Roster: reviewer assignment for team pull requests
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite database file (overrides config and env)
    #[arg(long, global = true, env = "ROSTER_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Deadline for each operation, e.g. "500ms" or "5s"
    #[arg(long, global = true, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show current configuration
    Config,

    /// Create and inspect teams
    Team(TeamArgs),

    /// Change activity and list reviews
    User(UserArgs),

    /// Open, merge and reassign pull requests
    Pr(PrArgs),

    /// Merged pull requests per author
    Stats(StatsArgs),
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    roster_core::config::parse_duration("--timeout", value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.database.clone(), cli.timeout)?;

    if cli.verbose {
        tracing::info!(
            database = %config.database.path.display(),
            operation_timeout = ?config.engine.operation_timeout,
            "Configuration loaded"
        );
    }

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("roster {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Config) => {
            print_config(&config);
            Ok(())
        }
        Some(Commands::Team(args)) => args.execute(&config).await,
        Some(Commands::User(args)) => args.execute(&config).await,
        Some(Commands::Pr(args)) => args.execute(&config).await,
        Some(Commands::Stats(args)) => args.execute(&config).await,
        None => {
            println!("Roster - reviewer assignment for team pull requests");
            println!();
            println!("Use --help for usage information");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<roster_core::Error>() {
            Some(domain) => {
                if domain.is_internal() {
                    tracing::error!(error = %domain, "Operation failed");
                }
                eprintln!("{}", commands::error_body(domain));
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

fn print_config(config: &Config) {
    println!("Roster Configuration");
    println!("====================");
    println!();
    println!("Database Settings:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!("  busy_timeout: {:?}", config.database.busy_timeout);
    println!();
    println!("Engine Settings:");
    match config.engine.operation_timeout {
        Some(timeout) => println!("  operation_timeout: {:?}", timeout),
        None => println!("  operation_timeout: (none)"),
    }
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

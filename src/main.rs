use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratefold::core::log::init_logging;
use ratefold::core::series::DateRange;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ratefold::AppCommand {
    fn from(cmd: Commands) -> ratefold::AppCommand {
        match cmd {
            Commands::Rate => ratefold::AppCommand::Rate,
            Commands::ClearRate => ratefold::AppCommand::ClearRate,
            Commands::Record { file } => ratefold::AppCommand::Record { path: file },
            Commands::Series { range } => ratefold::AppCommand::Series { range },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the current exchange rate and where it came from
    Rate,
    /// Forget the cached exchange rate
    ClearRate,
    /// Import snapshot records from a YAML file
    Record {
        /// YAML list of snapshot records
        file: PathBuf,
    },
    /// Display aligned allocation and value series
    Series {
        /// Date window: 7d, 30d, 60d, 1y or all
        #[arg(short, long, default_value = "30d")]
        range: DateRange,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => ratefold::cli::setup::setup_at_path(path),
            None => ratefold::cli::setup::setup(),
        },
        Some(cmd) => ratefold::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

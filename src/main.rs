use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use mfrank::cli::rank::ThresholdOverrides;
use mfrank::core::log::init_logging;

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

#[derive(Args)]
struct RankArgs {
    /// Newline-delimited identifiers file
    #[arg(short, long)]
    identifiers: Option<String>,

    /// Minimum return on assets (%)
    #[arg(long)]
    min_roa: Option<f64>,

    /// Minimum return on equity (%), exclusive
    #[arg(long)]
    min_roe: Option<f64>,

    /// Maximum price to earnings, exclusive
    #[arg(long)]
    max_pe: Option<f64>,

    /// Maximum EV/EBIT
    #[arg(long)]
    max_ev_ebit: Option<f64>,

    /// Prompt for new thresholds after each ranking
    #[arg(long)]
    interactive: bool,
}

impl From<RankArgs> for mfrank::RankOptions {
    fn from(args: RankArgs) -> Self {
        mfrank::RankOptions {
            identifiers_path: args.identifiers,
            thresholds: ThresholdOverrides {
                min_roa: args.min_roa,
                min_roe: args.min_roe,
                max_pe: args.max_pe,
                max_ev_ebit: args.max_ev_ebit,
            },
            interactive: args.interactive,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Rank companies with the Magic Formula
    Rank(RankArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mfrank::cli::setup::setup(),
        Some(Commands::Rank(args)) => {
            mfrank::run_command(
                mfrank::AppCommand::Rank(args.into()),
                cli.config_path.as_deref(),
            )
            .await
        }
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

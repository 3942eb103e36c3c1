use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fina::core::log::init_logging;

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

impl From<Commands> for fina::AppCommand {
    fn from(cmd: Commands) -> fina::AppCommand {
        match cmd {
            Commands::Calc {
                amount,
                rate,
                days,
                save,
            } => fina::AppCommand::Calc {
                amount,
                daily_rate_percent: rate,
                days,
                save,
            },
            Commands::Rates { watch, metals } => fina::AppCommand::Rates { watch, metals },
            Commands::Convert { amount, currency, side } => fina::AppCommand::Convert {
                amount,
                code: currency,
                side: if side == "sell" {
                    fina::ConversionSide::Sell
                } else {
                    fina::ConversionSide::Buy
                },
            },
            Commands::History => fina::AppCommand::History,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Calculate compound daily growth
    Calc {
        /// Start amount in the home currency
        amount: f64,
        /// Daily growth rate in percent (0.1-100)
        rate: f64,
        /// Number of days (1-365)
        days: u32,
        /// Save the calculation to history
        #[arg(long)]
        save: bool,
    },
    /// Display live currency and precious metal rates
    Rates {
        /// Keep refreshing on the configured cadence
        #[arg(long)]
        watch: bool,
        /// Show precious metals only
        #[arg(long)]
        metals: bool,
    },
    /// Convert a home-currency amount into an instrument
    Convert {
        /// Amount in the home currency
        amount: f64,
        /// Instrument code, e.g. USD or XAU
        currency: String,
        /// Trade direction: buy or sell the instrument
        #[arg(long, default_value = "buy", value_parser = ["buy", "sell"])]
        side: String,
    },
    /// List saved calculations
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fina::cli::setup::setup(),
        Some(cmd) => fina::run_command(cmd.into(), cli.config_path.as_deref()).await,
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

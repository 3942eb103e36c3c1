pub mod cli;
pub mod core;
pub mod history;
pub mod providers;
pub mod rates;

pub use cli::convert::ConversionSide;
pub use crate::core::config;

use anyhow::Result;

/// Application commands, decoupled from the clap surface so integration tests
/// can drive the app without a terminal.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Calc {
        amount: f64,
        daily_rate_percent: f64,
        days: u32,
        save: bool,
    },
    Rates {
        watch: bool,
        metals: bool,
    },
    Convert {
        amount: f64,
        code: String,
        side: ConversionSide,
    },
    History,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Calc {
            amount,
            daily_rate_percent,
            days,
            save,
        } => cli::calc::run(amount, daily_rate_percent, days, save, config_path).await,
        AppCommand::Rates { watch, metals } => cli::rates::run(watch, metals, config_path).await,
        AppCommand::Convert { amount, code, side } => {
            cli::convert::run(amount, &code, side, config_path).await
        }
        AppCommand::History => cli::history::run(config_path).await,
    }
}

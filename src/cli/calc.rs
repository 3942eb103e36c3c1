use crate::cli::ui;
use crate::core::accumulate::{AccumulationInput, AccumulationResult, accumulate};
use crate::core::config::AppConfig;
use crate::history::{CalculationRecord, FjallHistory, HistoryStore};
use anyhow::{Result, bail};
use chrono::Utc;

/// Accepted input ranges. These bound what a user can ask for on the command
/// line; the engine itself accepts anything.
const RATE_RANGE: (f64, f64) = (0.1, 100.0);
const DAYS_RANGE: (u32, u32) = (1, 365);

pub async fn run(
    amount: f64,
    daily_rate_percent: f64,
    days: u32,
    save: bool,
    config_path: Option<&str>,
) -> Result<()> {
    let input = validated_input(amount, daily_rate_percent, days)?;
    let result = accumulate(&input);

    display_result(&input, &result);

    if save {
        let config = load_config(config_path)?;
        let store = FjallHistory::new(&config.default_data_path()?)?;
        store.append(build_record(&input, &result)).await?;
        println!("{}", ui::style_text("Saved to history.", ui::StyleType::Subtle));
    }

    Ok(())
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        // The calculator works without a config file; fall back to defaults.
        None => Ok(AppConfig::load().unwrap_or_default()),
    }
}

fn validated_input(amount: f64, daily_rate_percent: f64, days: u32) -> Result<AccumulationInput> {
    if !amount.is_finite() || amount < 0.0 {
        bail!("Start amount must be a non-negative number, got {amount}");
    }
    if !(RATE_RANGE.0..=RATE_RANGE.1).contains(&daily_rate_percent) {
        bail!(
            "Daily rate must be between {}% and {}%, got {daily_rate_percent}%",
            RATE_RANGE.0,
            RATE_RANGE.1
        );
    }
    if !(DAYS_RANGE.0..=DAYS_RANGE.1).contains(&days) {
        bail!(
            "Days must be between {} and {}, got {days}",
            DAYS_RANGE.0,
            DAYS_RANGE.1
        );
    }

    Ok(AccumulationInput {
        principal: amount,
        daily_rate_percent,
        days,
    })
}

fn build_record(input: &AccumulationInput, result: &AccumulationResult) -> CalculationRecord {
    CalculationRecord {
        start_amount: format!("{:.2}", input.principal),
        daily_percent: input.daily_rate_percent.to_string(),
        days: input.days.to_string(),
        total_result: format!("{:.2}", result.final_amount),
        total_profit: format!("{:.2}", result.profit),
        created_at: Utc::now(),
    }
}

fn display_result(input: &AccumulationInput, result: &AccumulationResult) {
    println!(
        "\n{}",
        ui::style_text(
            &format!(
                "{} at {}%/day over {} days",
                ui::format_amount(input.principal),
                input.daily_rate_percent,
                input.days
            ),
            ui::StyleType::Title
        )
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell(""), ui::header_cell("Amount")]);
    table.add_row(vec![
        ui::style_text("Final Amount", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::format_amount(result.final_amount),
            ui::StyleType::TotalValue,
        ),
    ]);
    table.add_row(vec![
        "Total Profit".to_string(),
        ui::format_amount(result.profit),
    ]);
    table.add_row(vec![
        "Profit %".to_string(),
        format!("{:.2}%", result.profit_percent),
    ]);
    println!("{table}");
}

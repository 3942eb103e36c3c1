use crate::cli::ui;
use crate::core::config::AppConfig;
use crate::rates::RateService;
use anyhow::{Result, bail};

/// Which direction the user is trading. Buying a foreign instrument applies
/// the sell rate of the counter, selling applies the buy rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionSide {
    Buy,
    Sell,
}

pub async fn run(
    amount: f64,
    code: &str,
    side: ConversionSide,
    config_path: Option<&str>,
) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be a positive number, got {amount}");
    }

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().unwrap_or_default(),
    };
    let home = config.home_currency.clone();

    let mut service = RateService::from_config(&config);
    let spinner = ui::new_spinner("Fetching rates...");
    let quotes = service.refresh().await?;
    spinner.finish_and_clear();

    let code = code.to_uppercase();
    let Some(quote) = quotes.iter().find(|q| q.quote.code == code) else {
        bail!("No rate available for {code}");
    };

    let applied_rate = match side {
        ConversionSide::Buy => quote.quote.sell_rate,
        ConversionSide::Sell => quote.quote.buy_rate,
    };
    let converted = convert(amount, applied_rate);

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell(""), ui::header_cell("Value")]);
    table.add_row(vec![
        format!("Amount ({home})"),
        ui::format_amount(amount),
    ]);
    table.add_row(vec![
        format!("Rate (1 {code} in {home})"),
        format!("{applied_rate:.4}"),
    ]);
    table.add_row(vec![
        ui::style_text(&format!("Converted ({code})"), ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_amount(converted), ui::StyleType::TotalValue),
    ]);
    println!("{table}");

    Ok(())
}

/// Home-currency amount at the applied rate. Inverted or zero rates from bad
/// upstream data must not panic; they convert to zero.
fn convert(amount: f64, applied_rate: f64) -> f64 {
    if applied_rate > 0.0 {
        amount / applied_rate
    } else {
        0.0
    }
}

use crate::cli::ui;
use crate::core::config::AppConfig;
use crate::core::error::FetchError;
use crate::core::quote::EnrichedRateQuote;
use crate::rates::RateService;
use anyhow::Result;
use chrono::Local;
use std::time::Duration;
use tracing::warn;

pub async fn run(watch: bool, metals_only: bool, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().unwrap_or_default(),
    };

    let refresh_interval = Duration::from_secs(config.fetch.refresh_secs);
    let mut service = RateService::from_config(&config);

    if !watch {
        let quotes = fetch(&mut service).await?;
        display_quotes(&quotes, metals_only);
        return Ok(());
    }

    loop {
        match fetch(&mut service).await {
            Ok(quotes) => display_quotes(&quotes, metals_only),
            Err(e) => {
                // In watch mode a failed cycle is transient; the next tick
                // retries and the last table stays on screen.
                warn!(error = %e, "Fetch cycle failed");
                println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            }
        }
        tokio::time::sleep(refresh_interval).await;
    }
}

async fn fetch(service: &mut RateService) -> Result<Vec<EnrichedRateQuote>, FetchError> {
    let spinner = ui::new_spinner("Fetching rates...");
    let result = service.refresh().await;
    spinner.finish_and_clear();
    result
}

fn display_quotes(quotes: &[EnrichedRateQuote], metals_only: bool) {
    let visible: Vec<&EnrichedRateQuote> = quotes
        .iter()
        .filter(|q| !metals_only || is_metal_code(&q.quote.code))
        .collect();

    if visible.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No rate data is currently available for the selected instruments.",
                ui::StyleType::Warning
            )
        );
        return;
    }

    let title = if metals_only {
        "Precious Metals"
    } else {
        "Exchange Rates"
    };
    println!("\n{}", ui::style_text(title, ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Name"),
        ui::header_cell("Buy"),
        ui::header_cell("Sell"),
        ui::header_cell("Buy Change"),
        ui::header_cell("Sell Change"),
    ]);

    for q in visible {
        table.add_row(vec![
            comfy_table::Cell::new(&q.quote.code),
            comfy_table::Cell::new(&q.quote.name),
            ui::amount_cell(format!("{:.4}", q.quote.buy_rate)),
            ui::amount_cell(format!("{:.4}", q.quote.sell_rate)),
            ui::change_cell(q.buy_change, q.buy_change_percent),
            ui::change_cell(q.sell_change, q.sell_change_percent),
        ]);
    }
    println!("{table}");

    println!(
        "{}",
        ui::style_text(
            &format!("Last updated: {}", Local::now().format("%H:%M:%S")),
            ui::StyleType::Subtle
        )
    );
}

fn is_metal_code(code: &str) -> bool {
    matches!(code, "XAU" | "XAG" | "XPT" | "XPD")
}

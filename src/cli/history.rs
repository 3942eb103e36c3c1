use crate::cli::ui;
use crate::core::config::AppConfig;
use crate::history::{CalculationRecord, FjallHistory, HistoryStore};
use anyhow::Result;

pub async fn run(config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().unwrap_or_default(),
    };

    let store = FjallHistory::new(&config.default_data_path()?)?;
    let records = store.list().await?;

    if records.is_empty() {
        println!("No saved calculations yet. Run `fina calc ... --save` to add one.");
        return Ok(());
    }

    println!("\n{}", ui::style_text("Calculation History", ui::StyleType::Title));
    display_records(&records);
    Ok(())
}

fn display_records(records: &[CalculationRecord]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Start"),
        ui::header_cell("Rate/Day"),
        ui::header_cell("Days"),
        ui::header_cell("Result"),
        ui::header_cell("Profit"),
    ]);

    for record in records {
        table.add_row(vec![
            ui::amount_cell(record.created_at.format("%Y-%m-%d %H:%M").to_string()),
            ui::amount_cell(formatted(&record.start_amount)),
            ui::amount_cell(format!("{}%", record.daily_percent)),
            ui::amount_cell(record.days.clone()),
            ui::amount_cell(formatted(&record.total_result)),
            ui::amount_cell(formatted(&record.total_profit)),
        ]);
    }
    println!("{table}");
}

/// Stored fields are stringified numbers; reformat for display but fall back
/// to the raw string if an old record does not parse.
fn formatted(value: &str) -> String {
    value
        .parse::<f64>()
        .map(ui::format_amount)
        .unwrap_or_else(|_| value.to_string())
}

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::accweek::tools::aggregate::{FileOutcome, Variant, aggregate_months};
use crate::accweek::tools::config::{
    Config, FORECAST_OUTPUT_FILE, INVENTORY_OUTPUT_FILE, SALES_OUTPUT_FILE,
};
use crate::accweek::tools::error::Result;
use crate::accweek::tools::forecast::aggregate_forecast;
use crate::accweek::tools::io::json_write;
use crate::accweek::tools::reshape::{build_inventory_summary, build_sales_summary};

/// What a `summarize` run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub sales_path: PathBuf,
    pub inventory_path: PathBuf,
    pub months: usize,
    pub sales_keys: usize,
    pub inventory_keys: usize,
    pub sales_unexpected: Vec<String>,
    pub inventory_unexpected: Vec<String>,
    pub skipped_files: usize,
}

/// What a `forecast` run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub path: PathBuf,
    pub months: Vec<String>,
    pub skipped_files: usize,
}

fn skipped(outcomes: &[FileOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|outcome| !matches!(outcome, FileOutcome::Processed { .. }))
        .count()
}

fn warn_unexpected(variant: Variant, categories: &[String]) {
    if categories.is_empty() {
        return;
    }
    warn!(
        %variant,
        count = categories.len(),
        categories = ?categories,
        "unexpected minor category values"
    );
}

/// Aggregates the sales and inventory extracts and writes both summaries.
///
/// Sales are aggregated first because the inventory summary embeds online
/// sales totals.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %config.paths.output_dir.display(), months = config.analysis_months.len())
)]
pub fn summarize(config: &Config) -> Result<SummaryReport> {
    json_write::ensure_dir(&config.paths.output_dir)?;

    let sales = aggregate_months(config, Variant::Sales);
    let sales_unexpected: Vec<String> = sales.unexpected.iter().cloned().collect();
    warn_unexpected(Variant::Sales, &sales_unexpected);

    let inventory = aggregate_months(config, Variant::Inventory);
    let inventory_unexpected: Vec<String> = inventory.unexpected.iter().cloned().collect();
    warn_unexpected(Variant::Inventory, &inventory_unexpected);

    let sales_summary = build_sales_summary(config, &sales.table, &sales.unexpected);
    let sales_path = config.paths.output_dir.join(SALES_OUTPUT_FILE);
    json_write::write_json(&sales_path, &sales_summary)?;
    info!(path = %sales_path.display(), "sales summary written");

    let inventory_summary =
        build_inventory_summary(config, &inventory.table, &sales.table, &inventory.unexpected);
    let inventory_path = config.paths.output_dir.join(INVENTORY_OUTPUT_FILE);
    json_write::write_json(&inventory_path, &inventory_summary)?;
    info!(path = %inventory_path.display(), "inventory summary written");

    let report = SummaryReport {
        sales_path,
        inventory_path,
        months: config.analysis_months.len(),
        sales_keys: sales.table.len(),
        inventory_keys: inventory.table.len(),
        sales_unexpected,
        inventory_unexpected,
        skipped_files: skipped(&sales.outcomes) + skipped(&inventory.outcomes),
    };
    info!(
        months = report.months,
        sales_keys = report.sales_keys,
        inventory_keys = report.inventory_keys,
        skipped_files = report.skipped_files,
        "summaries complete"
    );
    Ok(report)
}

/// Aggregates the forecast extracts and writes the forecast summary.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %config.paths.output_dir.display())
)]
pub fn forecast(config: &Config) -> Result<ForecastReport> {
    json_write::ensure_dir(&config.paths.output_dir)?;

    let run = aggregate_forecast(config)?;
    let path = config.paths.output_dir.join(FORECAST_OUTPUT_FILE);
    json_write::write_json(&path, &run.summary)?;
    info!(path = %path.display(), months = ?run.summary.months, "forecast summary written");

    Ok(ForecastReport {
        path,
        months: run.summary.months,
        skipped_files: skipped(&run.outcomes),
    })
}

//! Incoming-stock forecast preprocessing.
//!
//! Forecast extracts are named with two-digit years (`25.11.csv`) and carry
//! no channel or operating-basis columns, so totals are kept per brand, month
//! and category only.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::accweek::tools::aggregate::FileOutcome;
use crate::accweek::tools::config::Config;
use crate::accweek::tools::error::Result;
use crate::accweek::tools::io::csv_read;
use crate::accweek::tools::model::YearMonth;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    /// brand → month → category → amount.
    pub brands: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
    /// Months that contributed at least one row, oldest first.
    pub months: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastFile {
    /// (brand, category) → amount.
    pub totals: BTreeMap<(String, String), f64>,
    pub rows_read: u64,
    pub rows_kept: u64,
}

#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub summary: ForecastSummary,
    pub outcomes: Vec<FileOutcome>,
}

#[derive(Debug, Clone)]
pub struct ForecastAggregator {
    brands: Vec<String>,
    categories: HashSet<String>,
    brand_column: String,
    category_column: String,
    amount_column: String,
    chunk_size: usize,
}

impl ForecastAggregator {
    pub fn new(config: &Config) -> Self {
        Self {
            brands: config.filter.brands.clone(),
            categories: config.filter.forecast_categories.iter().cloned().collect(),
            brand_column: config.columns.brand.clone(),
            category_column: config.columns.minor_category.clone(),
            amount_column: config.columns.forecast_amount.clone(),
            chunk_size: config.chunk_size,
        }
    }

    /// Sums one forecast extract by brand and category.
    pub fn aggregate_reader<R: Read>(&self, reader: R) -> Result<ForecastFile> {
        self.aggregate_csv(csv_read::extract_reader(reader))
    }

    pub fn aggregate_file(&self, path: &Path) -> Result<ForecastFile> {
        self.aggregate_csv(csv_read::open_extract(path)?)
    }

    fn aggregate_csv<R: Read>(&self, mut reader: csv::Reader<R>) -> Result<ForecastFile> {
        let headers = reader.headers()?.clone();
        let brand_idx = csv_read::resolve_column(&headers, &self.brand_column)?;
        let category_idx = csv_read::resolve_column(&headers, &self.category_column)?;
        let amount_idx = csv_read::resolve_column(&headers, &self.amount_column)?;

        let mut file = ForecastFile::default();
        let rows_read = csv_read::for_each_chunk(&mut reader, self.chunk_size, |chunk| {
            for row in chunk {
                let brand = row.get(brand_idx).unwrap_or_default();
                let category = row.get(category_idx).unwrap_or_default();
                if !self.brands.iter().any(|known| known == brand)
                    || !self.categories.contains(category)
                {
                    continue;
                }
                let amount = csv_read::parse_amount(
                    row.get(amount_idx).unwrap_or_default(),
                    csv_read::line_of(row),
                )?;
                *file
                    .totals
                    .entry((brand.to_string(), category.to_string()))
                    .or_insert(0.0) += amount;
                file.rows_kept += 1;
            }
            Ok(())
        })?;
        file.rows_read = rows_read;

        Ok(file)
    }

    /// Processes `<dir>/<YY.MM>.csv` for every short month label. Missing and
    /// unreadable files are logged and skipped.
    #[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
    pub fn run(&self, dir: &Path, short_months: &[String]) -> Result<ForecastRun> {
        let mut brands: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>> = self
            .brands
            .iter()
            .map(|brand| (brand.clone(), BTreeMap::new()))
            .collect();
        let mut months: BTreeSet<YearMonth> = BTreeSet::new();
        let mut outcomes = Vec::new();

        for short in short_months {
            let month = YearMonth::from_short(short)?;
            let path = Config::month_file(dir, short);
            if !path.exists() {
                warn!(path = %path.display(), "forecast extract not found, skipping");
                outcomes.push(FileOutcome::Missing { month, path });
                continue;
            }

            info!(path = %path.display(), %month, "processing forecast extract");
            match self.aggregate_file(&path) {
                Ok(file) => {
                    debug!(
                        rows_read = file.rows_read,
                        rows_kept = file.rows_kept,
                        "forecast folded"
                    );
                    outcomes.push(FileOutcome::Processed {
                        month,
                        rows_read: file.rows_read,
                        rows_kept: file.rows_kept,
                    });
                    if file.rows_kept == 0 {
                        continue;
                    }
                    months.insert(month);
                    let label = month.to_string();
                    for ((brand, category), amount) in file.totals {
                        let month_entry = brands
                            .entry(brand)
                            .or_default()
                            .entry(label.clone())
                            .or_default();
                        *month_entry.entry(category).or_insert(0.0) += amount;
                    }
                }
                Err(err) => {
                    error!(
                        path = %path.display(),
                        error = %err,
                        "failed to process forecast extract, skipping"
                    );
                    outcomes.push(FileOutcome::Failed {
                        month,
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(ForecastRun {
            summary: ForecastSummary {
                brands,
                months: months.iter().map(ToString::to_string).collect(),
            },
            outcomes,
        })
    }
}

/// Runs the forecast preprocessor over the configured forecast months.
pub fn aggregate_forecast(config: &Config) -> Result<ForecastRun> {
    ForecastAggregator::new(config).run(&config.paths.forecast_dir, &config.forecast_months)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTRACT: &str = "\u{feff}产品品牌,产品中分类,预计库存入库\n\
MLB,Bag,\"1,234,567\"\n\
MLB,Bag,33\n\
MLB,Shoes,\"1,000\"\n\
DISCOVERY,Socks,500\n\
OTHER,Bag,700\n\
MLB KIDS,Headwear,NULL\n";

    #[test]
    fn sums_whitelisted_rows_by_brand_and_category() {
        let aggregator = ForecastAggregator::new(&Config::default());
        let file = aggregator.aggregate_reader(EXTRACT.as_bytes()).expect("extract folded");

        assert_eq!(file.rows_read, 6);
        assert_eq!(file.rows_kept, 4);
        assert_eq!(file.totals[&("MLB".to_string(), "Bag".to_string())], 1_234_600.0);
        assert_eq!(file.totals[&("MLB".to_string(), "Shoes".to_string())], 1000.0);
        assert_eq!(file.totals[&("MLB KIDS".to_string(), "Headwear".to_string())], 0.0);
        assert_eq!(file.totals.len(), 3);
    }

    #[test]
    fn malformed_amount_fails_the_file() {
        let aggregator = ForecastAggregator::new(&Config::default());
        let extract = "产品品牌,产品中分类,预计库存入库\nMLB,Bag,abc\n";
        assert!(aggregator.aggregate_reader(extract.as_bytes()).is_err());
    }

    #[test]
    fn padded_brand_or_category_is_not_matched() {
        let aggregator = ForecastAggregator::new(&Config::default());
        let extract = "产品品牌,产品中分类,预计库存入库\nMLB ,Shoes,1000\nMLB, Bag,5\n";
        let file = aggregator.aggregate_reader(extract.as_bytes()).expect("extract folded");

        assert_eq!(file.rows_read, 2);
        assert_eq!(file.rows_kept, 0);
        assert!(file.totals.is_empty());
    }
}

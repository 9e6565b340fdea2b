//! Run configuration.
//!
//! Every value has a built-in default matching the production extracts, so the
//! tool runs without any configuration file. A TOML file can override any
//! subset of the fields:
//!
//! ```toml
//! analysis_months = ["2025.01", "2025.02"]
//! chunk_size = 50000
//!
//! [paths]
//! retail_dir = "/data/retail"
//!
//! [classifier]
//! rule_set = "extended"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::accweek::tools::classify::RuleSet;
use crate::accweek::tools::error::{Result, ToolError};
use crate::accweek::tools::model::{ALL_LABEL, YearMonth};

/// File name of the sales summary inside the output directory.
pub const SALES_OUTPUT_FILE: &str = "accessory_sales_summary.json";
/// File name of the inventory summary inside the output directory.
pub const INVENTORY_OUTPUT_FILE: &str = "accessory_inventory_summary.json";
/// File name of the forecast summary inside the output directory.
pub const FORECAST_OUTPUT_FILE: &str = "accessory_forecast_inventory_summary.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub paths: PathConfig,
    /// Months scanned by the sales and inventory aggregators, in order.
    pub analysis_months: Vec<YearMonth>,
    /// Short (`YY.MM`) labels of the forecast extracts.
    pub forecast_months: Vec<String>,
    /// Number of records buffered per chunk while scanning an extract.
    pub chunk_size: usize,
    pub filter: FilterConfig,
    pub classifier: ClassifierConfig,
    pub columns: ColumnConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub retail_dir: PathBuf,
    pub inventory_dir: PathBuf,
    pub forecast_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub brands: Vec<String>,
    /// Major category every retained record must carry.
    pub target_category: String,
    /// Minor categories that get their own tab.
    pub item_categories: Vec<String>,
    /// Minor categories kept by the forecast preprocessor.
    pub forecast_categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    pub rule_set: RuleSet,
    /// Season substrings that make a record with a blank operating basis core.
    pub core_seasons: Vec<String>,
}

/// Header names of the extract columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    pub channel: String,
    pub brand: String,
    pub major_category: String,
    pub minor_category: String,
    pub operating_basis: String,
    pub season: String,
    pub sales_amount: String,
    pub inventory_amount: String,
    pub forecast_amount: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        let analysis_months = (1..=12)
            .map(|month| (2024, month))
            .chain((1..=10).map(|month| (2025, month)))
            .filter_map(|(year, month)| YearMonth::new(year, month).ok())
            .collect();
        Self {
            paths: PathConfig::default(),
            analysis_months,
            forecast_months: strings(&["25.11", "25.12", "26.01", "26.02", "26.03"]),
            chunk_size: 200_000,
            filter: FilterConfig::default(),
            classifier: ClassifierConfig::default(),
            columns: ColumnConfig::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            retail_dir: PathBuf::from("data/retail"),
            inventory_dir: PathBuf::from("data/inventory"),
            forecast_dir: PathBuf::from("data/inventory(forecast)"),
            output_dir: PathBuf::from("public/data"),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        let categories = strings(&["Shoes", "Headwear", "Bag", "Acc_etc"]);
        Self {
            brands: strings(&["MLB", "MLB KIDS", "DISCOVERY"]),
            target_category: "饰品".to_string(),
            item_categories: categories.clone(),
            forecast_categories: categories,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rule_set: RuleSet::Standard,
            core_seasons: strings(&["24FW", "25SS", "25FW", "26SS"]),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            channel: "Channel 2".to_string(),
            brand: "产品品牌".to_string(),
            major_category: "产品大分类".to_string(),
            minor_category: "产品中分类".to_string(),
            operating_basis: "运营基准".to_string(),
            season: "产品季节".to_string(),
            sales_amount: "吊牌金额".to_string(),
            inventory_amount: "预计库存金额".to_string(),
            forecast_amount: "预计库存入库".to_string(),
        }
    }
}

impl Config {
    /// Loads the configuration, starting from the defaults and applying the
    /// TOML file when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml(&source)
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ToolError::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.filter.brands.is_empty() {
            return Err(ToolError::InvalidConfig("at least one brand is required".into()));
        }
        if self.filter.item_categories.iter().any(|c| c == ALL_LABEL) {
            return Err(ToolError::InvalidConfig(format!(
                "'{ALL_LABEL}' is reserved and cannot be an item category"
            )));
        }
        for label in &self.forecast_months {
            YearMonth::from_short(label)?;
        }
        Ok(())
    }

    /// Extract path for one analysis month, e.g. `data/retail/2024.01.csv`.
    pub fn month_file(dir: &Path, label: &str) -> PathBuf {
        dir.join(format!("{label}.csv"))
    }
}

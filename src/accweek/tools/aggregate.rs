use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use crate::accweek::tools::classify::Classifier;
use crate::accweek::tools::config::{ColumnConfig, Config, PathConfig};
use crate::accweek::tools::error::Result;
use crate::accweek::tools::filter::RecordFilter;
use crate::accweek::tools::io::csv_read::{self, ExtractColumns};
use crate::accweek::tools::model::{
    AggregateKey, ChannelCode, ChannelGroup, RawRecord, YearMonth,
};

/// The two extract families sharing the aggregation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Sales,
    Inventory,
}

impl Variant {
    /// Buckets a record with the given channel code is added to. Channels the
    /// variant does not recognise get no bucket at all.
    pub fn channel_buckets(self, code: &str) -> &'static [ChannelGroup] {
        use ChannelGroup::*;
        match (self, ChannelCode::from_code(code)) {
            (Variant::Sales, Some(ChannelCode::Storefront)) => &[All, Storefront],
            (Variant::Sales, Some(ChannelCode::Online)) => &[All, Online],
            (Variant::Inventory, Some(ChannelCode::Storefront)) => &[All, Storefront],
            (Variant::Inventory, Some(ChannelCode::Headquarters | ChannelCode::Online)) => {
                &[All, HeadquartersOnline]
            }
            _ => &[],
        }
    }

    /// Channel groups emitted per month, in output order.
    pub fn channel_groups(self) -> &'static [ChannelGroup] {
        match self {
            Variant::Sales => &[ChannelGroup::All, ChannelGroup::Storefront, ChannelGroup::Online],
            Variant::Inventory => &[
                ChannelGroup::All,
                ChannelGroup::Storefront,
                ChannelGroup::HeadquartersOnline,
            ],
        }
    }

    pub fn amount_column(self, columns: &ColumnConfig) -> &str {
        match self {
            Variant::Sales => &columns.sales_amount,
            Variant::Inventory => &columns.inventory_amount,
        }
    }

    pub fn source_dir(self, paths: &PathConfig) -> &Path {
        match self {
            Variant::Sales => &paths.retail_dir,
            Variant::Inventory => &paths.inventory_dir,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Sales => write!(f, "sales"),
            Variant::Inventory => write!(f, "inventory"),
        }
    }
}

/// Sparse running totals keyed by [`AggregateKey`]. Absent keys read as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable {
    totals: HashMap<AggregateKey, f64>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: AggregateKey, amount: f64) {
        *self.totals.entry(key).or_insert(0.0) += amount;
    }

    pub fn get(&self, key: &AggregateKey) -> Option<f64> {
        self.totals.get(key).copied()
    }

    /// Total for `key`, zero when nothing was ever added.
    pub fn total(&self, key: &AggregateKey) -> f64 {
        self.get(key).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn merge(&mut self, other: AggregateTable) {
        for (key, amount) in other.totals {
            self.add(key, amount);
        }
    }
}

/// Result of folding a single extract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAggregate {
    pub table: AggregateTable,
    pub unexpected: BTreeSet<String>,
    pub rows_read: u64,
    /// Rows that passed the brand and category filter.
    pub rows_kept: u64,
}

/// What happened to one month's extract during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Processed {
        month: YearMonth,
        rows_read: u64,
        rows_kept: u64,
    },
    Missing {
        month: YearMonth,
        path: PathBuf,
    },
    Failed {
        month: YearMonth,
        path: PathBuf,
        reason: String,
    },
}

/// Totals and diagnostics for every analysis month of one variant.
#[derive(Debug, Clone, Default)]
pub struct AggregateRun {
    pub table: AggregateTable,
    pub unexpected: BTreeSet<String>,
    pub outcomes: Vec<FileOutcome>,
}

/// Scans extracts of one [`Variant`] and accumulates their totals.
#[derive(Debug, Clone)]
pub struct Aggregator {
    variant: Variant,
    filter: RecordFilter,
    classifier: Classifier,
    columns: ColumnConfig,
    chunk_size: usize,
}

impl Aggregator {
    pub fn new(variant: Variant, config: &Config) -> Self {
        Self {
            variant,
            filter: RecordFilter::from_config(&config.filter),
            classifier: Classifier::from_config(&config.classifier),
            columns: config.columns.clone(),
            chunk_size: config.chunk_size,
        }
    }

    /// Processes each month's extract under `dir` in order.
    ///
    /// Missing or unreadable files are logged and skipped. A file only
    /// contributes once it has been read to the end, so a failure halfway
    /// through leaves the run totals untouched.
    #[instrument(level = "info", skip_all, fields(variant = %self.variant, dir = %dir.display()))]
    pub fn run(&self, dir: &Path, months: &[YearMonth]) -> AggregateRun {
        let mut run = AggregateRun::default();

        for &month in months {
            let path = Config::month_file(dir, &month.to_string());
            if !path.exists() {
                warn!(path = %path.display(), "extract not found, skipping");
                run.outcomes.push(FileOutcome::Missing { month, path });
                continue;
            }

            info!(path = %path.display(), "processing {} extract", self.variant);
            match self.aggregate_file(&path, month) {
                Ok(file) => {
                    debug!(
                        rows_read = file.rows_read,
                        rows_kept = file.rows_kept,
                        keys = file.table.len(),
                        "extract folded"
                    );
                    run.outcomes.push(FileOutcome::Processed {
                        month,
                        rows_read: file.rows_read,
                        rows_kept: file.rows_kept,
                    });
                    run.table.merge(file.table);
                    run.unexpected.extend(file.unexpected);
                }
                Err(err) => {
                    error!(
                        path = %path.display(),
                        error = %err,
                        "failed to process extract, skipping"
                    );
                    run.outcomes.push(FileOutcome::Failed {
                        month,
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        run
    }

    pub fn aggregate_file(&self, path: &Path, month: YearMonth) -> Result<FileAggregate> {
        let reader = csv_read::open_extract(path)?;
        self.aggregate_csv(reader, month)
    }

    /// Folds an extract supplied as any reader.
    pub fn aggregate_reader<R: Read>(&self, reader: R, month: YearMonth) -> Result<FileAggregate> {
        self.aggregate_csv(csv_read::extract_reader(reader), month)
    }

    fn aggregate_csv<R: Read>(
        &self,
        mut reader: csv::Reader<R>,
        month: YearMonth,
    ) -> Result<FileAggregate> {
        let headers = reader.headers()?.clone();
        let columns =
            ExtractColumns::resolve(&headers, &self.columns, self.variant.amount_column(&self.columns))?;

        let mut file = FileAggregate::default();
        let mut chunk_index = 0usize;
        let rows_read = csv_read::for_each_chunk(&mut reader, self.chunk_size, |chunk| {
            for row in chunk {
                let record = columns.record(row)?;
                self.fold(&record, month, &mut file);
            }
            chunk_index += 1;
            debug!(chunk = chunk_index, rows = chunk.len(), "chunk folded");
            Ok(())
        })?;
        file.rows_read = rows_read;

        Ok(file)
    }

    /// Adds one record to the file-local totals.
    pub fn fold(&self, record: &RawRecord, month: YearMonth, file: &mut FileAggregate) {
        if !self.filter.admits(record) {
            return;
        }
        file.rows_kept += 1;

        let minor = record.minor_category.as_deref();
        if let Some(category) = self.filter.unexpected_category(minor) {
            file.unexpected.insert(category.to_string());
        }

        let buckets = self.variant.channel_buckets(&record.channel);
        if buckets.is_empty() {
            return;
        }

        let group = self.classifier.classify(
            Some(record.operating_basis.as_str()),
            Some(record.season.as_str()),
        );

        for tab in self.filter.item_tabs(minor) {
            for &channel in buckets {
                let key = AggregateKey {
                    brand: record.brand.clone(),
                    tab: tab.clone(),
                    month,
                    channel,
                    group,
                };
                file.table.add(key, record.amount);
            }
        }
    }
}

/// Aggregates every configured analysis month of `variant`.
pub fn aggregate_months(config: &Config, variant: Variant) -> AggregateRun {
    Aggregator::new(variant, config).run(variant.source_dir(&config.paths), &config.analysis_months)
}

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::accweek::tools::aggregate::Variant;
use crate::accweek::tools::classify::Classifier;
use crate::accweek::tools::config::Config;
use crate::accweek::tools::error::{Result, ToolError};
use crate::accweek::tools::filter::RecordFilter;
use crate::accweek::tools::io::csv_read::{self, ExtractColumns};
use crate::accweek::tools::model::OperatingGroup;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub rows: u64,
    pub amount: f64,
}

/// One classified row, kept for eyeballing the rule set against real data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub brand: String,
    pub operating_basis: String,
    pub season: String,
    pub group: OperatingGroup,
}

/// Per-operating-group breakdown of the rows of one extract that pass the
/// brand and category filter. Channel validity is not applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectionReport {
    pub path: PathBuf,
    pub rows_read: u64,
    pub rows_kept: u64,
    pub groups: BTreeMap<OperatingGroup, GroupStats>,
    pub samples: Vec<Sample>,
}

#[instrument(level = "info", skip_all, fields(path = %path.display(), %variant))]
pub fn inspect_file(
    path: &Path,
    variant: Variant,
    config: &Config,
    sample_limit: usize,
) -> Result<InspectionReport> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let filter = RecordFilter::from_config(&config.filter);
    let classifier = Classifier::from_config(&config.classifier);

    let mut reader = csv_read::open_extract(path)?;
    let headers = reader.headers()?.clone();
    let columns = ExtractColumns::resolve(
        &headers,
        &config.columns,
        variant.amount_column(&config.columns),
    )?;

    let mut report = InspectionReport {
        path: path.to_path_buf(),
        rows_read: 0,
        rows_kept: 0,
        groups: OperatingGroup::ALL
            .into_iter()
            .map(|group| (group, GroupStats::default()))
            .collect(),
        samples: Vec::new(),
    };

    let rows_read = csv_read::for_each_chunk(&mut reader, config.chunk_size, |chunk| {
        for row in chunk {
            let record = columns.record(row)?;
            if !filter.admits(&record) {
                continue;
            }
            report.rows_kept += 1;
            let group = classifier.classify(
                Some(record.operating_basis.as_str()),
                Some(record.season.as_str()),
            );
            let stats = report.groups.entry(group).or_default();
            stats.rows += 1;
            stats.amount += record.amount;

            if report.samples.len() < sample_limit {
                debug!(
                    brand = %record.brand,
                    basis = %record.operating_basis,
                    season = %record.season,
                    %group,
                    "sample classification"
                );
                report.samples.push(Sample {
                    brand: record.brand,
                    operating_basis: record.operating_basis,
                    season: record.season,
                    group,
                });
            }
        }
        Ok(())
    })?;
    report.rows_read = rows_read;

    Ok(report)
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "file: {}", self.path.display())?;
        writeln!(f, "rows read: {}", self.rows_read)?;
        writeln!(f, "rows kept: {}", self.rows_kept)?;
        for (group, stats) in &self.groups {
            writeln!(f, "{group}: {} rows, amount {:.0}", stats.rows, stats.amount)?;
        }
        if !self.samples.is_empty() {
            writeln!(f, "samples:")?;
            for sample in &self.samples {
                writeln!(
                    f,
                    "  {} | basis={} | season={} -> {}",
                    sample.brand, sample.operating_basis, sample.season, sample.group
                )?;
            }
        }
        Ok(())
    }
}

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::accweek::tools::config::ColumnConfig;
use crate::accweek::tools::error::{Result, ToolError};
use crate::accweek::tools::model::RawRecord;

const BOM: char = '\u{feff}';

/// Cell values the extracts use for "no value", alongside the empty cell.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True when a cell carries no value: blank, or one of [`MISSING_MARKERS`].
pub fn is_missing(raw: &str) -> bool {
    raw.trim().is_empty() || MISSING_MARKERS.contains(&raw)
}

/// The cell text, or `""` when the cell is missing.
pub fn cell(raw: &str) -> &str {
    if is_missing(raw) { "" } else { raw }
}

/// Opens an extract for streaming. Headers are required; ragged rows are
/// reported as errors rather than silently padded.
pub fn open_extract(path: &Path) -> Result<Reader<File>> {
    Ok(extract_reader_builder().from_path(path)?)
}

/// Wraps any reader with the same settings as [`open_extract`].
pub fn extract_reader<R: Read>(reader: R) -> Reader<R> {
    extract_reader_builder().from_reader(reader)
}

fn extract_reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(true).flexible(false);
    builder
}

/// Finds the position of `name` in the header row. A leading byte-order mark
/// on the first header is ignored.
pub fn resolve_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim_start_matches(BOM) == name)
        .ok_or_else(|| ToolError::MissingColumn(name.to_string()))
}

/// Parses an amount cell. Thousands separators are stripped and missing cells
/// count as zero.
pub fn parse_amount(raw: &str, line: u64) -> Result<f64> {
    if is_missing(raw) {
        return Ok(0.0);
    }
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ToolError::InvalidAmount {
            line,
            value: raw.to_string(),
        }),
    }
}

/// Line number of a record for diagnostics, or 0 when unknown.
pub fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|position| position.line()).unwrap_or(0)
}

/// Reads the remaining records in chunks of at most `chunk_size` and hands
/// each chunk to `visit`. Returns the number of records read.
///
/// The first error, whether from the reader or from `visit`, stops the scan.
pub fn for_each_chunk<R, F>(reader: &mut Reader<R>, chunk_size: usize, mut visit: F) -> Result<u64>
where
    R: Read,
    F: FnMut(&[StringRecord]) -> Result<()>,
{
    let chunk_size = chunk_size.max(1);
    let mut chunk: Vec<StringRecord> = Vec::with_capacity(chunk_size.min(8192));
    let mut record = StringRecord::new();
    let mut total = 0u64;

    while reader.read_record(&mut record)? {
        chunk.push(record.clone());
        total += 1;
        if chunk.len() == chunk_size {
            visit(chunk.as_slice())?;
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        visit(chunk.as_slice())?;
    }

    Ok(total)
}

/// Column positions of the fields the sales and inventory aggregators read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractColumns {
    channel: usize,
    brand: usize,
    major_category: usize,
    minor_category: usize,
    operating_basis: usize,
    season: usize,
    amount: usize,
}

impl ExtractColumns {
    /// Resolves every required column against the header row. `amount_column`
    /// differs between the sales and inventory extracts.
    pub fn resolve(
        headers: &StringRecord,
        columns: &ColumnConfig,
        amount_column: &str,
    ) -> Result<Self> {
        Ok(Self {
            channel: resolve_column(headers, &columns.channel)?,
            brand: resolve_column(headers, &columns.brand)?,
            major_category: resolve_column(headers, &columns.major_category)?,
            minor_category: resolve_column(headers, &columns.minor_category)?,
            operating_basis: resolve_column(headers, &columns.operating_basis)?,
            season: resolve_column(headers, &columns.season)?,
            amount: resolve_column(headers, amount_column)?,
        })
    }

    /// Extracts a [`RawRecord`] from a CSV row. Missing cells read as empty
    /// text, and a missing minor category as `None`.
    pub fn record(&self, row: &StringRecord) -> Result<RawRecord> {
        let field = move |index: usize| cell(row.get(index).unwrap_or_default());
        let minor = field(self.minor_category);
        Ok(RawRecord {
            channel: field(self.channel).to_string(),
            brand: field(self.brand).to_string(),
            major_category: field(self.major_category).to_string(),
            minor_category: (!minor.is_empty()).then(|| minor.to_string()),
            operating_basis: field(self.operating_basis).to_string(),
            season: field(self.season).to_string(),
            amount: parse_amount(field(self.amount), line_of(row))?,
        })
    }
}

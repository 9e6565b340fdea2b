use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accweek::tools::error::{Result, ToolError};

/// Label used for both the combined category tab and the combined channel
/// bucket.
pub const ALL_LABEL: &str = "ALL";

/// Operating group derived for every retained record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingGroup {
    Core,
    Outlet,
}

impl OperatingGroup {
    /// Both groups in emission order.
    pub const ALL: [OperatingGroup; 2] = [OperatingGroup::Core, OperatingGroup::Outlet];

    pub fn label(self) -> &'static str {
        match self {
            OperatingGroup::Core => "core",
            OperatingGroup::Outlet => "outlet",
        }
    }
}

impl fmt::Display for OperatingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Channel code as it appears in the `Channel 2` column of an extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelCode {
    /// `FRS`: franchise storefronts.
    Storefront,
    /// `HQ`: headquarters warehouse.
    Headquarters,
    /// `OR`: online retail.
    Online,
}

impl ChannelCode {
    /// Maps an extract code to a channel. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FRS" => Some(ChannelCode::Storefront),
            "HQ" => Some(ChannelCode::Headquarters),
            "OR" => Some(ChannelCode::Online),
            _ => None,
        }
    }
}

/// Channel bucket a record is accumulated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelGroup {
    /// Every qualifying channel of the variant.
    All,
    Storefront,
    Online,
    /// Headquarters and online stock combined (inventory only).
    HeadquartersOnline,
}

impl ChannelGroup {
    pub fn label(self) -> &'static str {
        match self {
            ChannelGroup::All => ALL_LABEL,
            ChannelGroup::Storefront => "storefront",
            ChannelGroup::Online => "online",
            ChannelGroup::HeadquartersOnline => "hq_online",
        }
    }
}

/// Composite key used inside a month entry, e.g. `ALL_core`.
pub fn composite_key(channel: ChannelGroup, group: OperatingGroup) -> String {
    format!("{}_{}", channel.label(), group.label())
}

/// Category tab a record contributes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemTab {
    All,
    Category(String),
}

impl ItemTab {
    pub fn label(&self) -> &str {
        match self {
            ItemTab::All => ALL_LABEL,
            ItemTab::Category(name) => name,
        }
    }
}

/// Calendar month labelled `YYYY.MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ToolError::InvalidMonth(format!("{year}.{month}")));
        }
        Ok(Self { year, month })
    }

    /// Normalises a two-digit-year label (`YY.MM`). Years 00-49 land in the
    /// 2000s, 50-99 in the 1900s.
    pub fn from_short(label: &str) -> Result<Self> {
        let invalid = || ToolError::InvalidMonth(label.to_string());
        let (yy, mm) = label.split_once('.').ok_or_else(invalid)?;
        if yy.len() != 2 || mm.len() != 2 {
            return Err(invalid());
        }
        let yy: i32 = yy.parse().map_err(|_| invalid())?;
        let month: u32 = mm.parse().map_err(|_| invalid())?;
        let year = if (0..50).contains(&yy) { 2000 + yy } else { 1900 + yy };
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Number of days in the month, leap years included.
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        match (
            NaiveDate::from_ymd_opt(self.year, self.month, 1),
            NaiveDate::from_ymd_opt(next_year, next_month, 1),
        ) {
            (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
            _ => 0,
        }
    }
}

impl FromStr for YearMonth {
    type Err = ToolError;

    fn from_str(label: &str) -> Result<Self> {
        let invalid = || ToolError::InvalidMonth(label.to_string());
        let (yyyy, mm) = label.split_once('.').ok_or_else(invalid)?;
        if yyyy.len() != 4 || mm.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = yyyy.parse().map_err(|_| invalid())?;
        let month: u32 = mm.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ToolError;

    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}.{:02}", self.year, self.month)
    }
}

/// One extract row, reduced to the columns the aggregators read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub channel: String,
    pub brand: String,
    pub major_category: String,
    /// Blank cells are `None`.
    pub minor_category: Option<String>,
    pub operating_basis: String,
    pub season: String,
    pub amount: f64,
}

/// Sparse aggregation key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AggregateKey {
    pub brand: String,
    pub tab: ItemTab,
    pub month: YearMonth,
    pub channel: ChannelGroup,
    pub group: OperatingGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_months_follow_the_century_boundary() {
        let cases = [
            ("25.11", "2025.11"),
            ("99.01", "1999.01"),
            ("49.12", "2049.12"),
            ("50.01", "1950.01"),
            ("00.06", "2000.06"),
        ];
        for (short, full) in cases {
            assert_eq!(YearMonth::from_short(short).expect("short label").to_string(), full);
        }
    }

    #[test]
    fn malformed_month_labels_are_rejected() {
        assert!("2024.13".parse::<YearMonth>().is_err());
        assert!("2024-01".parse::<YearMonth>().is_err());
        assert!("24.01".parse::<YearMonth>().is_err());
        assert!(YearMonth::from_short("2025.11").is_err());
        assert!(YearMonth::from_short("ab.01").is_err());
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        let days = |label: &str| label.parse::<YearMonth>().expect("month label").days_in_month();
        assert_eq!(days("2024.02"), 29);
        assert_eq!(days("2025.02"), 28);
        assert_eq!(days("2024.12"), 31);
        assert_eq!(days("2025.04"), 30);
    }

    #[test]
    fn composite_keys_join_channel_and_group() {
        assert_eq!(composite_key(ChannelGroup::All, OperatingGroup::Core), "ALL_core");
        assert_eq!(
            composite_key(ChannelGroup::HeadquartersOnline, OperatingGroup::Outlet),
            "hq_online_outlet"
        );
    }
}

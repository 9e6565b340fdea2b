//! Dense summary documents built from the sparse aggregate tables.
//!
//! Every brand × tab × month × channel group × operating group combination is
//! emitted, with zero standing in for combinations no record touched.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::accweek::tools::aggregate::{AggregateTable, Variant};
use crate::accweek::tools::config::Config;
use crate::accweek::tools::model::{
    AggregateKey, ChannelGroup, ItemTab, OperatingGroup, YearMonth, composite_key,
};

/// brand → tab → month → composite key → value.
pub type BrandTable<V> = BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, V>>>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub brands: BrandTable<i64>,
    pub unexpected_categories: Vec<String>,
    pub months: Vec<String>,
}

/// Inventory month entries mix rounded stock totals with the raw online sales
/// figure the frontend divides by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InventoryValue {
    Rounded(i64),
    Raw(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub brands: BrandTable<InventoryValue>,
    pub unexpected_categories: Vec<String>,
    pub months: Vec<String>,
    pub days_in_month: BTreeMap<String, u32>,
}

/// Rounds half to even, matching the rounding the frontend was built against.
pub fn round_amount(amount: f64) -> i64 {
    amount.round_ties_even() as i64
}

/// `ALL` followed by the configured item categories.
pub fn item_tabs(config: &Config) -> Vec<ItemTab> {
    std::iter::once(ItemTab::All)
        .chain(
            config
                .filter
                .item_categories
                .iter()
                .map(|category| ItemTab::Category(category.clone())),
        )
        .collect()
}

/// Visits every brand × tab × month cell in configuration order and stores
/// what `entry` builds for it.
fn build_table<V>(
    config: &Config,
    mut entry: impl FnMut(&str, &ItemTab, YearMonth) -> BTreeMap<String, V>,
) -> BrandTable<V> {
    let tabs = item_tabs(config);
    let mut brands: BrandTable<V> = BTreeMap::new();
    for brand in &config.filter.brands {
        let mut brand_tabs = BTreeMap::new();
        for tab in &tabs {
            let months: BTreeMap<String, BTreeMap<String, V>> = config
                .analysis_months
                .iter()
                .map(|&month| (month.to_string(), entry(brand.as_str(), tab, month)))
                .collect();
            brand_tabs.insert(tab.label().to_string(), months);
        }
        brands.insert(brand.clone(), brand_tabs);
    }
    brands
}

fn key(
    brand: &str,
    tab: &ItemTab,
    month: YearMonth,
    channel: ChannelGroup,
    group: OperatingGroup,
) -> AggregateKey {
    AggregateKey {
        brand: brand.to_string(),
        tab: tab.clone(),
        month,
        channel,
        group,
    }
}

fn month_labels(config: &Config) -> Vec<String> {
    config.analysis_months.iter().map(ToString::to_string).collect()
}

pub fn build_sales_summary(
    config: &Config,
    sales: &AggregateTable,
    unexpected: &BTreeSet<String>,
) -> SalesSummary {
    let brands = build_table(config, |brand, tab, month| {
        let mut entry = BTreeMap::new();
        for &channel in Variant::Sales.channel_groups() {
            for group in OperatingGroup::ALL {
                let total = sales.total(&key(brand, tab, month, channel, group));
                entry.insert(composite_key(channel, group), round_amount(total));
            }
        }
        entry
    });

    SalesSummary {
        brands,
        unexpected_categories: unexpected.iter().cloned().collect(),
        months: month_labels(config),
    }
}

/// Builds the inventory document. `sales` must already hold the sales totals
/// for the same months: its online figures are embedded unrounded as
/// `online_sales_<group>`.
pub fn build_inventory_summary(
    config: &Config,
    inventory: &AggregateTable,
    sales: &AggregateTable,
    unexpected: &BTreeSet<String>,
) -> InventorySummary {
    let brands = build_table(config, |brand, tab, month| {
        let mut entry = BTreeMap::new();
        for &channel in Variant::Inventory.channel_groups() {
            for group in OperatingGroup::ALL {
                let total = inventory.total(&key(brand, tab, month, channel, group));
                entry.insert(
                    composite_key(channel, group),
                    InventoryValue::Rounded(round_amount(total)),
                );
            }
        }
        for group in OperatingGroup::ALL {
            let online = sales.total(&key(brand, tab, month, ChannelGroup::Online, group));
            entry.insert(format!("online_sales_{group}"), InventoryValue::Raw(online));
        }
        entry
    });

    let days_in_month = config
        .analysis_months
        .iter()
        .map(|month| (month.to_string(), month.days_in_month()))
        .collect();

    InventorySummary {
        brands,
        unexpected_categories: unexpected.iter().cloned().collect(),
        months: month_labels(config),
        days_in_month,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            analysis_months: vec!["2024.01".parse().expect("month"), "2024.02".parse().expect("month")],
            ..Config::default()
        }
    }

    #[test]
    fn rounding_matches_half_to_even() {
        assert_eq!(round_amount(2.5), 2);
        assert_eq!(round_amount(3.5), 4);
        assert_eq!(round_amount(1.49), 1);
        assert_eq!(round_amount(-0.5), 0);
    }

    #[test]
    fn empty_table_yields_dense_zeroes() {
        let config = config();
        let summary = build_sales_summary(&config, &AggregateTable::new(), &BTreeSet::new());

        assert_eq!(summary.months, vec!["2024.01", "2024.02"]);
        assert_eq!(summary.brands.len(), 3);
        let mlb = &summary.brands["MLB"];
        assert_eq!(mlb.len(), 5);
        let entry = &mlb["ALL"]["2024.02"];
        assert_eq!(entry.len(), 6);
        assert!(entry.values().all(|value| *value == 0));
        assert!(entry.contains_key("storefront_outlet"));
    }

    #[test]
    fn inventory_embeds_raw_online_sales() {
        let config = config();
        let month: YearMonth = "2024.01".parse().expect("month");
        let mut sales = AggregateTable::new();
        let core = OperatingGroup::Core;
        sales.add(key("MLB", &ItemTab::All, month, ChannelGroup::Online, core), 10.25);
        let mut inventory = AggregateTable::new();
        inventory.add(key("MLB", &ItemTab::All, month, ChannelGroup::All, core), 99.5);

        let summary = build_inventory_summary(&config, &inventory, &sales, &BTreeSet::new());
        let entry = &summary.brands["MLB"]["ALL"]["2024.01"];

        assert_eq!(entry.len(), 8);
        assert_eq!(entry["ALL_core"], InventoryValue::Rounded(100));
        assert_eq!(entry["hq_online_outlet"], InventoryValue::Rounded(0));
        assert_eq!(entry["online_sales_core"], InventoryValue::Raw(10.25));
        assert_eq!(entry["online_sales_outlet"], InventoryValue::Raw(0.0));
        assert_eq!(summary.days_in_month["2024.02"], 29);
    }
}

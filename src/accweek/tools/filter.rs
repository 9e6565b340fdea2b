use std::collections::HashSet;

use crate::accweek::tools::config::FilterConfig;
use crate::accweek::tools::model::{ItemTab, RawRecord};

/// Brand and category whitelist applied to every extract row.
///
/// Rows with an unknown minor category are still admitted: they count towards
/// the `ALL` tab and are reported through [`RecordFilter::unexpected_category`].
#[derive(Debug, Clone)]
pub struct RecordFilter {
    brands: HashSet<String>,
    target_category: String,
    item_categories: HashSet<String>,
}

impl RecordFilter {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            brands: config.brands.iter().cloned().collect(),
            target_category: config.target_category.clone(),
            item_categories: config.item_categories.iter().cloned().collect(),
        }
    }

    pub fn admits(&self, record: &RawRecord) -> bool {
        self.brands.contains(&record.brand) && record.major_category == self.target_category
    }

    /// Tabs an admitted record contributes to. `ALL` always comes first.
    pub fn item_tabs(&self, minor_category: Option<&str>) -> Vec<ItemTab> {
        match minor_category {
            Some(category) if self.item_categories.contains(category) => {
                vec![ItemTab::All, ItemTab::Category(category.to_string())]
            }
            _ => vec![ItemTab::All],
        }
    }

    /// Returns the minor category when it is present but not whitelisted.
    pub fn unexpected_category<'r>(&self, minor_category: Option<&'r str>) -> Option<&'r str> {
        minor_category.filter(|category| !self.item_categories.contains(*category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(brand: &str, major: &str, minor: Option<&str>) -> RawRecord {
        RawRecord {
            channel: "FRS".into(),
            brand: brand.into(),
            major_category: major.into(),
            minor_category: minor.map(str::to_string),
            operating_basis: String::new(),
            season: String::new(),
            amount: 1.0,
        }
    }

    #[test]
    fn only_whitelisted_brands_in_target_category_pass() {
        let filter = RecordFilter::from_config(&FilterConfig::default());
        assert!(filter.admits(&record("MLB", "饰品", Some("Bag"))));
        assert!(filter.admits(&record("MLB KIDS", "饰品", None)));
        assert!(!filter.admits(&record("MLB", "服装", Some("Bag"))));
        assert!(!filter.admits(&record("OTHER", "饰品", Some("Bag"))));
        assert!(!filter.admits(&record(" MLB", "饰品", Some("Bag"))));
    }

    #[test]
    fn unknown_categories_only_reach_the_all_tab() {
        let filter = RecordFilter::from_config(&FilterConfig::default());
        assert_eq!(
            filter.item_tabs(Some("Bag")),
            vec![ItemTab::All, ItemTab::Category("Bag".into())]
        );
        assert_eq!(filter.item_tabs(Some("Socks")), vec![ItemTab::All]);
        assert_eq!(filter.item_tabs(None), vec![ItemTab::All]);
    }

    #[test]
    fn blank_categories_are_not_reported_as_unexpected() {
        let filter = RecordFilter::from_config(&FilterConfig::default());
        assert_eq!(filter.unexpected_category(Some("Socks")), Some("Socks"));
        assert_eq!(filter.unexpected_category(Some("Shoes")), None);
        assert_eq!(filter.unexpected_category(None), None);
    }
}

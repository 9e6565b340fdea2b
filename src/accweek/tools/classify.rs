use serde::Deserialize;

use crate::accweek::tools::config::ClassifierConfig;
use crate::accweek::tools::model::OperatingGroup;

/// Which operating-basis codes mark a record as core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    /// `INTRO` and `FOCUS`.
    #[default]
    Standard,
    /// `INTRO`, `FOCUS` and `26SS`, as used by the inventory debugging runs.
    Extended,
}

impl RuleSet {
    pub fn core_bases(self) -> &'static [&'static str] {
        match self {
            RuleSet::Standard => &["INTRO", "FOCUS"],
            RuleSet::Extended => &["INTRO", "FOCUS", "26SS"],
        }
    }
}

/// Maps (operating basis, season) pairs to an [`OperatingGroup`].
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    rule_set: RuleSet,
    core_seasons: Vec<String>,
}

impl Classifier {
    pub fn new(rule_set: RuleSet, core_seasons: Vec<String>) -> Self {
        Self {
            rule_set,
            core_seasons,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.rule_set, config.core_seasons.clone())
    }

    /// Total over all inputs: a blank basis falls back to the season
    /// substrings, everything else not listed is outlet.
    pub fn classify(&self, operating_basis: Option<&str>, season: Option<&str>) -> OperatingGroup {
        let basis = operating_basis.unwrap_or_default().trim();
        let season = season.unwrap_or_default().trim();

        if self.rule_set.core_bases().iter().any(|core| *core == basis) {
            return OperatingGroup::Core;
        }

        if basis.is_empty()
            && self
                .core_seasons
                .iter()
                .any(|core| season.contains(core.as_str()))
        {
            return OperatingGroup::Core;
        }

        OperatingGroup::Outlet
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(basis: &str, season: &str) -> OperatingGroup {
        Classifier::default().classify(Some(basis), Some(season))
    }

    #[test]
    fn focus_and_intro_are_core_regardless_of_season() {
        assert_eq!(classify("INTRO", "anything"), OperatingGroup::Core);
        assert_eq!(classify("FOCUS", ""), OperatingGroup::Core);
        assert_eq!(classify("  FOCUS ", "19SS"), OperatingGroup::Core);
    }

    #[test]
    fn basis_match_is_case_sensitive() {
        assert_eq!(classify("focus", ""), OperatingGroup::Outlet);
    }

    #[test]
    fn blank_basis_uses_season_substrings() {
        assert_eq!(classify("", "25SS-something"), OperatingGroup::Core);
        assert_eq!(classify("", "X24FW"), OperatingGroup::Core);
        assert_eq!(classify("   ", "25FW"), OperatingGroup::Core);
        assert_eq!(classify("", "23SS"), OperatingGroup::Outlet);
        assert_eq!(classify("", ""), OperatingGroup::Outlet);
    }

    #[test]
    fn other_basis_is_outlet_even_with_core_season() {
        assert_eq!(classify("OTHER", "26SS"), OperatingGroup::Outlet);
        assert_eq!(classify("26SS", ""), OperatingGroup::Outlet);
    }

    #[test]
    fn missing_values_degrade_to_blank() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(None, None), OperatingGroup::Outlet);
        assert_eq!(classifier.classify(None, Some("26SS")), OperatingGroup::Core);
    }

    #[test]
    fn extended_rule_set_accepts_26ss_basis() {
        let classifier = Classifier::new(RuleSet::Extended, vec!["24FW".into()]);
        assert_eq!(classifier.classify(Some("26SS"), Some("")), OperatingGroup::Core);
        assert_eq!(classifier.classify(Some(""), Some("25SS")), OperatingGroup::Outlet);
    }
}

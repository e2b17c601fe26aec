//! Characteristic registry.

use std::{collections::HashMap, sync::Arc};

use hanover_traits::{Characteristic, CharacteristicProvider};

use crate::{
    AssetGrowth, BookToMarket, MarketEquity, MarketEquityConfig, MeBasis, OperatingProfitability,
    PriorReturn,
};

/// Registry of configured characteristics, looked up by name.
///
/// A registry is fixed for the lifetime of the pipeline that owns it, so a
/// registered name identifies one configuration.
#[derive(Debug, Default)]
pub struct CharacteristicRegistry {
    characteristics: HashMap<String, Arc<dyn Characteristic>>,
}

impl CharacteristicRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { characteristics: HashMap::new() }
    }

    /// Register the standard sorting characteristics: market equity (at
    /// formation and at prior December), book-to-market, the prior-return
    /// strategies, operating profitability, and asset growth.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(MarketEquity::new()));
        registry.register(Arc::new(MarketEquity::with_config(MarketEquityConfig {
            basis: MeBasis::PriorDecember,
        })));
        registry.register(Arc::new(BookToMarket::new()));
        registry.register(Arc::new(PriorReturn::momentum()));
        registry.register(Arc::new(PriorReturn::short_term_reversal()));
        registry.register(Arc::new(PriorReturn::long_term_reversal()));
        registry.register(Arc::new(OperatingProfitability::new()));
        registry.register(Arc::new(AssetGrowth::new()));

        registry
    }

    /// Register a characteristic under its own name, replacing any
    /// previous registration.
    pub fn register(&mut self, characteristic: Arc<dyn Characteristic>) {
        self.characteristics.insert(characteristic.name().to_string(), characteristic);
    }

    /// Number of registered characteristics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characteristics.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characteristics.is_empty()
    }
}

impl CharacteristicProvider for CharacteristicRegistry {
    fn get(&self, name: &str) -> Option<Arc<dyn Characteristic>> {
        self.characteristics.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.characteristics.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_classic_sorts() {
        let registry = CharacteristicRegistry::with_defaults();

        for name in [
            "market_equity",
            "market_equity_dec",
            "book_to_market",
            "prior_2_12",
            "prior_1_1",
            "prior_13_60",
            "operating_profitability",
            "asset_growth",
        ] {
            assert!(registry.get(name).is_some(), "missing {name}");
        }
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn names_are_sorted() {
        let registry = CharacteristicRegistry::with_defaults();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn unknown_name_is_none() {
        let registry = CharacteristicRegistry::with_defaults();
        assert!(registry.get("sharpe_ratio").is_none());
    }

    #[test]
    fn registration_replaces_by_name() {
        let mut registry = CharacteristicRegistry::new();
        registry.register(Arc::new(MarketEquity::new()));
        registry.register(Arc::new(MarketEquity::new()));
        assert_eq!(registry.len(), 1);
    }
}

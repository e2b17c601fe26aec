//! Eligibility resolution over characteristic cross-sections.

use hanover_primitives::{RebalancePeriod, UniverseConfig};
use hanover_traits::{Characteristic, CharacteristicError, PanelView};
use polars::prelude::*;

use crate::{CharacError, snapshot::listing_at};

/// Applies the configured universe rules to a characteristic's raw values
/// and emits the per-period cross-section
/// `| symbol | exchange | value | eligible |`.
///
/// Every security listed at formation appears exactly once; ineligible
/// securities keep their raw value (or null) but are flagged out, never
/// assigned a default.
#[derive(Debug, Clone)]
pub struct CharacteristicResolver {
    universe: UniverseConfig,
}

impl CharacteristicResolver {
    /// Create a resolver with the given universe rules.
    #[must_use]
    pub const fn new(universe: UniverseConfig) -> Self {
        Self { universe }
    }

    /// Get the universe rules.
    #[must_use]
    pub const fn universe(&self) -> &UniverseConfig {
        &self.universe
    }

    /// Resolve one characteristic for one period.
    ///
    /// # Errors
    /// Returns `CharacteristicError::MissingField` (wrapped) if a required
    /// column, the exchange column, or an exclusion-rule column is absent
    /// from the panel schema; this is an integration error and aborts the
    /// request.
    pub fn resolve(
        &self,
        characteristic: &dyn Characteristic,
        view: &PanelView,
        period: &RebalancePeriod,
    ) -> Result<DataFrame, CharacError> {
        for &column in characteristic.required_columns() {
            if !view.has_column(column) {
                return Err(CharacteristicError::MissingField(column.to_string()).into());
            }
        }

        let price_columns: Vec<String> = view
            .prices_frame()
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        if !price_columns.iter().any(|c| c == "exchange") {
            return Err(CharacteristicError::MissingField("exchange".to_string()).into());
        }
        for rule in &self.universe.exclusions {
            if !price_columns.iter().any(|c| c == &rule.column) {
                return Err(CharacteristicError::MissingField(rule.column.clone()).into());
            }
        }

        let mut listing_columns: Vec<&str> = vec!["exchange"];
        for rule in &self.universe.exclusions {
            if !listing_columns.contains(&rule.column.as_str()) {
                listing_columns.push(&rule.column);
            }
        }

        let listing = listing_at(view.prices(), period.formation, &listing_columns);
        let values = characteristic.resolve(view, period)?;

        let joined = listing
            .join(values, [col("symbol")], [col("symbol")], JoinArgs::new(JoinType::Left))
            .sort(["symbol"], SortMultipleOptions::default())
            .collect()?;

        let symbols = joined.column("symbol")?.str()?;
        let exchanges = joined.column("exchange")?.str()?;
        let raw_values = joined.column("value")?.f64()?;
        let rule_columns: Vec<&StringChunked> = self
            .universe
            .exclusions
            .iter()
            .map(|rule| joined.column(&rule.column).and_then(|c| c.str()))
            .collect::<Result<_, _>>()?;

        let n = joined.height();
        let mut out_symbols: Vec<String> = Vec::with_capacity(n);
        let mut out_exchanges: Vec<Option<String>> = Vec::with_capacity(n);
        let mut out_values: Vec<Option<f64>> = Vec::with_capacity(n);
        let mut out_eligible: Vec<bool> = Vec::with_capacity(n);

        for i in 0..n {
            let value = raw_values.get(i).filter(|v| v.is_finite());
            let exchange = exchanges.get(i);

            let mut eligible = value.is_some();
            if self.universe.require_exchange && exchange.is_none() {
                eligible = false;
            }
            for (rule, column) in self.universe.exclusions.iter().zip(&rule_columns) {
                if let Some(v) = column.get(i) {
                    if rule.excluded.iter().any(|excluded| excluded == v) {
                        eligible = false;
                    }
                }
            }

            out_symbols.push(symbols.get(i).unwrap_or("").to_string());
            out_exchanges.push(exchange.map(ToString::to_string));
            out_values.push(value);
            out_eligible.push(eligible);
        }

        DataFrame::new(vec![
            Column::new("symbol".into(), out_symbols),
            Column::new("exchange".into(), out_exchanges),
            Column::new("value".into(), out_values),
            Column::new("eligible".into(), out_eligible),
        ])
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use hanover_primitives::{Date, ExclusionRule};

    use super::*;
    use crate::MarketEquity;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn period() -> RebalancePeriod {
        RebalancePeriod {
            index: 0,
            formation: d(1963, 6, 30),
            window_start: d(1963, 7, 1),
            window_end: d(1964, 6, 30),
            fiscal_year: 1962,
        }
    }

    fn view() -> PanelView {
        let prices = df! {
            "date" => &[d(1963, 6, 30), d(1963, 6, 30), d(1963, 6, 30)],
            "symbol" => &["ACME", "BIG", "DUALCO"],
            "price" => &[10.0, 50.0, 7.0],
            "shares_out" => &[1000.0, 2000.0, 300.0],
            "exchange" => &[Some("NYSE"), Some("NYSE"), None],
            "share_class" => &[Some("A"), Some("A"), Some("B")],
        }
        .unwrap();
        PanelView::new(prices, DataFrame::empty())
    }

    #[test]
    fn listed_securities_with_values_are_eligible() {
        let resolver = CharacteristicResolver::new(UniverseConfig::default());
        let resolved = resolver.resolve(&MarketEquity::new(), &view(), &period()).unwrap();

        assert_eq!(resolved.height(), 3);
        let eligible: Vec<Option<bool>> =
            resolved.column("eligible").unwrap().bool().unwrap().iter().collect();
        // ACME and BIG qualify; DUALCO has no exchange listing.
        assert_eq!(eligible, vec![Some(true), Some(true), Some(false)]);
    }

    #[test]
    fn missing_exchange_allowed_when_not_required() {
        let universe = UniverseConfig { require_exchange: false, ..Default::default() };
        let resolver = CharacteristicResolver::new(universe);
        let resolved = resolver.resolve(&MarketEquity::new(), &view(), &period()).unwrap();

        let eligible: Vec<Option<bool>> =
            resolved.column("eligible").unwrap().bool().unwrap().iter().collect();
        assert_eq!(eligible[2], Some(true));
    }

    #[test]
    fn exclusion_rules_flag_securities_out() {
        let universe = UniverseConfig {
            require_exchange: false,
            exclusions: vec![ExclusionRule {
                column: "share_class".to_string(),
                excluded: vec!["B".to_string()],
            }],
        };
        let resolver = CharacteristicResolver::new(universe);
        let resolved = resolver.resolve(&MarketEquity::new(), &view(), &period()).unwrap();

        let eligible: Vec<Option<bool>> =
            resolved.column("eligible").unwrap().bool().unwrap().iter().collect();
        assert_eq!(eligible, vec![Some(true), Some(true), Some(false)]);
        // The excluded security keeps its raw value.
        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        assert_eq!(values[2], Some(2100.0));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let prices = df! {
            "date" => &[d(1963, 6, 30)],
            "symbol" => &["ACME"],
            "price" => &[10.0],
            "exchange" => &["NYSE"],
        }
        .unwrap();
        let view = PanelView::new(prices, DataFrame::empty());

        let resolver = CharacteristicResolver::new(UniverseConfig::default());
        let result = resolver.resolve(&MarketEquity::new(), &view, &period());
        assert!(matches!(
            result,
            Err(CharacError::Characteristic(CharacteristicError::MissingField(field)))
                if field == "shares_out"
        ));
    }

    #[test]
    fn missing_rule_column_is_fatal() {
        let universe = UniverseConfig {
            require_exchange: true,
            exclusions: vec![ExclusionRule {
                column: "security_type".to_string(),
                excluded: vec!["ETF".to_string()],
            }],
        };
        let resolver = CharacteristicResolver::new(universe);
        let result = resolver.resolve(&MarketEquity::new(), &view(), &period());
        assert!(matches!(
            result,
            Err(CharacError::Characteristic(CharacteristicError::MissingField(field)))
                if field == "security_type"
        ));
    }
}

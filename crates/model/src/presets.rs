//! Classic factor construction presets.
//!
//! Each preset builds the standard 2x3 size/characteristic sort with NYSE
//! breakpoints and value weighting, combined into the familiar long-short
//! factor.

use hanover_calendar::CalendarConfig;
use hanover_primitives::{DateRange, Frequency, SortKey, SortMode, UniverseConfig, Weighting};

use crate::{
    BreakpointConfig, CharacteristicSort, FactorCombination, FactorLeg, FactorRequest, SortSpec,
};

/// The three cells of one size row (small = 0, big = 1).
fn size_row(bucket: usize) -> Vec<SortKey> {
    (0..3).map(|j| SortKey::new(vec![bucket, j])).collect()
}

/// The two cells of one characteristic column across both size rows.
fn charac_column(bucket: usize) -> Vec<SortKey> {
    (0..2).map(|i| SortKey::new(vec![i, bucket])).collect()
}

fn two_by_three(characteristic: &str) -> SortSpec {
    SortSpec::new(
        vec![
            CharacteristicSort::median("market_equity"),
            CharacteristicSort::terciles_30_70(characteristic),
        ],
        SortMode::Orthogonal,
    )
}

fn classic(
    name: &str,
    characteristic: &str,
    combination: FactorCombination,
    frequency: Frequency,
    range: DateRange,
) -> FactorRequest {
    FactorRequest {
        name: name.to_string(),
        sort: two_by_three(characteristic),
        combination,
        weighting: Weighting::Value,
        breakpoints: BreakpointConfig::nyse(),
        universe: UniverseConfig::default(),
        calendar: CalendarConfig { frequency, ..CalendarConfig::default() },
        range,
        as_of: None,
    }
}

/// Small-minus-big: the size factor from the 2x3 size/value sort.
#[must_use]
pub fn smb(range: DateRange) -> FactorRequest {
    let combination = FactorCombination::long_short(vec![
        FactorLeg::new(1.0, size_row(0)),
        FactorLeg::new(-1.0, size_row(1)),
    ]);
    classic("smb", "book_to_market", combination, Frequency::Annual, range)
}

/// High-minus-low: the value factor.
#[must_use]
pub fn hml(range: DateRange) -> FactorRequest {
    let combination = FactorCombination::long_short(vec![
        FactorLeg::new(1.0, charac_column(2)),
        FactorLeg::new(-1.0, charac_column(0)),
    ]);
    classic("hml", "book_to_market", combination, Frequency::Annual, range)
}

/// Robust-minus-weak: the operating profitability factor.
#[must_use]
pub fn rmw(range: DateRange) -> FactorRequest {
    let combination = FactorCombination::long_short(vec![
        FactorLeg::new(1.0, charac_column(2)),
        FactorLeg::new(-1.0, charac_column(0)),
    ]);
    classic("rmw", "operating_profitability", combination, Frequency::Annual, range)
}

/// Conservative-minus-aggressive: the investment factor, long low asset
/// growth.
#[must_use]
pub fn cma(range: DateRange) -> FactorRequest {
    let combination = FactorCombination::long_short(vec![
        FactorLeg::new(1.0, charac_column(0)),
        FactorLeg::new(-1.0, charac_column(2)),
    ]);
    classic("cma", "asset_growth", combination, Frequency::Annual, range)
}

/// Up-minus-down: the momentum factor, reformed monthly on prior (2-12)
/// returns.
#[must_use]
pub fn umd(range: DateRange) -> FactorRequest {
    let combination = FactorCombination::long_short(vec![
        FactorLeg::new(1.0, charac_column(2)),
        FactorLeg::new(-1.0, charac_column(0)),
    ]);
    classic("umd", "prior_2_12", combination, Frequency::Monthly, range)
}

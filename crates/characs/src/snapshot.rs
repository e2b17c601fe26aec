//! Point-in-time snapshots over the raw panel.

use chrono::Datelike;
use hanover_calendar::{add_months, month_end};
use hanover_primitives::{Date, RebalancePeriod};
use hanover_traits::date_lit;
use polars::prelude::*;

/// First calendar day of the month containing `date`.
#[must_use]
pub fn month_first(date: Date) -> Date {
    Date::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Last observation per security inside the month ending at `cutoff`.
///
/// Securities with no observation in the cutoff month (delisted before it)
/// drop out: a stale listing does not qualify as point-in-time data. The
/// result carries `| symbol |` plus the last value of each requested
/// column.
#[must_use]
pub fn listing_at(prices: LazyFrame, cutoff: Date, columns: &[&str]) -> LazyFrame {
    let aggs: Vec<Expr> = columns.iter().map(|&c| col(c).last()).collect();

    prices
        .filter(
            col("date")
                .gt_eq(date_lit(month_first(cutoff)))
                .and(col("date").lt_eq(date_lit(cutoff))),
        )
        .sort(["date"], SortMultipleOptions::default())
        .group_by([col("symbol")])
        .agg(aggs)
}

/// Market equity per security at `cutoff`: `|price| * shares_out` of the
/// last observation in the cutoff month, as `| symbol | me |`.
#[must_use]
pub fn market_equity_at(prices: LazyFrame, cutoff: Date) -> LazyFrame {
    listing_at(prices, cutoff, &["price", "shares_out"])
        .with_column((col("price").abs() * col("shares_out")).alias("me"))
        .select([col("symbol"), col("me")])
}

/// How fundamentals align to a formation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FiscalAlignment {
    /// Fiscal years ending in the period's labeled calendar year, the
    /// annual July convention.
    #[default]
    CalendarYear,
    /// The most recent fiscal year end satisfying the lag and staleness
    /// bounds, per security.
    LatestUsable,
}

/// Point-in-time window restricting fundamentals usable at a formation
/// date: public for at least the lag, no staler than the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalWindow {
    /// Calendar year of usable fiscal year ends (CalendarYear alignment).
    pub fiscal_year: i32,
    /// Formation date.
    pub formation: Date,
    /// Minimum months between fiscal year end and formation.
    pub lag_months: i32,
    /// Maximum months between fiscal year end and formation.
    pub staleness_months: i32,
    /// Alignment convention.
    pub alignment: FiscalAlignment,
}

impl FiscalWindow {
    /// Build the window for a rebalancing period.
    #[must_use]
    pub const fn for_period(
        period: &RebalancePeriod,
        lag_months: i32,
        staleness_months: i32,
        alignment: FiscalAlignment,
    ) -> Self {
        Self {
            fiscal_year: period.fiscal_year,
            formation: period.formation,
            lag_months,
            staleness_months,
            alignment,
        }
    }
}

/// One fundamentals row per security usable at the window's formation
/// date, as `| symbol | <fields...> | fiscal_year_end |`.
///
/// Securities with no usable fiscal year drop out.
#[must_use]
pub fn aligned_fundamentals(
    fundamentals: LazyFrame,
    fields: &[&str],
    window: &FiscalWindow,
) -> LazyFrame {
    // Any fiscal year end inside [formation - staleness, formation - lag],
    // counted by month, satisfies the publication rule.
    let freshest = add_months(window.formation, -window.lag_months);
    let stalest = add_months(window.formation, -window.staleness_months);
    let upper = month_end(freshest.year(), freshest.month());
    let lower = month_first(stalest);

    let mut lf = fundamentals.filter(
        col("fiscal_year_end")
            .gt_eq(date_lit(lower))
            .and(col("fiscal_year_end").lt_eq(date_lit(upper))),
    );

    if window.alignment == FiscalAlignment::CalendarYear {
        let year_start = Date::from_ymd_opt(window.fiscal_year, 1, 1).unwrap_or_default();
        let year_end = month_end(window.fiscal_year, 12);
        lf = lf.filter(
            col("fiscal_year_end")
                .gt_eq(date_lit(year_start))
                .and(col("fiscal_year_end").lt_eq(date_lit(year_end))),
        );
    }

    let mut aggs: Vec<Expr> = fields.iter().map(|&f| col(f).last()).collect();
    aggs.push(col("fiscal_year_end").last());

    lf.sort(["fiscal_year_end"], SortMultipleOptions::default())
        .group_by([col("symbol")])
        .agg(aggs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn prices() -> LazyFrame {
        df! {
            "date" => &[d(1963, 5, 31), d(1963, 6, 30), d(1963, 6, 30)],
            "symbol" => &["OLD", "ACME", "BIG"],
            "price" => &[3.0, -10.0, 50.0],
            "shares_out" => &[100.0, 1000.0, 2000.0],
        }
        .unwrap()
        .lazy()
    }

    #[test]
    fn market_equity_uses_absolute_price() {
        let me = market_equity_at(prices(), d(1963, 6, 30))
            .sort(["symbol"], SortMultipleOptions::default())
            .collect()
            .unwrap();

        assert_eq!(me.height(), 2);
        let values: Vec<Option<f64>> = me.column("me").unwrap().f64().unwrap().iter().collect();
        // ACME's quote is a bid/ask midpoint flagged negative; magnitude counts.
        assert_eq!(values[0], Some(10_000.0));
        assert_eq!(values[1], Some(100_000.0));
    }

    #[test]
    fn stale_listings_drop_out() {
        // OLD's last observation is May; it has no June listing.
        let me = market_equity_at(prices(), d(1963, 6, 30)).collect().unwrap();
        let symbols: Vec<Option<&str>> =
            me.column("symbol").unwrap().str().unwrap().iter().collect();
        assert!(!symbols.contains(&Some("OLD")));
    }

    #[test]
    fn calendar_year_alignment_picks_labeled_fiscal_year() {
        let fundamentals = df! {
            "symbol" => &["ACME", "ACME", "ACME"],
            "fiscal_year_end" => &[d(1960, 12, 31), d(1961, 12, 31), d(1962, 12, 31)],
            "book_equity" => &[1.0, 2.0, 3.0],
        }
        .unwrap()
        .lazy();

        let window = FiscalWindow {
            fiscal_year: 1962,
            formation: d(1963, 6, 30),
            lag_months: 6,
            staleness_months: 18,
            alignment: FiscalAlignment::CalendarYear,
        };
        let aligned =
            aligned_fundamentals(fundamentals, &["book_equity"], &window).collect().unwrap();

        assert_eq!(aligned.height(), 1);
        let be: Vec<Option<f64>> =
            aligned.column("book_equity").unwrap().f64().unwrap().iter().collect();
        assert_eq!(be[0], Some(3.0));
    }

    #[test]
    fn fresh_fiscal_year_excluded_by_lag() {
        let fundamentals = df! {
            "symbol" => &["NEWCO"],
            "fiscal_year_end" => &[d(1963, 3, 31)],
            "book_equity" => &[9.0],
        }
        .unwrap()
        .lazy();

        let window = FiscalWindow {
            fiscal_year: 1962,
            formation: d(1963, 6, 30),
            lag_months: 6,
            staleness_months: 18,
            alignment: FiscalAlignment::LatestUsable,
        };
        let aligned =
            aligned_fundamentals(fundamentals, &["book_equity"], &window).collect().unwrap();
        assert_eq!(aligned.height(), 0);
    }

    #[test]
    fn latest_usable_takes_freshest_qualifying_year() {
        let fundamentals = df! {
            "symbol" => &["ACME", "ACME"],
            "fiscal_year_end" => &[d(1962, 6, 30), d(1962, 12, 31)],
            "book_equity" => &[5.0, 7.0],
        }
        .unwrap()
        .lazy();

        let window = FiscalWindow {
            fiscal_year: 1962,
            formation: d(1963, 6, 30),
            lag_months: 6,
            staleness_months: 18,
            alignment: FiscalAlignment::LatestUsable,
        };
        let aligned =
            aligned_fundamentals(fundamentals, &["book_equity"], &window).collect().unwrap();

        let be: Vec<Option<f64>> =
            aligned.column("book_equity").unwrap().f64().unwrap().iter().collect();
        assert_eq!(be, vec![Some(7.0)]);
    }
}

//! Example: Monthly Momentum Sorts
//!
//! Builds a price-only synthetic panel and replicates the UMD factor:
//! monthly 2x3 size/prior-return sorts with NYSE breakpoints, long the
//! winners and short the losers.
//!
//! Run with: `cargo run --example momentum_sorts --features full`

use hanover::calendar::month_end;
use hanover::model::{FactorPipeline, umd};
use hanover::primitives::{Date, DateRange};
use hanover::traits::{DataSource, QueryRequest, SourceError};
use polars::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

const N_SECURITIES: usize = 40;

struct MemorySource {
    prices: DataFrame,
}

impl DataSource for MemorySource {
    fn query(&self, request: &QueryRequest) -> Result<DataFrame, SourceError> {
        match request.table.as_str() {
            "security_month" => Ok(self.prices.clone()),
            // Momentum needs no fundamentals; serve an empty table.
            "fundamentals_annual" => Ok(DataFrame::empty()),
            other => Err(SourceError::MissingTable(other.to_string())),
        }
    }
}

fn synthetic_source() -> MemorySource {
    let mut rng = StdRng::seed_from_u64(7);

    let mut dates: Vec<Date> = Vec::new();
    let mut symbols: Vec<String> = Vec::new();
    let mut returns: Vec<f64> = Vec::new();
    let mut prices: Vec<f64> = Vec::new();
    let mut shares: Vec<f64> = Vec::new();
    let mut exchanges: Vec<String> = Vec::new();

    for i in 0..N_SECURITIES {
        let symbol = format!("S{i:02}");
        // Give each security a persistent drift so the momentum sort has
        // something to find.
        let drift = rng.gen_range(-0.01..0.02);
        let shocks = Normal::new(drift, 0.05).expect("valid distribution");
        let shares_out = 1.0e6 * rng.gen_range(1.0..40.0);
        let mut price = rng.gen_range(10.0..60.0);

        for year in 1990..=1994i32 {
            for month in 1..=12u32 {
                let ret = shocks.sample(&mut rng);
                price *= 1.0 + ret;

                dates.push(month_end(year, month));
                symbols.push(symbol.clone());
                returns.push(ret);
                prices.push(price);
                shares.push(shares_out);
                exchanges.push("NYSE".to_string());
            }
        }
    }

    let prices = df! {
        "date" => &dates,
        "symbol" => &symbols,
        "asset_returns" => &returns,
        "price" => &prices,
        "shares_out" => &shares,
        "exchange" => &exchanges,
    }
    .expect("valid price frame");

    MemorySource { prices }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== hanover: Monthly UMD Sorts ===\n");

    let pipeline = FactorPipeline::with_default_characteristics(synthetic_source());
    let range = DateRange::new(
        Date::from_ymd_opt(1992, 1, 1).expect("valid date"),
        Date::from_ymd_opt(1993, 12, 31).expect("valid date"),
    );

    let request = umd(range);
    let series = pipeline.factor_series(&request)?;

    println!("{} monthly observations, {} available", series.len(), series.n_available());
    if let Some(summary) = series.summary() {
        println!(
            "mean {:+.3}%  std {:.3}%  min {:+.3}%  max {:+.3}%\n",
            summary.mean * 100.0,
            summary.std * 100.0,
            summary.min * 100.0,
            summary.max * 100.0
        );
    }

    for obs in &series.observations {
        match obs.value {
            Some(value) => println!("{}  {:+.4}", obs.date, value),
            None => println!("{}  unavailable", obs.date),
        }
    }

    // The six underlying portfolios are available too.
    let panels = pipeline.portfolio_returns(&request)?;
    println!("\n{} monthly panels, {} cells each", panels.len(), panels[0].cells.len());

    Ok(())
}

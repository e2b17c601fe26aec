//! Example: Replicating SMB and HML on a Synthetic Panel
//!
//! This example demonstrates the full hanover workflow:
//! 1. Building a synthetic monthly security panel with annual fundamentals
//! 2. Answering the classic SMB and HML factor requests
//! 3. Inspecting period coverage and cache behavior
//!
//! Run with: `cargo run --example three_factors --features full`

use hanover::calendar::month_end;
use hanover::model::{FactorPipeline, hml, smb};
use hanover::primitives::{Date, DateRange, FactorSeries};
use hanover::traits::{DataSource, QueryRequest, SourceError};
use polars::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

/// Securities in the synthetic universe.
const N_SECURITIES: usize = 60;

/// Panel span.
const FIRST_YEAR: i32 = 1989;
const LAST_YEAR: i32 = 1995;

struct MemorySource {
    prices: DataFrame,
    fundamentals: DataFrame,
}

impl DataSource for MemorySource {
    fn query(&self, request: &QueryRequest) -> Result<DataFrame, SourceError> {
        match request.table.as_str() {
            "security_month" => Ok(self.prices.clone()),
            "fundamentals_annual" => Ok(self.fundamentals.clone()),
            other => Err(SourceError::MissingTable(other.to_string())),
        }
    }
}

fn synthetic_source() -> MemorySource {
    let mut rng = StdRng::seed_from_u64(42);
    let monthly_return = Normal::new(0.008, 0.06).expect("valid distribution");

    let mut dates: Vec<Date> = Vec::new();
    let mut symbols: Vec<String> = Vec::new();
    let mut returns: Vec<f64> = Vec::new();
    let mut prices: Vec<f64> = Vec::new();
    let mut shares: Vec<f64> = Vec::new();
    let mut exchanges: Vec<String> = Vec::new();

    let mut fy_symbols: Vec<String> = Vec::new();
    let mut fy_ends: Vec<Date> = Vec::new();
    let mut book_equity: Vec<f64> = Vec::new();

    for i in 0..N_SECURITIES {
        let symbol = format!("S{i:02}");
        let exchange = if i % 3 == 0 { "AMEX" } else { "NYSE" };
        let shares_out = 1.0e6 * rng.gen_range(1.0..50.0);
        let mut price = rng.gen_range(5.0..80.0);

        for year in FIRST_YEAR..=LAST_YEAR {
            for month in 1..=12u32 {
                let ret = monthly_return.sample(&mut rng);
                price *= 1.0 + ret;

                dates.push(month_end(year, month));
                symbols.push(symbol.clone());
                returns.push(ret);
                prices.push(price);
                shares.push(shares_out);
                exchanges.push(exchange.to_string());
            }

            // One fiscal year per calendar year, ending in December.
            fy_symbols.push(symbol.clone());
            fy_ends.push(month_end(year, 12));
            book_equity.push(price * shares_out * rng.gen_range(0.2..1.5));
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

    let fundamentals = df! {
        "symbol" => &fy_symbols,
        "fiscal_year_end" => &fy_ends,
        "book_equity" => &book_equity,
    }
    .expect("valid fundamentals frame");

    MemorySource { prices, fundamentals }
}

fn print_series(series: &FactorSeries) {
    println!(
        "\n{} | {} observations, {} available",
        series.name.as_str(),
        series.len(),
        series.n_available()
    );

    if let Some(summary) = series.summary() {
        println!(
            "  mean {:+.3}%  std {:.3}%  min {:+.3}%  max {:+.3}%",
            summary.mean * 100.0,
            summary.std * 100.0,
            summary.min * 100.0,
            summary.max * 100.0
        );
    }

    for obs in series.observations.iter().take(6) {
        match obs.value {
            Some(value) => println!("  {}  {:+.4}", obs.date, value),
            None => println!("  {}  unavailable", obs.date),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== hanover: SMB and HML on a Synthetic Panel ===");

    let pipeline = FactorPipeline::with_default_characteristics(synthetic_source());
    let range = DateRange::new(
        Date::from_ymd_opt(1991, 7, 1).expect("valid date"),
        Date::from_ymd_opt(LAST_YEAR, 6, 30).expect("valid date"),
    );

    // =========================================================================
    // FACTOR SERIES
    // =========================================================================

    let smb_series = pipeline.factor_series(&smb(range))?;
    print_series(&smb_series);

    let hml_series = pipeline.factor_series(&hml(range))?;
    print_series(&hml_series);

    // =========================================================================
    // COVERAGE DIAGNOSTICS
    // =========================================================================

    println!("\n=== Period coverage (SMB sort) ===");
    let coverage = pipeline.coverage(&smb(range))?;
    println!("{:<12} {:>8} {:>10} {:>10} {:>12}", "formation", "listed", "eligible", "NYSE", "available");
    for period in &coverage.periods {
        println!(
            "{:<12} {:>8} {:>10} {:>10} {:>12}",
            period.period.formation.to_string(),
            period.n_listed,
            period.n_eligible,
            period.n_reference,
            period.available
        );
    }

    // =========================================================================
    // CACHE BEHAVIOR
    // =========================================================================

    let before = pipeline.cache_stats();
    let again = pipeline.factor_series(&smb(range))?;
    let after = pipeline.cache_stats();

    println!("\n=== Cache ===");
    println!("misses {} -> {} (second SMB request recomputed nothing)", before.misses, after.misses);
    println!("hits   {} -> {}", before.hits, after.hits);
    assert_eq!(smb_series, again);

    println!("\nDone. {} SMB observations across {} periods.", smb_series.len(), coverage.periods.len());

    Ok(())
}

//! Example: Momentum Sorts on Real Yahoo Finance Data
//!
//! Fetches daily quotes for a small universe, samples them to a monthly
//! panel, and replicates the UMD construction on it.
//!
//! Market capitalization uses a fixed share count per security, so the
//! size dimension is a price-level proxy; the example demonstrates the
//! plumbing, not a faithful size factor.
//!
//! Run with: `cargo run --example yahoo_finance --features full`

use std::collections::BTreeMap;

use chrono::Datelike;
use hanover::calendar::{add_months, month_end};
use hanover::model::{FactorPipeline, umd};
use hanover::primitives::{Date, DateRange, from_epoch_days};
use hanover::traits::{DataSource, QueryRequest, SourceError};
use polars::prelude::*;
use time::{Duration, OffsetDateTime};
use yahoo_finance_api as yahoo;

/// Universe fetched from Yahoo Finance.
const STOCKS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "META", "NVDA", "AMD", "INTC", "CRM", "ADBE", "ORCL", "JNJ", "UNH",
    "PFE", "MRK", "ABBV", "JPM", "BAC", "WFC", "GS", "MS",
];

/// Synthetic share count applied to every security.
const SHARES_OUT: f64 = 1.0e6;

struct MemorySource {
    prices: DataFrame,
}

impl DataSource for MemorySource {
    fn query(&self, request: &QueryRequest) -> Result<DataFrame, SourceError> {
        match request.table.as_str() {
            "security_month" => Ok(self.prices.clone()),
            "fundamentals_annual" => Ok(DataFrame::empty()),
            other => Err(SourceError::MissingTable(other.to_string())),
        }
    }
}

fn quote_date(timestamp: i64) -> Date {
    from_epoch_days((timestamp / 86_400) as i32)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== hanover: UMD on Yahoo Finance Data ===\n");

    let provider = yahoo::YahooConnector::new()?;
    let end = OffsetDateTime::now_utc();
    let start = end - Duration::days(4 * 365);

    // =========================================================================
    // FETCH AND SAMPLE TO MONTH ENDS
    // =========================================================================

    // Per symbol: last close of each calendar month.
    let mut month_closes: BTreeMap<String, BTreeMap<Date, f64>> = BTreeMap::new();
    for symbol in STOCKS {
        match provider.get_quote_history(symbol, start, end).await {
            Ok(response) => {
                let Ok(quotes) = response.quotes() else {
                    println!("  {symbol} - no quotes in response");
                    continue;
                };
                let closes = month_closes.entry((*symbol).to_string()).or_default();
                for quote in quotes {
                    let date = quote_date(quote.timestamp);
                    let key = month_end(date.year(), date.month());
                    closes.insert(key, quote.adjclose);
                }
                println!("  {symbol} - {} months", closes.len());
            }
            Err(e) => println!("  {symbol} - failed: {e}"),
        }
    }

    // =========================================================================
    // BUILD THE MONTHLY PANEL
    // =========================================================================

    let mut dates: Vec<Date> = Vec::new();
    let mut symbols: Vec<String> = Vec::new();
    let mut returns: Vec<f64> = Vec::new();
    let mut prices: Vec<f64> = Vec::new();
    let mut shares: Vec<f64> = Vec::new();
    let mut exchanges: Vec<String> = Vec::new();

    let mut first_month: Option<Date> = None;
    let mut last_month: Option<Date> = None;

    for (symbol, closes) in &month_closes {
        let months: Vec<(&Date, &f64)> = closes.iter().collect();
        for pair in months.windows(2) {
            let (_, prev_close) = pair[0];
            let (date, close) = pair[1];

            dates.push(*date);
            symbols.push(symbol.clone());
            returns.push(close / prev_close - 1.0);
            prices.push(*close);
            shares.push(SHARES_OUT);
            exchanges.push("NYSE".to_string());

            first_month = Some(first_month.map_or(*date, |d| d.min(*date)));
            last_month = Some(last_month.map_or(*date, |d| d.max(*date)));
        }
    }

    let (Some(first), Some(last)) = (first_month, last_month) else {
        println!("no quotes fetched; nothing to do");
        return Ok(());
    };

    let panel = df! {
        "date" => &dates,
        "symbol" => &symbols,
        "asset_returns" => &returns,
        "price" => &prices,
        "shares_out" => &shares,
        "exchange" => &exchanges,
    }?;
    println!("\npanel: {} rows, {} securities", panel.height(), month_closes.len());

    // =========================================================================
    // REPLICATE UMD
    // =========================================================================

    // Leave fourteen months of lookback for the prior (2-12) window.
    let range = DateRange::new(add_months(first, 14), last);
    let pipeline = FactorPipeline::with_default_characteristics(MemorySource { prices: panel });

    let series = pipeline.factor_series(&umd(range))?;

    println!("\nUMD, {} monthly observations:", series.len());
    for obs in &series.observations {
        match obs.value {
            Some(value) => println!("  {}  {:+.4}", obs.date, value),
            None => println!("  {}  unavailable", obs.date),
        }
    }

    if let Some(summary) = series.summary() {
        println!(
            "\nmean {:+.3}%  std {:.3}%  ({} available months)",
            summary.mean * 100.0,
            summary.std * 100.0,
            summary.count
        );
    }

    Ok(())
}

//! Factor replication CLI tool.
//!
//! Fetches a small universe from Yahoo Finance, samples it to a monthly
//! panel, and replicates a size or momentum factor on it.
//!
//! Usage: `cargo run --bin replicate --features cli -- FACTOR [--years N]`
//! Example: `cargo run --bin replicate --features cli -- mom --years 3`

use std::{collections::BTreeMap, env};

use chrono::Datelike;
use hanover::calendar::{CalendarConfig, add_months, month_end};
use hanover::model::{
    BreakpointConfig, CharacteristicSort, FactorCombination, FactorLeg, FactorPipeline,
    FactorRequest, SortSpec, umd,
};
use hanover::primitives::{
    Date, DateRange, Frequency, SortKey, SortMode, UniverseConfig, Weighting, from_epoch_days,
};
use hanover::traits::{DataSource, QueryRequest, SourceError};
use polars::prelude::*;
use time::{Duration, OffsetDateTime};
use yahoo_finance_api as yahoo;

/// Default history to fetch, in years.
const DEFAULT_YEARS: i64 = 4;

/// Synthetic share count applied to every security; market value is a
/// price-level proxy.
const SHARES_OUT: f64 = 1.0e6;

/// Universe fetched from Yahoo Finance.
const STOCKS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "META", "NVDA", "AMD", "INTC", "CRM", "ADBE", "ORCL", "JNJ", "UNH",
    "PFE", "MRK", "ABBV", "JPM", "BAC", "WFC", "GS", "MS", "C", "BLK", "SCHW", "AXP", "USB",
];

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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: replicate FACTOR [--years N]");
        eprintln!("Factors: size (small-minus-big), mom (up-minus-down)");
        std::process::exit(1);
    }

    let factor = args[1].to_lowercase();
    let years = parse_years(&args);

    if factor != "size" && factor != "mom" {
        eprintln!("Unknown factor '{factor}'; expected 'size' or 'mom'");
        std::process::exit(1);
    }

    println!("\nReplicating {factor} over {years} year(s) of data...\n");

    match run(&factor, years).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_years(args: &[String]) -> i64 {
    for i in 0..args.len() {
        if args[i] == "--years" && i + 1 < args.len() {
            if let Ok(y) = args[i + 1].parse::<i64>() {
                return y;
            }
        }
    }
    DEFAULT_YEARS
}

async fn run(factor: &str, years: i64) -> Result<(), Box<dyn std::error::Error>> {
    let (panel, first, last) = fetch_monthly_panel(years).await?;
    println!("panel: {} rows through {last}", panel.height());

    let pipeline = FactorPipeline::with_default_characteristics(MemorySource { prices: panel });

    // Leave fourteen months of lookback for the prior (2-12) window.
    let range = DateRange::new(add_months(first, 14), last);
    let request = match factor {
        "mom" => umd(range),
        _ => size_request(range),
    };

    let series = pipeline.factor_series(&request)?;

    println!("\n{}, {} monthly observations:", request.name, series.len());
    for obs in &series.observations {
        match obs.value {
            Some(value) => println!("  {}  {:+.4}", obs.date, value),
            None => println!("  {}  unavailable", obs.date),
        }
    }

    if let Some(summary) = series.summary() {
        println!(
            "\nmean {:+.3}%  std {:.3}%  min {:+.3}%  max {:+.3}%",
            summary.mean * 100.0,
            summary.std * 100.0,
            summary.min * 100.0,
            summary.max * 100.0
        );
    }

    let stats = pipeline.cache_stats();
    println!("cache: {} misses, {} hits", stats.misses, stats.hits);

    Ok(())
}

/// Small-minus-big on a monthly median size sort.
fn size_request(range: DateRange) -> FactorRequest {
    FactorRequest {
        name: "size".to_string(),
        sort: SortSpec::new(
            vec![CharacteristicSort::median("market_equity")],
            SortMode::Orthogonal,
        ),
        combination: FactorCombination::long_short(vec![
            FactorLeg::new(1.0, vec![SortKey::new(vec![0])]),
            FactorLeg::new(-1.0, vec![SortKey::new(vec![1])]),
        ]),
        weighting: Weighting::Value,
        breakpoints: BreakpointConfig::default(),
        universe: UniverseConfig::default(),
        calendar: CalendarConfig { frequency: Frequency::Monthly, ..CalendarConfig::default() },
        range,
        as_of: None,
    }
}

async fn fetch_monthly_panel(
    years: i64,
) -> Result<(DataFrame, Date, Date), Box<dyn std::error::Error>> {
    let provider = yahoo::YahooConnector::new()?;
    let end = OffsetDateTime::now_utc();
    let start = end - Duration::days(years * 365);

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
                    let date = from_epoch_days((quote.timestamp / 86_400) as i32);
                    closes.insert(month_end(date.year(), date.month()), quote.adjclose);
                }
            }
            Err(e) => println!("  {symbol} - failed: {e}"),
        }
    }

    let mut dates: Vec<Date> = Vec::new();
    let mut symbols: Vec<String> = Vec::new();
    let mut returns: Vec<f64> = Vec::new();
    let mut prices: Vec<f64> = Vec::new();
    let mut shares: Vec<f64> = Vec::new();
    let mut exchanges: Vec<String> = Vec::new();

    let mut first: Option<Date> = None;
    let mut last: Option<Date> = None;

    for (symbol, closes) in &month_closes {
        let months: Vec<(&Date, &f64)> = closes.iter().collect();
        for pair in months.windows(2) {
            let (_, prev_close) = pair[0];
            let (date, close) = pair[1];

            dates.push(**date);
            symbols.push(symbol.clone());
            returns.push(close / prev_close - 1.0);
            prices.push(*close);
            shares.push(SHARES_OUT);
            exchanges.push("NYSE".to_string());

            first = Some(first.map_or(**date, |d| d.min(**date)));
            last = Some(last.map_or(**date, |d| d.max(**date)));
        }
    }

    let (Some(first), Some(last)) = (first, last) else {
        return Err("no quotes fetched".into());
    };

    let panel = df! {
        "date" => &dates,
        "symbol" => &symbols,
        "asset_returns" => &returns,
        "price" => &prices,
        "shares_out" => &shares,
        "exchange" => &exchanges,
    }?;

    Ok((panel, first, last))
}

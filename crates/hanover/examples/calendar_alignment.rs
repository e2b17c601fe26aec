//! Example: Rebalancing Calendars and Fiscal Alignment
//!
//! Prints the annual and monthly rebalancing schedules for a date range
//! and shows which fiscal years each formation date may use under the
//! six-month publication lag.
//!
//! Run with: `cargo run --example calendar_alignment --features full`

use hanover::calendar::{
    CalendarConfig, RebalanceCalendar, fundamental_usable, month_end, months_between,
};
use hanover::primitives::{Date, DateRange, Frequency};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let range = DateRange::new(
        Date::from_ymd_opt(1963, 7, 1).expect("valid date"),
        Date::from_ymd_opt(1966, 6, 30).expect("valid date"),
    );

    // =========================================================================
    // ANNUAL SCHEDULE
    // =========================================================================

    println!("=== Annual schedule (July to June) ===");
    let annual = RebalanceCalendar::new(CalendarConfig::default())?;
    println!("{:<12} {:<12} {:<12} {:>12}", "formation", "start", "end", "fiscal year");
    for period in annual.periods(&range)? {
        println!(
            "{:<12} {:<12} {:<12} {:>12}",
            period.formation.to_string(),
            period.window_start.to_string(),
            period.window_end.to_string(),
            period.fiscal_year
        );
    }

    // =========================================================================
    // MONTHLY SCHEDULE
    // =========================================================================

    println!("\n=== Monthly schedule (first six periods) ===");
    let monthly = RebalanceCalendar::new(CalendarConfig {
        frequency: Frequency::Monthly,
        ..CalendarConfig::default()
    })?;
    for period in monthly.periods(&range)?.iter().take(6) {
        println!("{period}  formed {}", period.formation);
    }

    // =========================================================================
    // PUBLICATION LAG
    // =========================================================================

    println!("\n=== Publication lag at the June 1964 formation ===");
    let formation = month_end(1964, 6);
    for (year, month) in [(1962, 12), (1963, 6), (1963, 12), (1964, 3)] {
        let fiscal_end = month_end(year, month);
        let usable = fundamental_usable(fiscal_end, formation, 6, 18);
        println!(
            "fiscal year ending {}  age {:>2} months  usable: {}",
            fiscal_end,
            months_between(fiscal_end, formation),
            usable
        );
    }

    Ok(())
}

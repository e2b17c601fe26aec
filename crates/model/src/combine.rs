//! Factor combination.

use std::sync::Arc;

use hanover_primitives::{FactorSeries, Observation};

use crate::{FactorCombination, PortfolioPanel};

/// Combine per-period portfolio panels into a factor series.
///
/// A leg's value on a date is the simple average of its cells' returns;
/// the factor value is the coefficient-weighted sum of the legs. Any
/// unavailable input makes the factor unavailable that date — explicit
/// `None`, never a substituted zero. Panels must arrive in period order;
/// their windows are disjoint, so the observations concatenate sorted.
#[must_use]
pub fn combine_panels(
    name: &str,
    panels: &[Arc<PortfolioPanel>],
    combination: &FactorCombination,
) -> FactorSeries {
    let mut observations = Vec::new();

    for panel in panels {
        for (idx, &date) in panel.dates.iter().enumerate() {
            let mut value = Some(0.0);

            for leg in &combination.legs {
                let mut leg_sum = 0.0;
                let mut leg_available = true;
                for cell in &leg.cells {
                    match panel.cell(cell).and_then(|series| series.returns[idx]) {
                        Some(ret) => leg_sum += ret,
                        None => {
                            leg_available = false;
                            break;
                        }
                    }
                }

                value = match (value, leg_available) {
                    (Some(total), true) => {
                        Some(total + leg.coefficient * leg_sum / leg.cells.len() as f64)
                    }
                    _ => None,
                };
                if value.is_none() {
                    break;
                }
            }

            observations.push(Observation::new(date, value));
        }
    }

    FactorSeries::new(name, observations)
}

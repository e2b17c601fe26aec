//! Factor series types.

use serde::{Deserialize, Serialize};

use crate::Date;

/// Name of a factor or sorting strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorName(pub String);

impl FactorName {
    /// Create a new factor name.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the factor name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FactorName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FactorName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One dated value of a factor or portfolio return series.
///
/// `value` is `None` when the observation is explicitly unavailable (too
/// few eligible securities, all constituents missing a return). It is
/// never silently zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date.
    pub date: Date,
    /// Value, or `None` when unavailable.
    pub value: Option<f64>,
}

impl Observation {
    /// Create a new observation.
    #[must_use]
    pub const fn new(date: Date, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// Summary statistics over the available observations of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of available observations.
    pub count: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
}

/// Named ordered sequence of dated factor values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSeries {
    /// Series name.
    pub name: FactorName,
    /// Observations in ascending date order.
    pub observations: Vec<Observation>,
}

impl FactorSeries {
    /// Create a new series.
    #[must_use]
    pub fn new(name: impl Into<FactorName>, observations: Vec<Observation>) -> Self {
        debug_assert!(observations.windows(2).all(|w| w[0].date < w[1].date));
        Self { name: name.into(), observations }
    }

    /// Number of observations, available or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The observation on `date`, if the series covers it.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<&Observation> {
        self.observations
            .binary_search_by_key(&date, |obs| obs.date)
            .ok()
            .map(|i| &self.observations[i])
    }

    /// Available (date, value) pairs.
    #[must_use]
    pub fn available(&self) -> Vec<(Date, f64)> {
        self.observations.iter().filter_map(|obs| obs.value.map(|v| (obs.date, v))).collect()
    }

    /// Number of available observations.
    #[must_use]
    pub fn n_available(&self) -> usize {
        self.observations.iter().filter(|obs| obs.value.is_some()).count()
    }

    /// Summary statistics over the available observations, or `None` for a
    /// series with no available values.
    #[must_use]
    pub fn summary(&self) -> Option<SeriesSummary> {
        let values: Vec<f64> = self.observations.iter().filter_map(|obs| obs.value).collect();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(SeriesSummary { count, mean, std, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> FactorSeries {
        FactorSeries::new(
            "smb",
            vec![
                Observation::new(d(2000, 1, 31), Some(0.01)),
                Observation::new(d(2000, 2, 29), None),
                Observation::new(d(2000, 3, 31), Some(0.03)),
            ],
        )
    }

    #[test]
    fn get_by_date() {
        let series = sample();
        assert_eq!(series.get(d(2000, 1, 31)).and_then(|o| o.value), Some(0.01));
        assert_eq!(series.get(d(2000, 2, 29)).and_then(|o| o.value), None);
        assert!(series.get(d(2000, 4, 30)).is_none());
    }

    #[test]
    fn unavailable_kept_but_not_counted() {
        let series = sample();
        assert_eq!(series.len(), 3);
        assert_eq!(series.n_available(), 2);
        assert_eq!(series.available().len(), 2);
    }

    #[test]
    fn summary_skips_unavailable() {
        let summary = sample().summary().unwrap();
        assert_eq!(summary.count, 2);
        assert!((summary.mean - 0.02).abs() < 1e-12);
        assert!((summary.min - 0.01).abs() < 1e-12);
        assert!((summary.max - 0.03).abs() < 1e-12);
    }

    #[test]
    fn summary_of_empty_series() {
        let series = FactorSeries::new("hml", Vec::new());
        assert!(series.is_empty());
        assert!(series.summary().is_none());
    }
}

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hanover/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod security;
pub use security::Symbol;

mod period;
pub use period::{DateRange, Frequency, RebalancePeriod, from_epoch_days, to_epoch_days};

mod sort;
pub use sort::{SortKey, cell_grid};

mod config;
pub use config::{
    ExclusionRule, QuantileBasis, SortMode, TieBreak, UniverseConfig, UniverseFilter, Weighting,
};

mod breakpoints;
pub use breakpoints::BreakpointSet;

mod series;
pub use series::{FactorName, FactorSeries, Observation, SeriesSummary};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;

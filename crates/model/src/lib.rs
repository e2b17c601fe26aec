#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hanover/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod request;
pub use request::{
    BreakpointConfig, CharacteristicSort, FactorCombination, FactorLeg, FactorRequest, SortSpec,
};

mod assign;
pub use assign::{Assignment, AssignmentEngine, AssignmentSet, SortInput};

mod aggregate;
pub use aggregate::{CellSeries, PortfolioPanel, aggregate_period};

mod combine;
pub use combine::combine_panels;

mod pipeline;
pub use pipeline::{CoverageReport, FactorPipeline, PeriodCoverage, PipelineConfig};

mod presets;
pub use presets::{cma, hml, rmw, smb, umd};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use hanover_cache::{CacheStats, ComputeCache};
    pub use hanover_primitives::{
        DateRange, FactorSeries, Frequency, SortKey, SortMode, TieBreak, Weighting,
    };
    pub use hanover_traits::{DataSource, QueryRequest};

    pub use super::{FactorPipeline, FactorRequest, ModelError, PipelineConfig};
}

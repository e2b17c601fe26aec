#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hanover/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod breakpoints;
pub use breakpoints::{breakpoints, breakpoints_with_basis, equal_quantiles, weighted_breakpoints};

mod bucket;
pub use bucket::{assign_buckets, bucket_counts};

mod weights;
pub use weights::{proportional_weights, weighted_mean_available};

mod error;
pub use error::MathError;

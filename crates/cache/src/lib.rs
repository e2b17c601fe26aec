#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hanover/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod key;
pub use key::{CacheKey, Stage};

mod store;
pub use store::{CacheStats, ComputeCache};

mod error;
pub use error::CacheError;

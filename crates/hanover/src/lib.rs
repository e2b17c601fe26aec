//! # hanover
//!
//! A Rust engine for replicating characteristic-sorted equity factor
//! datasets from security-level panel data.
//!
//! This crate provides a unified interface to the hanover ecosystem.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Trait abstractions
//! - `calendar`: Rebalancing calendar and fiscal alignment
//! - `math`: Breakpoint and aggregation numerics
//! - `characs`: Point-in-time characteristic implementations
//! - `cache`: Memoized computation layer
//! - `model`: Portfolio construction and the pipeline coordinator
//!
//! ## Example
//!
//! ```rust,ignore
//! use hanover::model::{FactorPipeline, smb};
//! use hanover::primitives::DateRange;
//!
//! let pipeline = FactorPipeline::with_default_characteristics(source);
//! let series = pipeline.factor_series(&smb(range))?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use hanover_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use hanover_traits as traits;
#[cfg(feature = "calendar")]
#[doc(inline)]
pub use hanover_calendar as calendar;
#[cfg(feature = "math")]
#[doc(inline)]
pub use hanover_math as math;
#[cfg(feature = "characs")]
#[doc(inline)]
pub use hanover_characs as characs;
#[cfg(feature = "cache")]
#[doc(inline)]
pub use hanover_cache as cache;
#[cfg(feature = "model")]
#[doc(inline)]
pub use hanover_model as model;

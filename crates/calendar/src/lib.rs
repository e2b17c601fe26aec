#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hanover/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod align;
pub use align::{add_months, fundamental_usable, month_end, months_between};

mod schedule;
pub use schedule::{CalendarConfig, RebalanceCalendar};

mod error;
pub use error::CalendarError;

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hanover/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod snapshot;
pub use snapshot::{
    FiscalAlignment, FiscalWindow, aligned_fundamentals, listing_at, market_equity_at, month_first,
};

mod market_equity;
pub use market_equity::{MarketEquity, MarketEquityConfig, MeBasis};

mod book_to_market;
pub use book_to_market::{BookToMarket, BookToMarketConfig};

mod prior_return;
pub use prior_return::{PriorReturn, PriorReturnConfig};

mod profitability;
pub use profitability::{OperatingProfitability, OperatingProfitabilityConfig};

mod investment;
pub use investment::{AssetGrowth, AssetGrowthConfig};

mod registry;
pub use registry::CharacteristicRegistry;

mod resolver;
pub use resolver::CharacteristicResolver;

mod error;
pub use error::CharacError;

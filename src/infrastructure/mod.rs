pub mod cached_market_data;
pub mod core;
pub mod delta;
pub mod mock;
pub mod observability;

pub use cached_market_data::CachedMarketDataService;
pub use delta::DeltaMarketDataService;
pub use mock::MockMarketDataService;

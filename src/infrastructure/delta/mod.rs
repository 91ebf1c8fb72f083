pub mod common;
pub mod market_data;

pub use common::DEFAULT_BASE_URL;
pub use market_data::{DeltaMarketDataService, DeltaMarketDataServiceBuilder};

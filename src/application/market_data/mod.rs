// Market data processing modules
pub mod squeeze_indicator;

pub use squeeze_indicator::SqueezeIndicator;

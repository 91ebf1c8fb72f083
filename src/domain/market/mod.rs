// Market data domain
pub mod candle;
pub mod instrument;
pub mod resolution;

pub use candle::{Candle, CandleSeries};
pub use instrument::{ContractType, Instrument, InstrumentState};
pub use resolution::Resolution;

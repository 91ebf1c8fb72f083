use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract type as reported by the venue catalog.
///
/// Unknown venue values are preserved verbatim so they survive logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    PerpetualFutures,
    Futures,
    CallOptions,
    PutOptions,
    Spot,
    Other(String),
}

impl ContractType {
    pub fn from_venue(raw: &str) -> Self {
        match raw {
            "perpetual_futures" => ContractType::PerpetualFutures,
            "futures" => ContractType::Futures,
            "call_options" => ContractType::CallOptions,
            "put_options" => ContractType::PutOptions,
            "spot" => ContractType::Spot,
            other => ContractType::Other(other.to_string()),
        }
    }
}

/// Lifecycle state of an instrument on the venue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentState {
    Live,
    Expired,
    Upcoming,
    Other(String),
}

impl InstrumentState {
    pub fn from_venue(raw: &str) -> Self {
        match raw {
            "live" => InstrumentState::Live,
            "expired" => InstrumentState::Expired,
            "upcoming" => InstrumentState::Upcoming,
            other => InstrumentState::Other(other.to_string()),
        }
    }
}

/// A tradable instrument from the venue catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub contract_type: ContractType,
    pub state: InstrumentState,
    pub quote_asset: String,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        contract_type: ContractType,
        state: InstrumentState,
        quote_asset: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            contract_type,
            state,
            quote_asset: quote_asset.into(),
        }
    }

    /// Shorthand for a live perpetual quoted in `quote_asset`
    pub fn live_perpetual(symbol: impl Into<String>, quote_asset: impl Into<String>) -> Self {
        Self::new(
            symbol,
            ContractType::PerpetualFutures,
            InstrumentState::Live,
            quote_asset,
        )
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

use crate::domain::errors::SeriesError;
use serde::{Deserialize, Serialize};

/// One OHLCV bar. `timestamp` is the bar open time in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn validate(&self) -> Result<(), SeriesError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(SeriesError::NonFinite {
                    timestamp: self.timestamp,
                    field,
                });
            }
            if value < 0.0 {
                return Err(SeriesError::Negative {
                    timestamp: self.timestamp,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Candles strictly ascending by timestamp with no duplicates.
///
/// Only [`CandleSeries::from_raw`] constructs a series, so every instance
/// upholds the ordering invariant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Normalizes candles in venue order into an ascending series.
    ///
    /// Duplicate timestamps collapse to the occurrence that came LAST in the
    /// input, so a re-sent bar replaces the earlier copy.
    pub fn from_raw(raw: Vec<Candle>) -> Result<Self, SeriesError> {
        for candle in &raw {
            candle.validate()?;
        }

        let mut sorted = raw;
        // Stable: equal timestamps keep their fetch order
        sorted.sort_by_key(|c| c.timestamp);

        let mut candles: Vec<Candle> = Vec::with_capacity(sorted.len());
        for candle in sorted {
            match candles.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => candles.push(candle),
            }
        }

        Ok(Self { candles })
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

}

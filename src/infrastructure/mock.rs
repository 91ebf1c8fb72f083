use crate::domain::errors::MarketDataError;
use crate::domain::market::{Candle, ContractType, Instrument, InstrumentState, Resolution};
use crate::domain::ports::MarketDataService;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// In-memory venue for offline runs and tests.
///
/// Candle requests return the configured series regardless of the requested
/// window, so fixtures can use any timestamps.
#[derive(Default)]
pub struct MockMarketDataService {
    instruments: Vec<Instrument>,
    volumes: HashMap<String, f64>,
    candles: HashMap<String, Vec<Candle>>,
    candle_errors: HashSet<String>,
    catalog_fails: bool,
    catalog_calls: AtomicUsize,
    candle_log: Mutex<Vec<String>>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instrument(mut self, instrument: Instrument, volume_24h: f64) -> Self {
        self.volumes.insert(instrument.symbol.clone(), volume_24h);
        self.instruments.push(instrument);
        self
    }

    /// Adds a catalog entry with no ticker volume
    pub fn with_unquoted_instrument(mut self, instrument: Instrument) -> Self {
        self.instruments.push(instrument);
        self
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_candle_error(mut self, symbol: &str) -> Self {
        self.candle_errors.insert(symbol.to_string());
        self
    }

    pub fn fail_catalog(mut self) -> Self {
        self.catalog_fails = true;
        self
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    /// Symbols passed to `get_candles`, in call order
    pub fn candle_requests(&self) -> Vec<String> {
        match self.candle_log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Deterministic synthetic universe covering every scan status
    pub fn demo() -> Self {
        const BASE_TS: i64 = 1_700_000_000;
        const BARS: usize = 60;

        info!("MockMarketDataService: Building demo universe");

        Self::new()
            .with_instrument(Instrument::live_perpetual("BTCUSDT", "USDT"), 52_000.0)
            .with_candles(
                "BTCUSDT",
                synthetic_series(BASE_TS, BARS, 64_000.0, 0.0, 0.001, 0.01, 1.0),
            )
            .with_instrument(Instrument::live_perpetual("ETHUSDT", "USDT"), 41_000.0)
            .with_candles(
                "ETHUSDT",
                synthetic_series(BASE_TS, BARS, 3_100.0, 0.01, 0.0, 0.005, 3.0),
            )
            .with_instrument(Instrument::live_perpetual("SOLUSDT", "USDT"), 27_500.0)
            .with_candles(
                "SOLUSDT",
                synthetic_series(BASE_TS, BARS, 150.0, -0.008, 0.0, 0.004, 1.0),
            )
            .with_instrument(Instrument::live_perpetual("DOGEUSDT", "USDT"), 19_000.0)
            .with_candles(
                "DOGEUSDT",
                synthetic_series(BASE_TS, BARS, 0.16, 0.0, 0.002, 0.012, 4.0),
            )
            .with_instrument(Instrument::live_perpetual("XRPUSDT", "USDT"), 12_000.0)
            .with_candles(
                "XRPUSDT",
                synthetic_series(BASE_TS, 12, 0.55, 0.0, 0.001, 0.01, 1.0),
            )
            .with_instrument(Instrument::live_perpetual("ADAUSDT", "USDT"), 8_000.0)
            .with_candle_error("ADAUSDT")
            .with_instrument(
                Instrument::new(
                    "C-BTC-70000-311226",
                    ContractType::CallOptions,
                    InstrumentState::Live,
                    "USDT",
                ),
                99_000.0,
            )
            .with_instrument(
                Instrument::new(
                    "LUNAUSDT",
                    ContractType::PerpetualFutures,
                    InstrumentState::Expired,
                    "USDT",
                ),
                88_000.0,
            )
    }
}

/// Hourly bars around `base` with a linear drift plus a sine wobble.
///
/// `step`, `wobble` and `range` are fractions of `base`. The last bar's
/// volume is `last_volume_mult` times the flat volume of the others.
fn synthetic_series(
    start_ts: i64,
    bars: usize,
    base: f64,
    step: f64,
    wobble: f64,
    range: f64,
    last_volume_mult: f64,
) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(bars);
    let mut prev_close = base;

    for i in 0..bars {
        let close = base * (1.0 + step * i as f64 + wobble * (i as f64).sin());
        let half_range = base * range / 2.0;
        let volume = if i + 1 == bars {
            1_000.0 * last_volume_mult
        } else {
            1_000.0
        };

        candles.push(Candle::new(
            start_ts + i as i64 * 3600,
            prev_close,
            close.max(prev_close) + half_range,
            (close.min(prev_close) - half_range).max(0.0),
            close,
            volume,
        ));
        prev_close = close;
    }
    candles
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_products(&self) -> Result<Vec<Instrument>, MarketDataError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if self.catalog_fails {
            return Err(MarketDataError::Rejected {
                endpoint: "/v2/products".to_string(),
            });
        }
        Ok(self.instruments.clone())
    }

    async fn get_volumes(&self) -> Result<HashMap<String, f64>, MarketDataError> {
        Ok(self.volumes.clone())
    }

    async fn get_candles(
        &self,
        symbol: &str,
        _resolution: Resolution,
        _start: i64,
        _end: i64,
    ) -> Result<Vec<Candle>, MarketDataError> {
        match self.candle_log.lock() {
            Ok(mut log) => log.push(symbol.to_string()),
            Err(poisoned) => poisoned.into_inner().push(symbol.to_string()),
        }

        if self.candle_errors.contains(symbol) {
            return Err(MarketDataError::Status {
                endpoint: "/v2/history/candles".to_string(),
                status: 503,
                body: "service unavailable".to_string(),
            });
        }

        Ok(self.candles.get(symbol).cloned().unwrap_or_default())
    }
}

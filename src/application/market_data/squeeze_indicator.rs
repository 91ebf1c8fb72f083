//! Squeeze and volume-activity readings for a candle series
//!
//! On the trailing window ending at the last bar this computes:
//! - Bollinger Bands (SMA ± k·sample std-dev of close)
//! - Keltner Channels (SMA ± k·ATR, ATR being the simple mean of True Range)
//! - the squeeze flag (Bollinger strictly inside Keltner)
//! - a volume spike flag, trend direction and percent change

use crate::domain::market::{Candle, CandleSeries};
use crate::domain::scan::{Band, IndicatorParams, IndicatorSnapshot, Trend, VolumeWindow};
use statrs::statistics::{Data, Distribution};
use ta::indicators::TrueRange;
use ta::{Close, High, Low, Next};

impl High for Candle {
    fn high(&self) -> f64 {
        self.high
    }
}

impl Low for Candle {
    fn low(&self) -> f64 {
        self.low
    }
}

impl Close for Candle {
    fn close(&self) -> f64 {
        self.close
    }
}

#[derive(Debug, Clone, Default)]
pub struct SqueezeIndicator {
    params: IndicatorParams,
}

impl SqueezeIndicator {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Evaluates the last bar of `series`.
    ///
    /// Returns `None` when the series is shorter than
    /// [`IndicatorParams::required_candles`] or the window yields no finite reading.
    pub fn evaluate(&self, series: &CandleSeries) -> Option<IndicatorSnapshot> {
        let window = self.params.window;
        let candles = series.as_slice();
        let n = candles.len();

        // Sample std-dev needs two points
        if window < 2 || n < self.params.required_candles() {
            return None;
        }

        let last = candles[n - 1];
        let recent = &candles[n - window..];

        let closes: Vec<f64> = recent.iter().map(|c| c.close).collect();
        let close_data = Data::new(closes);
        let sma = close_data.mean()?;
        let std_dev = close_data.std_dev()?;

        let atr = average_true_range(candles, window)?;

        let bollinger = Band {
            upper: sma + self.params.bb_multiplier * std_dev,
            lower: sma - self.params.bb_multiplier * std_dev,
        };
        let keltner = Band {
            upper: sma + self.params.kc_multiplier * atr,
            lower: sma - self.params.kc_multiplier * atr,
        };

        let volume_slice = match self.params.volume_window {
            VolumeWindow::Inclusive => recent,
            VolumeWindow::Exclusive => &candles[n - 1 - window..n - 1],
        };
        let volume_mean = Data::new(volume_slice.iter().map(|c| c.volume).collect::<Vec<_>>())
            .mean()?;

        let reference = candles[n - 1 - window].close;
        if reference == 0.0 {
            return None;
        }
        let change_pct = (last.close - reference) / reference * 100.0;

        let snapshot = IndicatorSnapshot {
            price: last.close,
            squeeze_on: bollinger.strictly_inside(&keltner),
            bb_width: bollinger.width(),
            volume_spike: last.volume > volume_mean,
            trend: if last.close > sma {
                Trend::Bull
            } else {
                Trend::Bear
            },
            change_pct,
            sma,
            std_dev,
            atr,
            bollinger,
            keltner,
            volume_mean,
        };

        is_finite(&snapshot).then_some(snapshot)
    }
}

/// Simple mean of True Range over the last `window` bars.
///
/// The first bar of the series has no previous close, so its range never
/// enters the window; callers guarantee `candles.len() > window`.
fn average_true_range(candles: &[Candle], window: usize) -> Option<f64> {
    let mut true_range = TrueRange::new();
    let ranges: Vec<f64> = candles.iter().map(|c| true_range.next(c)).collect();

    let start = ranges.len().checked_sub(window)?;
    if start == 0 {
        return None;
    }
    Data::new(ranges[start..].to_vec()).mean()
}

fn is_finite(s: &IndicatorSnapshot) -> bool {
    [
        s.price,
        s.bb_width,
        s.change_pct,
        s.sma,
        s.std_dev,
        s.atr,
        s.bollinger.upper,
        s.bollinger.lower,
        s.keltner.upper,
        s.keltner.lower,
        s.volume_mean,
    ]
    .iter()
    .all(|v| v.is_finite())
}

//! Indicator formulas over closing prices
//!
//! Pure functions on `&[f64]`, evaluated at the most recent point. Edge cases
//! propagate as non-finite values instead of errors: an SMA window longer than
//! the series yields `NaN`, as does RSI over fewer than two closes.

use std::fmt;
use ta::Next;
use ta::indicators::{
    ExponentialMovingAverage, MovingAverageConvergenceDivergence, SimpleMovingAverage,
};

/// RSI look-back
pub const RSI_PERIOD: usize = 14;
/// MACD fast EMA span
pub const MACD_FAST: usize = 12;
/// MACD slow EMA span
pub const MACD_SLOW: usize = 26;
/// MACD signal EMA span
pub const MACD_SIGNAL: usize = 9;

/// Latest MACD values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl fmt::Display for MacdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}, {:?}, {:?}", self.macd, self.signal, self.histogram)
    }
}

/// Latest smoothed gain/loss pair behind an RSI value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiValue {
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub rsi: f64,
}

/// Mean of the trailing `window` closes
pub fn sma(closes: &[f64], window: usize) -> f64 {
    if window == 0 || window > closes.len() {
        return f64::NAN;
    }
    let Ok(mut sma) = SimpleMovingAverage::new(window) else {
        return f64::NAN;
    };
    let mut value = f64::NAN;
    for &close in closes {
        value = sma.next(close);
    }
    value
}

/// EMA with α = 2/(span+1), seeded by the first close
pub fn ema(closes: &[f64], span: usize) -> f64 {
    ema_series(closes, span).last().copied().unwrap_or(f64::NAN)
}

/// EMA at every point of `values`
///
/// A span with no `span + 1` in `usize` has no defined α and yields `NaN`.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    if span.checked_add(1).is_none() {
        return vec![f64::NAN; values.len()];
    }
    match ExponentialMovingAverage::new(span) {
        Ok(mut ema) => values.iter().map(|&v| ema.next(v)).collect(),
        Err(_) => vec![f64::NAN; values.len()],
    }
}

/// Wilder smoothing (α = 1/period) expressed as an EMA span
fn wilder_span(period: usize) -> usize {
    period.saturating_mul(2) - 1
}

/// RSI with Wilder smoothing of gains and losses
///
/// Saturates at 100 when the smoothed loss is exactly zero.
pub fn rsi(closes: &[f64], period: usize) -> RsiValue {
    let undefined = RsiValue {
        avg_gain: f64::NAN,
        avg_loss: f64::NAN,
        rsi: f64::NAN,
    };
    if closes.len() < 2 || period == 0 {
        return undefined;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

    let span = wilder_span(period);
    let avg_gain = ema(&gains, span);
    let avg_loss = ema(&losses, span);

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    RsiValue {
        avg_gain,
        avg_loss,
        rsi,
    }
}

/// MACD(12, 26, 9) at the latest point
pub fn macd(closes: &[f64]) -> MacdValue {
    let undefined = MacdValue {
        macd: f64::NAN,
        signal: f64::NAN,
        histogram: f64::NAN,
    };
    let Ok(mut indicator) = MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL)
    else {
        return undefined;
    };

    closes.iter().fold(undefined, |_, &close| {
        let out = indicator.next(close);
        MacdValue {
            macd: out.macd,
            signal: out.signal,
            histogram: out.histogram,
        }
    })
}

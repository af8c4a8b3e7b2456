//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Warmup: the value is undefined until the signal line exists, i.e. for the
//! first (slow - 1) + (signal - 1) bars.

use crate::domain::indicator::ema::{ema_of, ema_of_optional};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<Option<MacdValue>> {
    if fast == 0 || slow == 0 || signal_period == 0 {
        return vec![None; bars.len()];
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_of(&closes, fast);
    let ema_slow = ema_of(&closes, slow);

    let macd_line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();
    let signal_line = ema_of_optional(&macd_line, signal_period);

    macd_line
        .iter()
        .zip(&signal_line)
        .map(|(line, signal)| match (line, signal) {
            (Some(line), Some(signal)) => Some(MacdValue {
                line: *line,
                signal: *signal,
                histogram: line - signal,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::bars_from_closes;

    fn macd_default(bars: &[PriceBar]) -> Vec<Option<MacdValue>> {
        calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
    }

    #[test]
    fn macd_empty_bars() {
        assert!(macd_default(&[]).is_empty());
    }

    #[test]
    fn macd_warmup_default() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let values = macd_default(&bars_from_closes(&closes));
        let warmup = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;
        for (i, v) in values.iter().enumerate() {
            assert_eq!(v.is_some(), i >= warmup, "bar {}", i);
        }
    }

    #[test]
    fn macd_constant_prices_is_zero() {
        let values = calculate_macd(&bars_from_closes(&[50.0; 20]), 3, 6, 3);
        for v in values.iter().flatten() {
            assert!(v.line.abs() < 1e-12);
            assert!(v.signal.abs() < 1e-12);
            assert!(v.histogram.abs() < 1e-12);
        }
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let values = macd_default(&bars_from_closes(&closes));
        let last = values.last().unwrap().unwrap();
        assert!(last.line > 0.0);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0)
            .collect();
        for v in macd_default(&bars_from_closes(&closes)).iter().flatten() {
            assert!((v.histogram - (v.line - v.signal)).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_zero_period() {
        let values = calculate_macd(&bars_from_closes(&[1.0, 2.0]), 0, 26, 9);
        assert!(values.iter().all(Option::is_none));
    }
}

//! Simple moving average over closes or volumes.
//!
//! SMA[i] = mean(x[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: rolling_mean(&closes, period),
    }
}

pub fn calculate_volume_sma(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
    IndicatorSeries {
        indicator_type: IndicatorType::VolumeSma(period),
        values: rolling_mean(&volumes, period),
    }
}

/// Each window is summed from scratch so the result does not depend on
/// accumulated floating-point drift.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::bars_from_closes;

    #[test]
    fn sma_warmup_is_undefined() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = calculate_sma(&bars, 3);
        assert_eq!(series.values[0], None);
        assert_eq!(series.values[1], None);
        assert!(series.values[2].is_some());
    }

    #[test]
    fn sma_values() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = calculate_sma(&bars, 3);
        assert!((series.values[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((series.values[3].unwrap() - 3.0).abs() < 1e-12);
        assert!((series.values[4].unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sma_zero_is_a_value_not_a_placeholder() {
        let bars = bars_from_closes(&[0.0, 0.0, 0.0]);
        let series = calculate_sma(&bars, 2);
        assert_eq!(series.values[0], None);
        assert_eq!(series.values[1], Some(0.0));
    }

    #[test]
    fn sma_period_longer_than_history() {
        let bars = bars_from_closes(&[1.0, 2.0]);
        let series = calculate_sma(&bars, 200);
        assert!(series.values.iter().all(Option::is_none));
    }

    #[test]
    fn sma_zero_period() {
        let bars = bars_from_closes(&[1.0, 2.0]);
        let series = calculate_sma(&bars, 0);
        assert!(series.values.iter().all(Option::is_none));
    }

    #[test]
    fn volume_sma() {
        let mut bars = bars_from_closes(&[1.0, 1.0, 1.0]);
        bars[0].volume = 100;
        bars[1].volume = 200;
        bars[2].volume = 600;
        let series = calculate_volume_sma(&bars, 3);
        assert_eq!(series.indicator_type, IndicatorType::VolumeSma(3));
        assert!((series.values[2].unwrap() - 300.0).abs() < 1e-12);
    }
}

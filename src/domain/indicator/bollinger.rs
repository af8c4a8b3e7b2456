//! Bollinger Bands.
//!
//! - Middle: SMA over n closes
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N). A flat window
//! has zero width: all three bands equal the mean.
//!
//! Warmup: first (period-1) bars are undefined.

use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

pub fn calculate_bollinger(
    bars: &[PriceBar],
    period: usize,
    stddev_mult_x100: u32,
) -> Vec<Option<BollingerBands>> {
    if period == 0 {
        return vec![None; bars.len()];
    }
    let mult = stddev_mult_x100 as f64 / 100.0;

    (0..bars.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let middle: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            Some(BollingerBands {
                upper: middle + mult * stddev,
                middle,
                lower: middle - mult * stddev,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::bars_from_closes;

    #[test]
    fn bollinger_warmup() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let bands = calculate_bollinger(&bars, 3, 200);
        assert!(bands[0].is_none());
        assert!(bands[1].is_none());
        assert!(bands[2].is_some());
        assert!(bands[4].is_some());
    }

    #[test]
    fn bollinger_constant_values_collapse_to_mean() {
        let bars = bars_from_closes(&[100.0; 5]);
        let b = calculate_bollinger(&bars, 3, 200)[2].unwrap();
        assert!((b.middle - 100.0).abs() < f64::EPSILON);
        assert!((b.upper - 100.0).abs() < f64::EPSILON);
        assert!((b.lower - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let b = calculate_bollinger(&bars, 3, 200)[2].unwrap();

        let expected_middle: f64 = 20.0;
        let variance: f64 = (100.0 + 0.0 + 100.0) / 3.0;
        let stddev = variance.sqrt();

        assert!((b.middle - expected_middle).abs() < 1e-10);
        assert!((b.upper - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((b.lower - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let one = calculate_bollinger(&bars, 3, 100)[2].unwrap();
        let two = calculate_bollinger(&bars, 3, 200)[2].unwrap();
        assert!(((two.upper - two.lower) - 2.0 * (one.upper - one.lower)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        let b = calculate_bollinger(&bars, 3, 200)[2].unwrap();
        assert!(((b.upper - b.middle) - (b.middle - b.lower)).abs() < 1e-10);
    }
}

//! Average True Range with Wilder's smoothing.
//!
//! TR[0] = high - low; TR[i] = max(h-l, |h-pc|, |l-pc|).
//! Seed: mean of the first n TRs; then ATR = (prev * (n-1) + TR) / n.
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < period {
        return IndicatorSeries::undefined(IndicatorType::Atr(period), bars.len());
    }

    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    let mut values = vec![None; bars.len()];
    let mut atr = tr_values[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = Some(atr);

    for i in period..bars.len() {
        atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
        values[i] = Some(atr);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}

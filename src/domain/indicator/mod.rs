//! Technical indicator engine.
//!
//! Every calculation is a pure function of the bar slice it receives and
//! returns one value per bar. Warmup bars carry `None`; consumers must treat
//! `None` as "no signal possible" and never as zero.
//!
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a single-valued indicator over a bar sequence
//! - `IndicatorSet`: the fixed set of indicators attached to each bar
//! - `EnrichedBar`: a bar together with its `IndicatorSet`

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::calculate_atr;
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use macd::{calculate_macd, MacdValue};
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, calculate_volume_sma};

use crate::domain::error::{Result, SetupscanError};
use crate::domain::ohlcv::PriceBar;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    VolumeSma(usize),
    Rsi(usize),
    Atr(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// A series of `len` undefined values.
    pub fn undefined(indicator_type: IndicatorType, len: usize) -> Self {
        IndicatorSeries {
            indicator_type,
            values: vec![None; len],
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// Indicator periods. The defaults are the fixed windows the detectors are
/// calibrated against.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub sma_short: usize,
    pub sma_medium: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub bb_period: usize,
    pub bb_stddev_mult_x100: u32,
    pub volume_sma_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            sma_short: 20,
            sma_medium: 50,
            sma_long: 200,
            rsi_period: 14,
            atr_period: 14,
            bb_period: 20,
            bb_stddev_mult_x100: 200,
            volume_sma_period: 20,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
        }
    }
}

impl IndicatorConfig {
    /// Number of bars after which every indicator in the set is defined.
    pub fn longest_window(&self) -> usize {
        let macd = self.macd_slow + self.macd_signal - 1;
        [
            self.sma_short,
            self.sma_medium,
            self.sma_long,
            self.rsi_period + 1,
            self.atr_period,
            self.bb_period,
            self.volume_sma_period,
            macd,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// The indicators attached to one bar.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorSet {
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi14: Option<f64>,
    pub atr14: Option<f64>,
    /// ATR as a percentage of the close (2.0 means 2%).
    pub atr_pct: Option<f64>,
    pub bollinger: Option<BollingerBands>,
    pub volume_sma20: Option<f64>,
    pub macd: Option<MacdValue>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnrichedBar {
    pub bar: PriceBar,
    pub indicators: IndicatorSet,
}

impl EnrichedBar {
    /// Volume relative to its 20-bar average.
    pub fn volume_ratio(&self) -> Option<f64> {
        match self.indicators.volume_sma20 {
            Some(avg) if avg > 0.0 => Some(self.bar.volume as f64 / avg),
            _ => None,
        }
    }

    /// Signed distance of the close from `reference`, in percent.
    pub fn distance_pct(&self, reference: Option<f64>) -> Option<f64> {
        match reference {
            Some(r) if r != 0.0 => Some((self.bar.close - r) / r * 100.0),
            _ => None,
        }
    }
}

/// Enrich `bars` with the default indicator set.
pub fn compute_indicators(bars: &[PriceBar]) -> Result<Vec<EnrichedBar>> {
    compute_indicators_with(bars, &IndicatorConfig::default())
}

/// Enrich `bars` with indicators computed using `config`'s periods.
///
/// Order and length are preserved. Fails only on an empty input; a history
/// shorter than a window simply leaves that indicator undefined.
pub fn compute_indicators_with(
    bars: &[PriceBar],
    config: &IndicatorConfig,
) -> Result<Vec<EnrichedBar>> {
    if bars.is_empty() {
        return Err(SetupscanError::InsufficientData {
            bars: 0,
            minimum: 1,
        });
    }

    let sma20 = calculate_sma(bars, config.sma_short);
    let sma50 = calculate_sma(bars, config.sma_medium);
    let sma200 = calculate_sma(bars, config.sma_long);
    let rsi = calculate_rsi(bars, config.rsi_period);
    let atr = calculate_atr(bars, config.atr_period);
    let bands = calculate_bollinger(bars, config.bb_period, config.bb_stddev_mult_x100);
    let volume_sma = calculate_volume_sma(bars, config.volume_sma_period);
    let macd = calculate_macd(bars, config.macd_fast, config.macd_slow, config.macd_signal);

    if bars.len() < config.longest_window() {
        tracing::debug!(
            bars = bars.len(),
            needed = config.longest_window(),
            "history shorter than the longest indicator window"
        );
    }

    let enriched = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let atr14 = atr.values[i];
            let atr_pct = match atr14 {
                Some(a) if bar.close != 0.0 => Some(a / bar.close * 100.0),
                _ => None,
            };
            EnrichedBar {
                bar: bar.clone(),
                indicators: IndicatorSet {
                    sma20: sma20.values[i],
                    sma50: sma50.values[i],
                    sma200: sma200.values[i],
                    rsi14: rsi.values[i],
                    atr14,
                    atr_pct,
                    bollinger: bands[i],
                    volume_sma20: volume_sma.values[i],
                    macd: macd[i],
                },
            }
        })
        .collect();

    Ok(enriched)
}

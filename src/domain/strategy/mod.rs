//! Strategy detectors.
//!
//! The rule set is closed: six detectors, one [`StrategyKind`] variant each,
//! dispatched by `match`. Every detector evaluates the most recent bar of an
//! enriched series (plus a short look-back) and returns a fresh
//! [`StrategyResult`]. None of them keep state between calls.

pub mod breakout;
pub mod golden_cross;
pub mod macd_crossover;
pub mod mean_reversion;
pub mod trend_pullback;
pub mod volume_breakout;

use crate::domain::error::SetupscanError;
use crate::domain::indicator::EnrichedBar;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StrategyKind {
    TrendPullback,
    Breakout,
    MeanReversion,
    MacdCrossover,
    GoldenCross,
    VolumeBreakout,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::TrendPullback,
        StrategyKind::Breakout,
        StrategyKind::MeanReversion,
        StrategyKind::MacdCrossover,
        StrategyKind::GoldenCross,
        StrategyKind::VolumeBreakout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::TrendPullback => "Trend Pullback",
            StrategyKind::Breakout => "Breakout",
            StrategyKind::MeanReversion => "Mean Reversion",
            StrategyKind::MacdCrossover => "MACD Crossover",
            StrategyKind::GoldenCross => "Golden Cross",
            StrategyKind::VolumeBreakout => "Volume Breakout",
        }
    }

    /// Tie-break rank: lower wins. Rarer, more reliable signals rank first.
    pub fn priority(self) -> u8 {
        match self {
            StrategyKind::GoldenCross => 0,
            StrategyKind::Breakout => 1,
            StrategyKind::VolumeBreakout => 2,
            StrategyKind::MacdCrossover => 3,
            StrategyKind::TrendPullback => 4,
            StrategyKind::MeanReversion => 5,
        }
    }

    pub fn evaluate(self, series: &[EnrichedBar], config: &StrategyConfig) -> StrategyResult {
        let result = match self {
            StrategyKind::TrendPullback => trend_pullback::evaluate(series, config),
            StrategyKind::Breakout => breakout::evaluate(series, config),
            StrategyKind::MeanReversion => mean_reversion::evaluate(series, config),
            StrategyKind::MacdCrossover => macd_crossover::evaluate(series, config),
            StrategyKind::GoldenCross => golden_cross::evaluate(series, config),
            StrategyKind::VolumeBreakout => volume_breakout::evaluate(series, config),
        };
        tracing::debug!(
            strategy = self.name(),
            triggered = result.triggered,
            score = result.score,
            "strategy evaluated"
        );
        result
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = SetupscanError;

    /// Accepts the display name or its snake/kebab form, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        StrategyKind::ALL
            .into_iter()
            .find(|kind| {
                kind.name()
                    .chars()
                    .filter(|c| *c != ' ')
                    .collect::<String>()
                    .to_lowercase()
                    == normalized
            })
            .ok_or_else(|| {
                SetupscanError::invalid("strategy", format!("unknown strategy name '{}'", s.trim()))
            })
    }
}

/// Advisory entry/stop/target levels, handed from a detector to whoever acts
/// on the signal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SuggestedLevels {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
}

impl SuggestedLevels {
    /// entry = close, stop = close - k×ATR, target = close + m×ATR.
    pub fn from_atr(close: f64, atr: f64, stop_mult: f64, target_mult: f64) -> Self {
        SuggestedLevels {
            entry: close,
            stop: close - stop_mult * atr,
            target: close + target_mult * atr,
        }
    }

    /// Reward over risk; 0 when the stop sits at the entry.
    pub fn risk_reward(&self) -> f64 {
        let risk = (self.entry - self.stop).abs();
        if risk == 0.0 {
            return 0.0;
        }
        (self.target - self.entry).abs() / risk
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrategyResult {
    pub strategy: StrategyKind,
    pub triggered: bool,
    /// 0..=100
    pub score: u32,
    /// Rule evaluations that held, in evaluation order.
    pub reasons: Vec<String>,
    /// Rule evaluations that failed, in evaluation order.
    pub warnings: Vec<String>,
    pub levels: Option<SuggestedLevels>,
}

impl StrategyResult {
    pub fn new(strategy: StrategyKind) -> Self {
        StrategyResult {
            strategy,
            triggered: false,
            score: 0,
            reasons: Vec::new(),
            warnings: Vec::new(),
            levels: None,
        }
    }

    /// The "no signal possible" outcome for a missing indicator.
    pub fn insufficient(strategy: StrategyKind, missing: &str) -> Self {
        let mut result = StrategyResult::new(strategy);
        result
            .reasons
            .push(format!("insufficient history: {} undefined", missing));
        result
    }

    pub fn risk_reward(&self) -> Option<f64> {
        self.levels.map(|l| l.risk_reward())
    }
}

/// Fixed strategy thresholds. The defaults are the production constants;
/// tests construct variants explicitly instead of touching global state.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub pullback_max_distance_pct: f64,
    /// Bars, including the current one, in which the RSI cross may occur.
    pub pullback_rsi_cross_window: usize,
    pub pullback_rsi_level: f64,
    pub breakout_lookback: usize,
    pub breakout_volume_multiplier: f64,
    pub breakout_min_atr_pct: f64,
    pub mean_reversion_lookback: usize,
    pub mean_reversion_rsi_oversold: f64,
    pub macd_rsi_min: f64,
    pub macd_rsi_max: f64,
    pub macd_atr_pct_min: f64,
    pub macd_atr_pct_max: f64,
    pub golden_cross_volume_ratio: f64,
    pub golden_cross_rsi_min: f64,
    pub volume_breakout_lookback: usize,
    pub volume_breakout_volume_multiplier: f64,
    pub volume_breakout_rsi_min: f64,
    pub stop_atr_multiplier: f64,
    pub target_atr_multiplier: f64,
    pub breakout_stop_atr_multiplier: f64,
    pub breakout_target_atr_multiplier: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            pullback_max_distance_pct: 2.0,
            pullback_rsi_cross_window: 3,
            pullback_rsi_level: 50.0,
            breakout_lookback: 55,
            breakout_volume_multiplier: 1.5,
            breakout_min_atr_pct: 1.0,
            mean_reversion_lookback: 2,
            mean_reversion_rsi_oversold: 30.0,
            macd_rsi_min: 50.0,
            macd_rsi_max: 70.0,
            macd_atr_pct_min: 1.0,
            macd_atr_pct_max: 5.0,
            golden_cross_volume_ratio: 1.0,
            golden_cross_rsi_min: 50.0,
            volume_breakout_lookback: 20,
            volume_breakout_volume_multiplier: 2.0,
            volume_breakout_rsi_min: 60.0,
            stop_atr_multiplier: 2.0,
            target_atr_multiplier: 2.0,
            breakout_stop_atr_multiplier: 2.5,
            breakout_target_atr_multiplier: 3.0,
        }
    }
}

/// Run all six detectors against the latest bar of `series`, in
/// [`StrategyKind::ALL`] order.
pub fn evaluate_all_strategies(
    series: &[EnrichedBar],
    config: &StrategyConfig,
) -> Vec<StrategyResult> {
    StrategyKind::ALL
        .iter()
        .map(|kind| kind.evaluate(series, config))
        .collect()
}

/// Highest high of the `lookback` bars before the last one.
pub(crate) fn prior_high(series: &[EnrichedBar], lookback: usize) -> Option<f64> {
    if lookback == 0 || series.len() < lookback + 1 {
        return None;
    }
    let end = series.len() - 1;
    series[end - lookback..end]
        .iter()
        .map(|e| e.bar.high)
        .reduce(f64::max)
}

/// The last bar and the one before it, when both exist.
pub(crate) fn last_two(series: &[EnrichedBar]) -> Option<(&EnrichedBar, &EnrichedBar)> {
    match series {
        [.., prev, latest] => Some((prev, latest)),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn from_str_accepts_snake_and_kebab_case() {
        assert_eq!(
            "golden_cross".parse::<StrategyKind>().unwrap(),
            StrategyKind::GoldenCross
        );
        assert_eq!(
            "macd-crossover".parse::<StrategyKind>().unwrap(),
            StrategyKind::MacdCrossover
        );
        assert_eq!(
            " VOLUME BREAKOUT ".parse::<StrategyKind>().unwrap(),
            StrategyKind::VolumeBreakout
        );
    }

    #[test]
    fn from_str_rejects_unknown() {
        let err = "death cross".parse::<StrategyKind>().unwrap_err();
        assert!(matches!(
            err,
            SetupscanError::InvalidConfiguration { field, .. } if field == "strategy"
        ));
    }

    #[test]
    fn priority_order() {
        let mut kinds = StrategyKind::ALL.to_vec();
        kinds.sort_by_key(|k| k.priority());
        assert_eq!(
            kinds,
            vec![
                StrategyKind::GoldenCross,
                StrategyKind::Breakout,
                StrategyKind::VolumeBreakout,
                StrategyKind::MacdCrossover,
                StrategyKind::TrendPullback,
                StrategyKind::MeanReversion,
            ]
        );
    }

    #[test]
    fn levels_from_atr() {
        let levels = SuggestedLevels::from_atr(100.0, 2.0, 2.5, 3.0);
        assert!((levels.entry - 100.0).abs() < f64::EPSILON);
        assert!((levels.stop - 95.0).abs() < f64::EPSILON);
        assert!((levels.target - 106.0).abs() < f64::EPSILON);
        assert!((levels.risk_reward() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn risk_reward_zero_risk() {
        let levels = SuggestedLevels::from_atr(100.0, 0.0, 2.0, 2.0);
        assert_eq!(levels.risk_reward(), 0.0);
    }

    #[test]
    fn insufficient_result_is_quiet() {
        let result = StrategyResult::insufficient(StrategyKind::Breakout, "atr14");
        assert!(!result.triggered);
        assert_eq!(result.score, 0);
        assert_eq!(result.reasons, vec!["insufficient history: atr14 undefined"]);
        assert!(result.levels.is_none());
    }

    #[test]
    fn evaluate_all_on_empty_series() {
        let results = evaluate_all_strategies(&[], &StrategyConfig::default());
        assert_eq!(results.len(), 6);
        for (result, kind) in results.iter().zip(StrategyKind::ALL) {
            assert_eq!(result.strategy, kind);
            assert!(!result.triggered);
            assert_eq!(result.score, 0);
        }
    }

    #[test]
    fn evaluate_all_on_undefined_indicators() {
        let series = flat(30, 100.0);
        for result in evaluate_all_strategies(&series, &StrategyConfig::default()) {
            assert!(!result.triggered);
            assert_eq!(result.score, 0);
            assert!(result.reasons[0].starts_with("insufficient history"));
        }
    }

    #[test]
    fn prior_high_excludes_latest_bar() {
        let mut series = flat(5, 10.0);
        series[1].bar.high = 15.0;
        series[4].bar.high = 99.0;
        assert_eq!(prior_high(&series, 4), Some(15.0));
        assert_eq!(prior_high(&series, 2), Some(10.0));
        assert_eq!(prior_high(&series, 5), None);
    }
}

//! Composite scoring of one instrument's strategy results.

use crate::domain::indicator::EnrichedBar;
use crate::domain::strategy::{StrategyKind, StrategyResult, SuggestedLevels};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ScorerConfig {
    /// Added when exactly two strategies trigger.
    pub two_signal_bonus: u32,
    /// Added when three or more strategies trigger.
    pub multi_signal_bonus: u32,
    pub max_score: u32,
    /// Scan results below this overall score are dropped.
    pub min_score: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig {
            two_signal_bonus: 10,
            multi_signal_bonus: 15,
            max_score: 100,
            min_score: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SignalStrength {
    None,
    Watch,
    Notable,
    Strong,
}

impl SignalStrength {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => SignalStrength::Strong,
            60..=79 => SignalStrength::Notable,
            40..=59 => SignalStrength::Watch,
            _ => SignalStrength::None,
        }
    }
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalStrength::Strong => "strong signal",
            SignalStrength::Notable => "notable signal",
            SignalStrength::Watch => "watch",
            SignalStrength::None => "no signal",
        };
        f.write_str(label)
    }
}

/// Conditions on the latest bar that make any setup riskier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RiskFlag {
    VeryHighVolatility,
    HighVolatility,
    BelowSma200,
    ExtendedAboveSma200,
    Overbought,
    DeeplyOversold,
    ThinVolume,
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskFlag::VeryHighVolatility => "very high volatility",
            RiskFlag::HighVolatility => "high volatility",
            RiskFlag::BelowSma200 => "close below SMA200 (downtrend)",
            RiskFlag::ExtendedAboveSma200 => "close far above SMA200 (extended)",
            RiskFlag::Overbought => "RSI overbought",
            RiskFlag::DeeplyOversold => "RSI deeply oversold",
            RiskFlag::ThinVolume => "very thin volume",
        };
        f.write_str(label)
    }
}

/// Risk flags for `latest`. Undefined indicators raise no flag.
pub fn risk_flags(latest: &EnrichedBar) -> Vec<RiskFlag> {
    let ind = &latest.indicators;
    let mut flags = Vec::new();

    match ind.atr_pct {
        Some(p) if p > 5.0 => flags.push(RiskFlag::VeryHighVolatility),
        Some(p) if p > 3.0 => flags.push(RiskFlag::HighVolatility),
        _ => {}
    }

    match latest.distance_pct(ind.sma200) {
        Some(d) if d < 0.0 => flags.push(RiskFlag::BelowSma200),
        Some(d) if d > 20.0 => flags.push(RiskFlag::ExtendedAboveSma200),
        _ => {}
    }

    match ind.rsi14 {
        Some(r) if r > 80.0 => flags.push(RiskFlag::Overbought),
        Some(r) if r < 20.0 => flags.push(RiskFlag::DeeplyOversold),
        _ => {}
    }

    if matches!(latest.volume_ratio(), Some(v) if v < 0.5) {
        flags.push(RiskFlag::ThinVolume);
    }

    flags
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CompositeResult {
    pub instrument_id: String,
    pub overall_score: u32,
    pub dominant_strategy: Option<StrategyKind>,
    pub triggered_count: usize,
    pub has_signal: bool,
    /// Levels of the dominant strategy, present only when it triggered.
    pub levels: Option<SuggestedLevels>,
    pub risk_flags: Vec<RiskFlag>,
    pub reasons: Vec<String>,
    pub results: Vec<StrategyResult>,
}

impl CompositeResult {
    pub fn strength(&self) -> SignalStrength {
        SignalStrength::from_score(self.overall_score)
    }

    pub fn result_for(&self, kind: StrategyKind) -> Option<&StrategyResult> {
        self.results.iter().find(|r| r.strategy == kind)
    }
}

/// Aggregate per-strategy results into one composite.
///
/// overall = max score, plus a confluence bonus when several strategies
/// trigger, capped at `max_score`. The dominant strategy is the highest
/// score, ties broken by [`StrategyKind::priority`].
pub fn score(
    instrument_id: &str,
    results: Vec<StrategyResult>,
    config: &ScorerConfig,
) -> CompositeResult {
    let triggered_count = results.iter().filter(|r| r.triggered).count();

    let dominant = results
        .iter()
        .filter(|r| r.score > 0)
        .min_by_key(|r| (std::cmp::Reverse(r.score), r.strategy.priority()));

    let max_score = dominant.map(|r| r.score).unwrap_or(0);
    let bonus = match triggered_count {
        0 | 1 => 0,
        2 => config.two_signal_bonus,
        _ => config.multi_signal_bonus,
    };
    let overall_score = (max_score + bonus).min(config.max_score);

    let mut reasons = Vec::new();
    if bonus > 0 {
        reasons.push(format!("confluence: {} strategies triggered", triggered_count));
    }
    if let Some(d) = dominant {
        reasons.extend(d.reasons.iter().cloned());
    }

    let dominant_strategy = dominant.map(|r| r.strategy);
    let levels = dominant.filter(|r| r.triggered).and_then(|r| r.levels);

    tracing::debug!(
        instrument = instrument_id,
        overall_score,
        triggered_count,
        dominant = dominant_strategy.map(StrategyKind::name),
        "composite scored"
    );

    CompositeResult {
        instrument_id: instrument_id.to_string(),
        overall_score,
        dominant_strategy,
        triggered_count,
        has_signal: triggered_count > 0,
        levels,
        risk_flags: Vec::new(),
        reasons,
        results,
    }
}

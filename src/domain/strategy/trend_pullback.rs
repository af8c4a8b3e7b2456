//! Trend Pullback: a pullback to the SMA50 inside an established uptrend.
//!
//! Triggers when all hold on the latest bar:
//! - close > SMA200
//! - |close - SMA50| / SMA50 < 2%
//! - RSI crossed above 50 within the last 3 bars
//! - volume > Volume SMA20

use crate::domain::indicator::EnrichedBar;
use crate::domain::strategy::{StrategyConfig, StrategyKind, StrategyResult, SuggestedLevels};

const KIND: StrategyKind = StrategyKind::TrendPullback;

pub fn evaluate(series: &[EnrichedBar], config: &StrategyConfig) -> StrategyResult {
    let Some(latest) = series.last() else {
        return StrategyResult::insufficient(KIND, "latest bar");
    };
    let ind = &latest.indicators;
    let Some(sma50) = ind.sma50 else {
        return StrategyResult::insufficient(KIND, "sma50");
    };
    let Some(sma200) = ind.sma200 else {
        return StrategyResult::insufficient(KIND, "sma200");
    };
    let Some(rsi) = ind.rsi14 else {
        return StrategyResult::insufficient(KIND, "rsi14");
    };
    let Some(atr) = ind.atr14 else {
        return StrategyResult::insufficient(KIND, "atr14");
    };
    let Some(volume_ratio) = latest.volume_ratio() else {
        return StrategyResult::insufficient(KIND, "volume_sma20");
    };

    let close = latest.bar.close;
    let mut result = StrategyResult::new(KIND);
    let mut score = 0;

    let uptrend = close > sma200;
    if uptrend {
        result.reasons.push("close above SMA200 (uptrend)".to_string());
        score += 25;
    } else {
        result
            .warnings
            .push("close below SMA200, no established uptrend".to_string());
    }

    let max_distance = config.pullback_max_distance_pct;
    let distance = latest.distance_pct(Some(sma50)).map(f64::abs).unwrap_or(f64::INFINITY);
    let near_sma50 = distance < max_distance;
    if near_sma50 {
        // 25 at the average itself, falling towards 10 at the distance limit.
        let proximity = (25.0 - distance / max_distance * 15.0).max(10.0);
        result
            .reasons
            .push(format!("close near SMA50 ({:.1}% away)", distance));
        score += proximity as u32;
    } else {
        result
            .warnings
            .push(format!("close too far from SMA50 ({:.1}% away)", distance));
    }

    let level = config.pullback_rsi_level;
    let crossed = rsi > level && rsi_was_at_or_below(series, level, config.pullback_rsi_cross_window);
    if crossed {
        result
            .reasons
            .push(format!("RSI crossed above {:.0} ({:.1})", level, rsi));
        score += 25;
    } else if rsi > level {
        result
            .reasons
            .push(format!("RSI above {:.0} without a recent cross ({:.1})", level, rsi));
        score += 15;
    } else {
        result
            .warnings
            .push(format!("RSI at or below {:.0} ({:.1}), weak momentum", level, rsi));
    }

    let volume_confirmed = volume_ratio > 1.0;
    if volume_ratio >= 1.5 {
        result
            .reasons
            .push(format!("strong volume ({:.1}x average)", volume_ratio));
        score += 25;
    } else if volume_confirmed {
        result
            .reasons
            .push(format!("volume above average ({:.1}x)", volume_ratio));
        score += 15;
    } else {
        result
            .warnings
            .push(format!("volume below average ({:.1}x)", volume_ratio));
    }

    result.triggered = uptrend && near_sma50 && crossed && volume_confirmed;
    result.score = score.min(100);
    result.levels = Some(SuggestedLevels::from_atr(
        close,
        atr,
        config.stop_atr_multiplier,
        config.target_atr_multiplier,
    ));
    result
}

/// True when any of the `window - 1` bars before the latest had RSI <= level.
fn rsi_was_at_or_below(series: &[EnrichedBar], level: f64, window: usize) -> bool {
    let end = series.len().saturating_sub(1);
    let start = end.saturating_sub(window.saturating_sub(1));
    series[start..end]
        .iter()
        .filter_map(|e| e.indicators.rsi14)
        .any(|r| r <= level)
}

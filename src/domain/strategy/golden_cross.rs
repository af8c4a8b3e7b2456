//! Golden Cross: SMA50 crosses above SMA200.
//!
//! Triggers when all hold on the latest bar:
//! - SMA50[t-1] <= SMA200[t-1] and SMA50[t] > SMA200[t]
//! - close > SMA50 and close > SMA200
//! - volume >= Volume SMA20
//! - RSI >= 50
//!
//! Outside a fresh cross the score still reflects how long SMA50 has stayed
//! above SMA200, so an aging cross ranks below a new one.

use crate::domain::indicator::EnrichedBar;
use crate::domain::strategy::{StrategyConfig, StrategyKind, StrategyResult, SuggestedLevels};

const KIND: StrategyKind = StrategyKind::GoldenCross;

/// Bars scanned when measuring the age of an established cross.
const AGE_SCAN: usize = 31;

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
    let (Some(atr), Some(atr_pct)) = (ind.atr14, ind.atr_pct) else {
        return StrategyResult::insufficient(KIND, "atr14");
    };
    let Some(volume_ratio) = latest.volume_ratio() else {
        return StrategyResult::insufficient(KIND, "volume_sma20");
    };

    let close = latest.bar.close;
    let mut result = StrategyResult::new(KIND);
    let mut score = 0;

    let was_below = series
        .len()
        .checked_sub(2)
        .map(|i| &series[i].indicators)
        .is_some_and(|p| matches!((p.sma50, p.sma200), (Some(a), Some(b)) if a <= b));
    let above = sma50 > sma200;
    let crossed = above && was_below;
    if crossed {
        result
            .reasons
            .push("SMA50 crossed above SMA200".to_string());
        score += 40;
    } else if above {
        let age = bars_above(series);
        if age <= 10 {
            result
                .reasons
                .push(format!("recent golden cross ({} bars)", age));
            score += 30;
        } else if age <= 30 {
            result
                .reasons
                .push(format!("golden cross in progress ({} bars)", age));
            score += 20;
        } else {
            result
                .reasons
                .push("old golden cross (over 30 bars)".to_string());
            score += 10;
        }
    } else {
        result
            .warnings
            .push("SMA50 below SMA200 (death cross)".to_string());
    }

    let above_sma50 = close > sma50;
    let above_sma200 = close > sma200;
    if above_sma50 && above_sma200 {
        let d50 = (close - sma50) / sma50 * 100.0;
        let d200 = (close - sma200) / sma200 * 100.0;
        if d50 > 5.0 && d200 > 10.0 {
            result
                .reasons
                .push("close well above both averages".to_string());
            score += 25;
        } else {
            result.reasons.push("close above both averages".to_string());
            score += 15;
        }
    } else if above_sma50 {
        result
            .warnings
            .push("close above SMA50 but below SMA200".to_string());
        score += 10;
    } else {
        result.warnings.push("close below SMA50".to_string());
    }

    if (50.0..=70.0).contains(&rsi) {
        result.reasons.push(format!("RSI bullish ({:.0})", rsi));
        score += 15;
    } else if rsi > 70.0 {
        result.warnings.push(format!("RSI overbought ({:.0})", rsi));
        score += 8;
    } else if rsi > 40.0 {
        result.reasons.push(format!("RSI neutral ({:.0})", rsi));
        score += 5;
    }

    if volume_ratio > 1.2 {
        result
            .reasons
            .push(format!("strong volume ({:.1}x)", volume_ratio));
        score += 10;
    } else if volume_ratio > 0.8 {
        score += 5;
    }

    if (1.0..=4.0).contains(&atr_pct) {
        result
            .reasons
            .push(format!("healthy volatility (ATR {:.1}%)", atr_pct));
        score += 10;
    } else if atr_pct < 1.0 {
        score += 5;
    }

    result.triggered = crossed
        && above_sma50
        && above_sma200
        && volume_ratio >= config.golden_cross_volume_ratio
        && rsi >= config.golden_cross_rsi_min;
    result.score = score.min(100);
    result.levels = Some(SuggestedLevels::from_atr(
        close,
        atr,
        config.stop_atr_multiplier,
        config.target_atr_multiplier,
    ));
    result
}

/// Consecutive bars, ending at the latest, with SMA50 > SMA200. Stops
/// counting after `AGE_SCAN` bars.
fn bars_above(series: &[EnrichedBar]) -> usize {
    series
        .iter()
        .rev()
        .take(AGE_SCAN)
        .take_while(|e| matches!((e.indicators.sma50, e.indicators.sma200), (Some(a), Some(b)) if a > b))
        .count()
}

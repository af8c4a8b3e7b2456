//! Volume Breakout: a 20-bar high taken out on exceptional volume.
//!
//! Triggers when all hold on the latest bar:
//! - close > highest high of the 20 prior bars
//! - volume > 2 × Volume SMA20
//! - RSI > 60
//! - SMA50 > SMA200

use crate::domain::indicator::EnrichedBar;
use crate::domain::strategy::{
    prior_high, StrategyConfig, StrategyKind, StrategyResult, SuggestedLevels,
};

const KIND: StrategyKind = StrategyKind::VolumeBreakout;

pub fn evaluate(series: &[EnrichedBar], config: &StrategyConfig) -> StrategyResult {
    let Some(latest) = series.last() else {
        return StrategyResult::insufficient(KIND, "latest bar");
    };
    let lookback = config.volume_breakout_lookback;
    let Some(prior) = prior_high(series, lookback) else {
        return StrategyResult::insufficient(KIND, &format!("{}-bar high", lookback));
    };
    let ind = &latest.indicators;
    let Some(volume_ratio) = latest.volume_ratio() else {
        return StrategyResult::insufficient(KIND, "volume_sma20");
    };
    let Some(rsi) = ind.rsi14 else {
        return StrategyResult::insufficient(KIND, "rsi14");
    };
    let (Some(sma50), Some(sma200)) = (ind.sma50, ind.sma200) else {
        return StrategyResult::insufficient(KIND, "sma200");
    };
    let (Some(atr), Some(atr_pct)) = (ind.atr14, ind.atr_pct) else {
        return StrategyResult::insufficient(KIND, "atr14");
    };

    let close = latest.bar.close;
    let mut result = StrategyResult::new(KIND);
    let mut score = 0;

    let broke_out = close > prior;
    if broke_out {
        let pct = if prior != 0.0 { (close - prior) / prior * 100.0 } else { 0.0 };
        let (points, label) = if pct > 3.0 {
            (30, "strong")
        } else if pct > 1.0 {
            (25, "clean")
        } else {
            (15, "marginal")
        };
        result.reasons.push(format!(
            "{} breakout above the {}-bar high (+{:.1}%)",
            label, lookback, pct
        ));
        score += points;
    } else {
        result
            .warnings
            .push(format!("no close above the {}-bar high", lookback));
    }

    let surge = volume_ratio > config.volume_breakout_volume_multiplier;
    if volume_ratio > 3.0 {
        result
            .reasons
            .push(format!("volume explosion ({:.1}x)", volume_ratio));
        score += 35;
    } else if surge {
        result
            .reasons
            .push(format!("very strong volume ({:.1}x)", volume_ratio));
        score += 30;
    } else if volume_ratio > 1.5 {
        result
            .reasons
            .push(format!("high volume ({:.1}x)", volume_ratio));
        score += 20;
    } else if volume_ratio > 1.0 {
        result
            .warnings
            .push(format!("volume light for a breakout ({:.1}x)", volume_ratio));
        score += 10;
    } else {
        result
            .warnings
            .push(format!("insufficient volume ({:.1}x)", volume_ratio));
    }

    let momentum = rsi > config.volume_breakout_rsi_min;
    if rsi > 70.0 {
        result
            .reasons
            .push(format!("very strong momentum (RSI {:.0})", rsi));
        score += 15;
    } else if momentum {
        result.reasons.push(format!("good momentum (RSI {:.0})", rsi));
        score += 12;
    } else if rsi > 50.0 {
        result
            .reasons
            .push(format!("positive momentum (RSI {:.0})", rsi));
        score += 8;
    } else {
        result
            .warnings
            .push(format!("weak momentum (RSI {:.0})", rsi));
    }

    let uptrend = sma50 > sma200;
    if uptrend {
        result
            .reasons
            .push("bullish context (SMA50 above SMA200)".to_string());
        score += 10;
    } else {
        result
            .warnings
            .push("bearish context (SMA50 below SMA200)".to_string());
    }

    if (2.0..6.0).contains(&atr_pct) {
        result
            .reasons
            .push(format!("suitable volatility (ATR {:.1}%)", atr_pct));
        score += 10;
    } else if atr_pct >= 6.0 {
        result
            .warnings
            .push(format!("elevated volatility (ATR {:.1}%)", atr_pct));
        score += 5;
    }

    result.triggered = broke_out && surge && momentum && uptrend;
    result.score = score.min(100);
    result.levels = Some(SuggestedLevels::from_atr(
        close,
        atr,
        config.stop_atr_multiplier,
        config.target_atr_multiplier,
    ));
    result
}

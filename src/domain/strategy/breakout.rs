//! Breakout: close clears the 55-bar high on a volume surge.
//!
//! Triggers when all hold on the latest bar:
//! - close > highest high of the 55 prior bars (today excluded)
//! - volume > 1.5 × Volume SMA20
//! - ATR% > 1%
//!
//! Uses wider levels than the other detectors: stop 2.5 ATR, target 3 ATR.

use crate::domain::indicator::EnrichedBar;
use crate::domain::strategy::{
    prior_high, StrategyConfig, StrategyKind, StrategyResult, SuggestedLevels,
};

const KIND: StrategyKind = StrategyKind::Breakout;

pub fn evaluate(series: &[EnrichedBar], config: &StrategyConfig) -> StrategyResult {
    let Some(latest) = series.last() else {
        return StrategyResult::insufficient(KIND, "latest bar");
    };
    let lookback = config.breakout_lookback;
    let Some(prior) = prior_high(series, lookback) else {
        return StrategyResult::insufficient(KIND, &format!("{}-bar high", lookback));
    };
    let ind = &latest.indicators;
    let (Some(atr), Some(atr_pct)) = (ind.atr14, ind.atr_pct) else {
        return StrategyResult::insufficient(KIND, "atr14");
    };
    let Some(volume_ratio) = latest.volume_ratio() else {
        return StrategyResult::insufficient(KIND, "volume_sma20");
    };

    let close = latest.bar.close;
    let mut result = StrategyResult::new(KIND);
    let mut score = 0;

    let broke_out = close > prior;
    if broke_out {
        let pct = if prior != 0.0 { (close - prior) / prior * 100.0 } else { 0.0 };
        result
            .reasons
            .push(format!("close cleared the {}-bar high (+{:.1}%)", lookback, pct));
        score += if pct >= 3.0 {
            35
        } else if pct >= 1.0 {
            30
        } else {
            25
        };
    } else {
        result.warnings.push(format!(
            "no breakout (close {:.2} vs {}-bar high {:.2})",
            close, lookback, prior
        ));
    }

    let surge = volume_ratio > config.breakout_volume_multiplier;
    if volume_ratio >= 2.0 {
        result
            .reasons
            .push(format!("very high volume ({:.1}x average)", volume_ratio));
        score += 35;
    } else if surge {
        result
            .reasons
            .push(format!("high volume ({:.1}x average)", volume_ratio));
        score += 25;
    } else if volume_ratio >= 1.0 {
        result.warnings.push(format!(
            "average volume ({:.1}x), weak confirmation",
            volume_ratio
        ));
        score += 10;
    } else {
        result
            .warnings
            .push(format!("low volume ({:.1}x), suspect breakout", volume_ratio));
    }

    let volatile = atr_pct > config.breakout_min_atr_pct;
    if atr_pct >= 2.0 {
        result
            .reasons
            .push(format!("healthy volatility (ATR {:.1}%)", atr_pct));
        score += 20;
    } else if volatile {
        result
            .reasons
            .push(format!("sufficient volatility (ATR {:.1}%)", atr_pct));
        score += 15;
    } else {
        result
            .warnings
            .push(format!("too flat to trade (ATR {:.1}%)", atr_pct));
    }

    match ind.sma200 {
        Some(sma200) if close > sma200 => {
            result
                .reasons
                .push("breakout with the primary trend (close above SMA200)".to_string());
            score += 10;
        }
        Some(_) => result
            .warnings
            .push("breakout against the trend (close below SMA200)".to_string()),
        None => {}
    }

    result.triggered = broke_out && surge && volatile;
    result.score = score.min(100);
    result.levels = Some(SuggestedLevels::from_atr(
        close,
        atr,
        config.breakout_stop_atr_multiplier,
        config.breakout_target_atr_multiplier,
    ));
    result
}

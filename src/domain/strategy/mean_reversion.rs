//! Mean Reversion: an oversold bounce off the lower Bollinger band.
//!
//! Triggers when all hold on the latest bar:
//! - close <= lower band now, or some look-back bar closed <= its own lower band
//! - RSI < 30 now or somewhere in the look-back
//! - close > lower band and close > previous close

use crate::domain::indicator::EnrichedBar;
use crate::domain::strategy::{
    last_two, StrategyConfig, StrategyKind, StrategyResult, SuggestedLevels,
};

const KIND: StrategyKind = StrategyKind::MeanReversion;

pub fn evaluate(series: &[EnrichedBar], config: &StrategyConfig) -> StrategyResult {
    let Some((prev, latest)) = last_two(series) else {
        return StrategyResult::insufficient(KIND, "previous bar");
    };
    let ind = &latest.indicators;
    let Some(bands) = ind.bollinger else {
        return StrategyResult::insufficient(KIND, "bollinger");
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

    let end = series.len() - 1;
    let lookback = &series[end.saturating_sub(config.mean_reversion_lookback)..end];
    let oversold_level = config.mean_reversion_rsi_oversold;

    let close = latest.bar.close;
    let mut result = StrategyResult::new(KIND);
    let mut score = 0;

    let below_now = close <= bands.lower;
    let was_below = lookback.iter().any(|e| match e.indicators.bollinger {
        Some(b) => e.bar.close <= b.lower,
        None => false,
    });
    if below_now {
        result.reasons.push(format!(
            "close at or below lower Bollinger band ({:.2} <= {:.2})",
            close, bands.lower
        ));
        score += 30;
    } else if was_below {
        result
            .reasons
            .push("close was at or below lower band recently".to_string());
        score += 25;
    } else {
        result
            .warnings
            .push("price not stretched below the bands".to_string());
    }

    let prev_rsi = prev.indicators.rsi14;
    let oversold_recently = lookback
        .iter()
        .filter_map(|e| e.indicators.rsi14)
        .any(|r| r < oversold_level);
    if rsi < 25.0 {
        result
            .reasons
            .push(format!("RSI deeply oversold ({:.1})", rsi));
        score += 30;
    } else if rsi < oversold_level {
        result.reasons.push(format!("RSI oversold ({:.1})", rsi));
        score += 25;
    } else if matches!(prev_rsi, Some(p) if p < oversold_level && rsi > p) {
        result
            .reasons
            .push(format!("RSI rebounding out of oversold ({:.1})", rsi));
        score += 20;
    } else if rsi < 40.0 {
        result
            .warnings
            .push(format!("RSI low but not oversold ({:.1})", rsi));
        score += 10;
    } else {
        result
            .warnings
            .push(format!("RSI not oversold ({:.1})", rsi));
    }

    let above_band = close > bands.lower;
    let up_day = close > prev.bar.close;
    if was_below && above_band {
        result
            .reasons
            .push("close back above the lower band".to_string());
        score += 25;
    } else if up_day {
        result.reasons.push("up day".to_string());
        score += 15;
    } else {
        result.warnings.push("no reversal yet".to_string());
    }

    if volume_ratio >= 1.5 {
        result
            .reasons
            .push(format!("high volume on the bounce ({:.1}x)", volume_ratio));
        score += 15;
    } else if volume_ratio >= 1.0 {
        score += 10;
    } else {
        score += 5;
    }

    match ind.sma200 {
        Some(sma200) if close > sma200 => {
            result
                .reasons
                .push("bounce inside an uptrend (close above SMA200)".to_string());
            score += 10;
        }
        _ => result
            .warnings
            .push("bounce against the trend".to_string()),
    }

    let touched = below_now || was_below;
    let oversold = rsi < oversold_level || oversold_recently;
    let reversal = above_band && up_day;

    result.triggered = touched && oversold && reversal;
    result.score = score.min(100);
    result.levels = Some(SuggestedLevels::from_atr(
        close,
        atr,
        config.stop_atr_multiplier,
        config.target_atr_multiplier,
    ));
    result
}

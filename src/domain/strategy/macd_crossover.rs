//! MACD Crossover: the MACD line crosses its signal line inside an uptrend.
//!
//! Triggers when all hold on the latest bar:
//! - line[t] > signal[t] and line[t-1] <= signal[t-1]
//! - close > SMA200
//! - 50 <= RSI <= 70
//! - 1% <= ATR% <= 5%

use crate::domain::indicator::EnrichedBar;
use crate::domain::strategy::{StrategyConfig, StrategyKind, StrategyResult, SuggestedLevels};

const KIND: StrategyKind = StrategyKind::MacdCrossover;

pub fn evaluate(series: &[EnrichedBar], config: &StrategyConfig) -> StrategyResult {
    let Some(latest) = series.last() else {
        return StrategyResult::insufficient(KIND, "latest bar");
    };
    let ind = &latest.indicators;
    let Some(macd) = ind.macd else {
        return StrategyResult::insufficient(KIND, "macd");
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

    // An undefined previous value cannot have been at or below the signal.
    let prev_macd = series
        .len()
        .checked_sub(2)
        .and_then(|i| series[i].indicators.macd);

    let close = latest.bar.close;
    let mut result = StrategyResult::new(KIND);
    let mut score = 0;

    let above_signal = macd.line > macd.signal;
    let crossed = above_signal && matches!(prev_macd, Some(p) if p.line <= p.signal);
    if crossed {
        result
            .reasons
            .push("MACD crossed above its signal line".to_string());
        score += 30;
    } else if above_signal {
        result
            .reasons
            .push("MACD above its signal line without a fresh cross".to_string());
        score += 15;
    } else {
        result
            .warnings
            .push("MACD below its signal line".to_string());
    }

    let uptrend = close > sma200;
    if uptrend {
        let distance = (close - sma200) / sma200 * 100.0;
        if distance > 10.0 {
            result
                .reasons
                .push(format!("close well above SMA200 (+{:.1}%)", distance));
            score += 25;
        } else {
            result
                .reasons
                .push(format!("close above SMA200 (+{:.1}%)", distance));
            score += 15;
        }
    } else {
        result
            .warnings
            .push("close below SMA200 (downtrend)".to_string());
    }

    if macd.line > 0.0 {
        result
            .reasons
            .push("MACD in positive territory".to_string());
        score += 15;
    }

    let rsi_in_band = rsi >= config.macd_rsi_min && rsi <= config.macd_rsi_max;
    if rsi_in_band {
        result
            .reasons
            .push(format!("RSI constructive ({:.0})", rsi));
        score += 15;
    } else if rsi > config.macd_rsi_max {
        result.warnings.push(format!("RSI overbought ({:.0})", rsi));
        score += 5;
    } else {
        result
            .warnings
            .push(format!("RSI below {:.0} ({:.0})", config.macd_rsi_min, rsi));
    }

    let volatility_ok = atr_pct >= config.macd_atr_pct_min && atr_pct <= config.macd_atr_pct_max;
    if volatility_ok {
        result
            .reasons
            .push(format!("normal volatility (ATR {:.1}%)", atr_pct));
        score += 15;
    } else if atr_pct < config.macd_atr_pct_min {
        result
            .warnings
            .push(format!("low volatility, limited move (ATR {:.1}%)", atr_pct));
        score += 5;
    } else {
        result
            .warnings
            .push(format!("high volatility (ATR {:.1}%)", atr_pct));
    }

    result.triggered = crossed && uptrend && rsi_in_band && volatility_ok;
    result.score = score.min(100);
    result.levels = Some(SuggestedLevels::from_atr(
        close,
        atr,
        config.stop_atr_multiplier,
        config.target_atr_multiplier,
    ));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::MacdValue;
    use crate::domain::strategy::test_support::flat;

    fn macd(line: f64, signal: f64) -> Option<MacdValue> {
        Some(MacdValue {
            line,
            signal,
            histogram: line - signal,
        })
    }

    /// MACD crosses from 0.4/0.5 to 0.6/0.5, close 5% above SMA200.
    fn setup() -> Vec<EnrichedBar> {
        let mut series = flat(3, 105.0);
        for e in series.iter_mut() {
            e.indicators.macd = macd(0.4, 0.5);
            e.indicators.sma200 = Some(100.0);
            e.indicators.rsi14 = Some(60.0);
            e.indicators.atr14 = Some(2.1);
            e.indicators.atr_pct = Some(2.0);
        }
        series.last_mut().unwrap().indicators.macd = macd(0.6, 0.5);
        series
    }

    #[test]
    fn triggers_on_fresh_cross() {
        let result = evaluate(&setup(), &StrategyConfig::default());
        assert!(result.triggered);
        // cross 30 + above SMA200 15 + positive 15 + RSI 15 + volatility 15
        assert_eq!(result.score, 90);
    }

    #[test]
    fn previous_equal_to_signal_counts_as_cross() {
        let mut series = setup();
        series[1].indicators.macd = macd(0.5, 0.5);
        assert!(evaluate(&series, &StrategyConfig::default()).triggered);
    }

    #[test]
    fn already_above_is_not_a_cross() {
        let mut series = setup();
        series[1].indicators.macd = macd(0.55, 0.5);
        let result = evaluate(&series, &StrategyConfig::default());
        assert!(!result.triggered);
        assert_eq!(result.score, 75);
    }

    #[test]
    fn rsi_band_is_inclusive() {
        let config = StrategyConfig::default();
        let mut series = setup();
        series.last_mut().unwrap().indicators.rsi14 = Some(70.0);
        assert!(evaluate(&series, &config).triggered);
        series.last_mut().unwrap().indicators.rsi14 = Some(50.0);
        assert!(evaluate(&series, &config).triggered);
        series.last_mut().unwrap().indicators.rsi14 = Some(70.5);
        let result = evaluate(&series, &config);
        assert!(!result.triggered);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn volatility_band_is_inclusive() {
        let config = StrategyConfig::default();
        let mut series = setup();
        series.last_mut().unwrap().indicators.atr_pct = Some(5.0);
        assert!(evaluate(&series, &config).triggered);
        series.last_mut().unwrap().indicators.atr_pct = Some(5.1);
        assert!(!evaluate(&series, &config).triggered);
        series.last_mut().unwrap().indicators.atr_pct = Some(0.9);
        let result = evaluate(&series, &config);
        assert!(!result.triggered);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn below_sma200_never_triggers() {
        let mut series = setup();
        series.last_mut().unwrap().indicators.sma200 = Some(110.0);
        assert!(!evaluate(&series, &StrategyConfig::default()).triggered);
    }

    #[test]
    fn undefined_previous_macd_is_not_a_cross() {
        let mut series = setup();
        series[1].indicators.macd = None;
        let result = evaluate(&series, &StrategyConfig::default());
        assert!(!result.triggered);
        assert!(result.reasons.iter().any(|r| r.contains("without a fresh cross")));
    }
}

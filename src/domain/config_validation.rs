//! Configuration validation.
//!
//! Every check runs before any computation and names the offending field.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::{Result, SetupscanError};
use crate::domain::indicator::IndicatorConfig;
use crate::domain::scorer::ScorerConfig;
use crate::domain::strategy::StrategyConfig;

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<()> {
    validate_max_holding_days(config.max_holding_days)?;
    validate_slippage(config.slippage_pct)?;
    Ok(())
}

pub fn validate_indicator_config(config: &IndicatorConfig) -> Result<()> {
    let periods = [
        ("sma_short", config.sma_short),
        ("sma_medium", config.sma_medium),
        ("sma_long", config.sma_long),
        ("rsi_period", config.rsi_period),
        ("atr_period", config.atr_period),
        ("bb_period", config.bb_period),
        ("volume_sma_period", config.volume_sma_period),
        ("macd_fast", config.macd_fast),
        ("macd_slow", config.macd_slow),
        ("macd_signal", config.macd_signal),
    ];
    for (field, period) in periods {
        if period == 0 {
            return Err(SetupscanError::invalid(field, "period must be at least 1"));
        }
    }
    if config.macd_fast >= config.macd_slow {
        return Err(SetupscanError::invalid(
            "macd_fast",
            "fast period must be shorter than the slow period",
        ));
    }
    if config.bb_stddev_mult_x100 == 0 {
        return Err(SetupscanError::invalid(
            "bb_stddev_mult",
            "band multiplier must be positive",
        ));
    }
    Ok(())
}

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<()> {
    let lookbacks = [
        ("pullback_rsi_cross_window", config.pullback_rsi_cross_window),
        ("breakout_lookback", config.breakout_lookback),
        ("mean_reversion_lookback", config.mean_reversion_lookback),
        ("volume_breakout_lookback", config.volume_breakout_lookback),
    ];
    for (field, bars) in lookbacks {
        if bars == 0 {
            return Err(SetupscanError::invalid(field, "look-back must be at least 1 bar"));
        }
    }

    let multipliers = [
        ("stop_atr_multiplier", config.stop_atr_multiplier),
        ("target_atr_multiplier", config.target_atr_multiplier),
        ("breakout_stop_atr_multiplier", config.breakout_stop_atr_multiplier),
        ("breakout_target_atr_multiplier", config.breakout_target_atr_multiplier),
    ];
    for (field, value) in multipliers {
        if value.is_nan() || value <= 0.0 {
            return Err(SetupscanError::invalid(field, "ATR multiplier must be positive"));
        }
    }

    if config.pullback_max_distance_pct <= 0.0 {
        return Err(SetupscanError::invalid(
            "pullback_max_distance_pct",
            "distance must be positive",
        ));
    }
    if config.macd_rsi_min > config.macd_rsi_max {
        return Err(SetupscanError::invalid(
            "macd_rsi_min",
            "lower RSI bound exceeds the upper bound",
        ));
    }
    if config.macd_atr_pct_min > config.macd_atr_pct_max {
        return Err(SetupscanError::invalid(
            "macd_atr_pct_min",
            "lower ATR% bound exceeds the upper bound",
        ));
    }
    Ok(())
}

pub fn validate_scorer_config(config: &ScorerConfig) -> Result<()> {
    if config.max_score == 0 || config.max_score > 100 {
        return Err(SetupscanError::invalid(
            "max_score",
            "score cap must be between 1 and 100",
        ));
    }
    if config.min_score > config.max_score {
        return Err(SetupscanError::invalid(
            "min_score",
            "minimum score exceeds the score cap",
        ));
    }
    Ok(())
}

fn validate_max_holding_days(days: u32) -> Result<()> {
    if days < 1 {
        return Err(SetupscanError::invalid(
            "max_holding_days",
            "max_holding_days must be at least 1",
        ));
    }
    Ok(())
}

fn validate_slippage(slippage_pct: f64) -> Result<()> {
    if !(0.0..100.0).contains(&slippage_pct) {
        return Err(SetupscanError::invalid(
            "slippage_pct",
            "slippage_pct must be at least 0 and below 100",
        ));
    }
    Ok(())
}

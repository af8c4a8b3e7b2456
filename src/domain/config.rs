//! Analysis configuration assembled from a [`ConfigPort`].
//!
//! INI layout (every key optional, defaults shown):
//!
//! ```ini
//! [indicators]
//! sma_short = 20
//! sma_medium = 50
//! sma_long = 200
//! rsi_period = 14
//! atr_period = 14
//! bb_period = 20
//! bb_stddev_mult = 2.0
//! volume_sma_period = 20
//! macd_fast = 12
//! macd_slow = 26
//! macd_signal = 9
//!
//! [strategies]
//! breakout_lookback = 55
//! ; ...one key per StrategyConfig field
//!
//! [scoring]
//! two_signal_bonus = 10
//! multi_signal_bonus = 15
//! max_score = 100
//! min_score = 0
//!
//! [backtest]
//! strategy = all
//! window_days = 365
//! max_holding_days = 30
//! slippage_pct = 0.1
//! ```

use crate::domain::backtest::{BacktestConfig, BacktestWindow};
use crate::domain::config_validation::{
    validate_backtest_config, validate_indicator_config, validate_scorer_config,
    validate_strategy_config,
};
use crate::domain::error::{Result, SetupscanError};
use crate::domain::indicator::IndicatorConfig;
use crate::domain::scorer::ScorerConfig;
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub indicators: IndicatorConfig,
    pub strategies: StrategyConfig,
    pub scoring: ScorerConfig,
    pub backtest: BacktestConfig,
}

impl AnalysisConfig {
    /// Read and validate every section. Missing keys keep their defaults.
    pub fn from_port(port: &dyn ConfigPort) -> Result<Self> {
        let config = AnalysisConfig {
            indicators: read_indicators(port)?,
            strategies: read_strategies(port)?,
            scoring: read_scoring(port)?,
            backtest: read_backtest(port)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_indicator_config(&self.indicators)?;
        validate_strategy_config(&self.strategies)?;
        validate_scorer_config(&self.scoring)?;
        validate_backtest_config(&self.backtest)?;
        Ok(())
    }
}

fn read_indicators(port: &dyn ConfigPort) -> Result<IndicatorConfig> {
    const S: &str = "indicators";
    let d = IndicatorConfig::default();
    let mult = port.get_double(S, "bb_stddev_mult", d.bb_stddev_mult_x100 as f64 / 100.0);
    if mult.is_nan() || mult <= 0.0 {
        return Err(SetupscanError::invalid(
            "bb_stddev_mult",
            "band multiplier must be positive",
        ));
    }
    Ok(IndicatorConfig {
        sma_short: get_count(port, S, "sma_short", d.sma_short)?,
        sma_medium: get_count(port, S, "sma_medium", d.sma_medium)?,
        sma_long: get_count(port, S, "sma_long", d.sma_long)?,
        rsi_period: get_count(port, S, "rsi_period", d.rsi_period)?,
        atr_period: get_count(port, S, "atr_period", d.atr_period)?,
        bb_period: get_count(port, S, "bb_period", d.bb_period)?,
        bb_stddev_mult_x100: (mult * 100.0).round() as u32,
        volume_sma_period: get_count(port, S, "volume_sma_period", d.volume_sma_period)?,
        macd_fast: get_count(port, S, "macd_fast", d.macd_fast)?,
        macd_slow: get_count(port, S, "macd_slow", d.macd_slow)?,
        macd_signal: get_count(port, S, "macd_signal", d.macd_signal)?,
    })
}

fn read_strategies(port: &dyn ConfigPort) -> Result<StrategyConfig> {
    const S: &str = "strategies";
    let d = StrategyConfig::default();
    let f = |key: &str, default: f64| port.get_double(S, key, default);
    Ok(StrategyConfig {
        pullback_max_distance_pct: f("pullback_max_distance_pct", d.pullback_max_distance_pct),
        pullback_rsi_cross_window: get_count(
            port,
            S,
            "pullback_rsi_cross_window",
            d.pullback_rsi_cross_window,
        )?,
        pullback_rsi_level: f("pullback_rsi_level", d.pullback_rsi_level),
        breakout_lookback: get_count(port, S, "breakout_lookback", d.breakout_lookback)?,
        breakout_volume_multiplier: f("breakout_volume_multiplier", d.breakout_volume_multiplier),
        breakout_min_atr_pct: f("breakout_min_atr_pct", d.breakout_min_atr_pct),
        mean_reversion_lookback: get_count(
            port,
            S,
            "mean_reversion_lookback",
            d.mean_reversion_lookback,
        )?,
        mean_reversion_rsi_oversold: f("mean_reversion_rsi_oversold", d.mean_reversion_rsi_oversold),
        macd_rsi_min: f("macd_rsi_min", d.macd_rsi_min),
        macd_rsi_max: f("macd_rsi_max", d.macd_rsi_max),
        macd_atr_pct_min: f("macd_atr_pct_min", d.macd_atr_pct_min),
        macd_atr_pct_max: f("macd_atr_pct_max", d.macd_atr_pct_max),
        golden_cross_volume_ratio: f("golden_cross_volume_ratio", d.golden_cross_volume_ratio),
        golden_cross_rsi_min: f("golden_cross_rsi_min", d.golden_cross_rsi_min),
        volume_breakout_lookback: get_count(
            port,
            S,
            "volume_breakout_lookback",
            d.volume_breakout_lookback,
        )?,
        volume_breakout_volume_multiplier: f(
            "volume_breakout_volume_multiplier",
            d.volume_breakout_volume_multiplier,
        ),
        volume_breakout_rsi_min: f("volume_breakout_rsi_min", d.volume_breakout_rsi_min),
        stop_atr_multiplier: f("stop_atr_multiplier", d.stop_atr_multiplier),
        target_atr_multiplier: f("target_atr_multiplier", d.target_atr_multiplier),
        breakout_stop_atr_multiplier: f(
            "breakout_stop_atr_multiplier",
            d.breakout_stop_atr_multiplier,
        ),
        breakout_target_atr_multiplier: f(
            "breakout_target_atr_multiplier",
            d.breakout_target_atr_multiplier,
        ),
    })
}

fn read_scoring(port: &dyn ConfigPort) -> Result<ScorerConfig> {
    const S: &str = "scoring";
    let d = ScorerConfig::default();
    Ok(ScorerConfig {
        two_signal_bonus: get_points(port, S, "two_signal_bonus", d.two_signal_bonus)?,
        multi_signal_bonus: get_points(port, S, "multi_signal_bonus", d.multi_signal_bonus)?,
        max_score: get_points(port, S, "max_score", d.max_score)?,
        min_score: get_points(port, S, "min_score", d.min_score)?,
    })
}

fn read_backtest(port: &dyn ConfigPort) -> Result<BacktestConfig> {
    const S: &str = "backtest";
    let d = BacktestConfig::default();
    let strategy = match port.get_string(S, "strategy") {
        Some(s) => s.parse()?,
        None => d.strategy,
    };
    let window = BacktestWindow::from_days(port.get_int(S, "window_days", i64::from(d.window.days())))?;
    let max_holding_days = port.get_int(S, "max_holding_days", i64::from(d.max_holding_days));
    let max_holding_days = u32::try_from(max_holding_days).map_err(|_| {
        SetupscanError::invalid("max_holding_days", "max_holding_days must be at least 1")
    })?;
    Ok(BacktestConfig {
        strategy,
        window,
        max_holding_days,
        slippage_pct: port.get_double(S, "slippage_pct", d.slippage_pct),
    })
}

fn get_count(port: &dyn ConfigPort, section: &str, key: &str, default: usize) -> Result<usize> {
    let value = port.get_int(section, key, default as i64);
    usize::try_from(value)
        .map_err(|_| SetupscanError::invalid(key, format!("{} must not be negative", value)))
}

fn get_points(port: &dyn ConfigPort, section: &str, key: &str, default: u32) -> Result<u32> {
    let value = port.get_int(section, key, i64::from(default));
    u32::try_from(value)
        .map_err(|_| SetupscanError::invalid(key, format!("{} is not a valid score", value)))
}

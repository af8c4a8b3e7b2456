//! Historical replay of the strategy detectors.
//!
//! One trade slot per instrument. The engine walks the replay window bar by
//! bar: while a trade is open it only checks exits, while idle it asks the
//! selected detectors for a trigger on the history up to the current bar.

use crate::domain::config_validation::validate_backtest_config;
use crate::domain::error::{Result, SetupscanError};
use crate::domain::execution::{apply_slippage_entry, apply_slippage_exit, check_exit};
use crate::domain::indicator::EnrichedBar;
use crate::domain::metrics::BacktestReport;
use crate::domain::position::{ExitReason, OpenTrade, SimulatedTrade};
use crate::domain::strategy::{StrategyConfig, StrategyKind, SuggestedLevels};
use std::fmt;
use std::str::FromStr;

/// Calendar-day replay windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BacktestWindow {
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
}

impl BacktestWindow {
    pub fn days(self) -> u32 {
        match self {
            BacktestWindow::ThreeMonths => 90,
            BacktestWindow::SixMonths => 180,
            BacktestWindow::OneYear => 365,
            BacktestWindow::TwoYears => 730,
        }
    }

    pub fn from_days(days: i64) -> Result<Self> {
        match days {
            90 => Ok(BacktestWindow::ThreeMonths),
            180 => Ok(BacktestWindow::SixMonths),
            365 => Ok(BacktestWindow::OneYear),
            730 => Ok(BacktestWindow::TwoYears),
            other => Err(SetupscanError::invalid(
                "window_days",
                format!("{} is not one of 90, 180, 365, 730", other),
            )),
        }
    }
}

/// Which detectors may open trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StrategySelector {
    All,
    Only(StrategyKind),
}

impl FromStr for StrategySelector {
    type Err = SetupscanError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StrategySelector::All);
        }
        s.parse::<StrategyKind>().map(StrategySelector::Only)
    }
}

impl fmt::Display for StrategySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategySelector::All => f.write_str("all"),
            StrategySelector::Only(kind) => write!(f, "{}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub strategy: StrategySelector,
    pub window: BacktestWindow,
    /// Calendar days before a trade is closed at the bar's close.
    pub max_holding_days: u32,
    /// Percent, applied against the trade on entry and on exit.
    pub slippage_pct: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            strategy: StrategySelector::All,
            window: BacktestWindow::OneYear,
            max_holding_days: 30,
            slippage_pct: 0.1,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<()> {
        validate_backtest_config(self)
    }
}

/// Replay `enriched` over the configured window and aggregate the trades.
///
/// The window covers bars dated on or after `last_date - window days`.
/// Detectors see the full enriched history up to the current bar, so the
/// indicator warmup may lie before the window. A trade still open after the
/// last bar is closed there as a timeout.
pub fn run_backtest(
    enriched: &[EnrichedBar],
    config: &BacktestConfig,
    strategies: &StrategyConfig,
) -> Result<BacktestReport> {
    config.validate()?;
    let Some(last) = enriched.last() else {
        return Err(SetupscanError::InsufficientData {
            bars: 0,
            minimum: 1,
        });
    };

    let cutoff = last.bar.date - chrono::Duration::days(i64::from(config.window.days()));
    let first = enriched.partition_point(|e| e.bar.date < cutoff);
    let window_start = enriched[first].bar.date;

    let mut trades: Vec<SimulatedTrade> = Vec::new();
    let mut open: Option<OpenTrade> = None;

    for t in first..enriched.len() {
        let bar = &enriched[t].bar;

        if let Some(mut trade) = open.take() {
            trade.track_excursion(bar.low, bar.high);
            match check_exit(&trade, bar, config.max_holding_days, config.slippage_pct) {
                Some(fill) => {
                    let closed = trade.close(bar.date, fill.price, fill.reason);
                    tracing::debug!(
                        strategy = closed.strategy.name(),
                        exit_date = %closed.exit_date,
                        reason = %closed.exit_reason,
                        return_pct = closed.return_pct,
                        "trade closed"
                    );
                    trades.push(closed);
                }
                None => {
                    open = Some(trade);
                    continue;
                }
            }
        }

        // The slot freed by an exit on this bar may take this bar's signal.

        if let Some((kind, levels)) = select_signal(&enriched[..=t], config.strategy, strategies) {
            let entry_price = apply_slippage_entry(bar.close, config.slippage_pct);
            tracing::debug!(
                strategy = kind.name(),
                entry_date = %bar.date,
                entry_price,
                "trade opened"
            );
            open = Some(OpenTrade::new(kind, bar.date, entry_price, &levels));
        }
    }

    if let Some(trade) = open {
        let exit_price = apply_slippage_exit(last.bar.close, config.slippage_pct);
        trades.push(trade.close(last.bar.date, exit_price, ExitReason::Timeout));
    }

    let report = BacktestReport::compute(trades, window_start);
    tracing::info!(
        strategy = %config.strategy,
        window_days = config.window.days(),
        trades = report.total_trades(),
        win_rate = report.win_rate,
        total_return = report.total_return,
        "backtest complete"
    );
    Ok(report)
}

/// The triggered detector that opens a trade on the last bar of `history`:
/// highest score wins, ties by scorer priority.
fn select_signal(
    history: &[EnrichedBar],
    selector: StrategySelector,
    strategies: &StrategyConfig,
) -> Option<(StrategyKind, SuggestedLevels)> {
    let kinds: &[StrategyKind] = match selector {
        StrategySelector::All => &StrategyKind::ALL,
        StrategySelector::Only(ref kind) => std::slice::from_ref(kind),
    };

    kinds
        .iter()
        .map(|kind| kind.evaluate(history, strategies))
        .filter(|r| r.triggered)
        .filter_map(|r| r.levels.map(|levels| (r.strategy, r.score, levels)))
        .min_by_key(|(kind, score, _)| (std::cmp::Reverse(*score), kind.priority()))
        .map(|(kind, _, levels)| (kind, levels))
}

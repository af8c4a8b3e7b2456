//! Backtest statistics, derived purely from a closed-trade sequence.

use crate::domain::position::{ExitReason, SimulatedTrade};
use crate::domain::strategy::StrategyKind;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Equity index the curve starts from.
pub const INITIAL_EQUITY: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExitCounts {
    pub target: usize,
    pub stop: usize,
    pub timeout: usize,
}

impl ExitCounts {
    pub fn get(&self, reason: ExitReason) -> usize {
        match reason {
            ExitReason::Target => self.target,
            ExitReason::Stop => self.stop,
            ExitReason::Timeout => self.timeout,
        }
    }

    fn record(&mut self, reason: ExitReason) {
        match reason {
            ExitReason::Target => self.target += 1,
            ExitReason::Stop => self.stop += 1,
            ExitReason::Timeout => self.timeout += 1,
        }
    }
}

/// Percent fields are percent points (10.0 = +10%); `win_rate` is a
/// fraction in [0, 1].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BacktestReport {
    pub trades: Vec<SimulatedTrade>,
    pub no_trades: bool,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_gain: f64,
    /// Mean return of the losing trades; zero or negative.
    pub avg_loss: f64,
    pub avg_return: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub profit_factor: f64,
    /// Compounded across trades in exit order.
    pub total_return: f64,
    /// Largest peak-to-trough decline of the equity curve; zero or negative.
    pub max_drawdown: f64,
    pub max_consecutive_losses: usize,
    pub avg_holding_days: f64,
    pub exit_counts: ExitCounts,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestReport {
    /// Aggregate `trades` (in exit order). `start` dates the initial equity
    /// point. An empty trade list yields a zeroed report flagged `no_trades`.
    pub fn compute(trades: Vec<SimulatedTrade>, start: NaiveDate) -> Self {
        let mut winning_trades = 0usize;
        let mut total_gains = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut sum_returns = 0.0_f64;
        let mut best_trade = f64::NEG_INFINITY;
        let mut worst_trade = f64::INFINITY;
        let mut total_holding_days = 0i64;
        let mut consecutive_losses = 0usize;
        let mut max_consecutive_losses = 0usize;
        let mut exit_counts = ExitCounts::default();

        let mut equity = INITIAL_EQUITY;
        let mut equity_curve = Vec::with_capacity(trades.len() + 1);
        equity_curve.push(EquityPoint {
            date: start,
            equity,
        });

        for trade in &trades {
            let r = trade.return_pct;
            if trade.is_winner() {
                winning_trades += 1;
                total_gains += r;
                consecutive_losses = 0;
            } else {
                total_losses += r;
                consecutive_losses += 1;
                max_consecutive_losses = max_consecutive_losses.max(consecutive_losses);
            }
            sum_returns += r;
            best_trade = best_trade.max(r);
            worst_trade = worst_trade.min(r);
            total_holding_days += trade.holding_days;
            exit_counts.record(trade.exit_reason);

            equity *= 1.0 + r / 100.0;
            equity_curve.push(EquityPoint {
                date: trade.exit_date,
                equity,
            });
        }

        let total = trades.len();
        let losing_trades = total - winning_trades;
        let mean = |sum: f64, n: usize| if n > 0 { sum / n as f64 } else { 0.0 };

        let profit_factor = if total_losses < 0.0 {
            total_gains / total_losses.abs()
        } else if total_gains > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let (best_trade, worst_trade) = if total > 0 {
            (best_trade, worst_trade)
        } else {
            (0.0, 0.0)
        };

        let max_drawdown = compute_drawdown(&equity_curve);

        BacktestReport {
            no_trades: total == 0,
            winning_trades,
            losing_trades,
            win_rate: mean(winning_trades as f64, total),
            avg_gain: mean(total_gains, winning_trades),
            avg_loss: mean(total_losses, losing_trades),
            avg_return: mean(sum_returns, total),
            best_trade,
            worst_trade,
            profit_factor,
            total_return: equity - INITIAL_EQUITY,
            max_drawdown,
            max_consecutive_losses,
            avg_holding_days: mean(total_holding_days as f64, total),
            exit_counts,
            equity_curve,
            trades,
        }
    }

    pub fn total_trades(&self) -> usize {
        self.trades.len()
    }
}

/// Largest peak-to-trough decline, as a negative percent of the peak.
pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (point.equity - peak) / peak * 100.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// One report per strategy that produced at least one trade, each with its
/// own equity curve starting at `start`.
pub fn breakdown_by_strategy(
    trades: &[SimulatedTrade],
    start: NaiveDate,
) -> BTreeMap<StrategyKind, BacktestReport> {
    let mut grouped: BTreeMap<StrategyKind, Vec<SimulatedTrade>> = BTreeMap::new();
    for trade in trades {
        grouped.entry(trade.strategy).or_default().push(trade.clone());
    }
    grouped
        .into_iter()
        .map(|(kind, trades)| (kind, BacktestReport::compute(trades, start)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    fn make_trade(strategy: StrategyKind, return_pct: f64, exit_day: i64, days: i64) -> SimulatedTrade {
        let reason = if return_pct > 0.0 {
            ExitReason::Target
        } else {
            ExitReason::Stop
        };
        SimulatedTrade {
            strategy,
            entry_date: date(exit_day - days),
            entry_price: 100.0,
            stop_price: 95.0,
            target_price: 110.0,
            exit_date: date(exit_day),
            exit_price: 100.0 + return_pct,
            exit_reason: reason,
            return_pct,
            holding_days: days,
            max_adverse_pct: 0.0,
            max_favorable_pct: 0.0,
        }
    }

    fn tp(return_pct: f64, exit_day: i64) -> SimulatedTrade {
        make_trade(StrategyKind::TrendPullback, return_pct, exit_day, 5)
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                date: date(i as i64),
                equity,
            })
            .collect()
    }

    #[test]
    fn report_no_trades() {
        let report = BacktestReport::compute(Vec::new(), date(0));
        assert!(report.no_trades);
        assert_eq!(report.total_trades(), 0);
        assert_eq!(report.win_rate, 0.0);
        assert_eq!(report.profit_factor, 0.0);
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.best_trade, 0.0);
        assert_eq!(report.worst_trade, 0.0);
        assert_eq!(report.equity_curve.len(), 1);
        assert_eq!(report.equity_curve[0].equity, INITIAL_EQUITY);
    }

    #[test]
    fn report_profit_factor() {
        let report = BacktestReport::compute(vec![tp(10.0, 10), tp(-5.0, 20)], date(0));
        assert!((report.profit_factor - 2.0).abs() < 1e-9);
        assert!((report.win_rate - 0.5).abs() < f64::EPSILON);
        assert!((report.avg_gain - 10.0).abs() < 1e-9);
        assert!((report.avg_loss - (-5.0)).abs() < 1e-9);
    }

    #[test]
    fn report_profit_factor_without_losses_is_infinite() {
        let report = BacktestReport::compute(vec![tp(3.0, 10), tp(4.0, 20)], date(0));
        assert!(report.profit_factor.is_infinite());
        assert_eq!(report.max_drawdown, 0.0);
    }

    #[test]
    fn report_total_return_compounds() {
        let report = BacktestReport::compute(vec![tp(10.0, 10), tp(10.0, 20)], date(0));
        assert!((report.total_return - 21.0).abs() < 1e-9);
        let last = report.equity_curve.last().unwrap();
        assert_eq!(last.date, date(20));
        assert!((last.equity - 121.0).abs() < 1e-9);
    }

    #[test]
    fn report_equity_curve_and_drawdown() {
        // 100 → 110 → 90 → 95
        let trades = vec![tp(10.0, 10), tp(-200.0 / 11.0, 20), tp(50.0 / 9.0, 30)];
        let report = BacktestReport::compute(trades, date(0));
        let equity: Vec<f64> = report.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equity.len(), 4);
        assert!((equity[2] - 90.0).abs() < 1e-9);
        assert!((equity[3] - 95.0).abs() < 1e-9);
        assert!((report.max_drawdown - (-18.181818181818183)).abs() < 1e-6);
    }

    #[test]
    fn report_consecutive_losses_in_order() {
        let trades = vec![
            tp(-1.0, 1),
            tp(-1.0, 2),
            tp(2.0, 3),
            tp(-1.0, 4),
            tp(-1.0, 5),
            tp(-1.0, 6),
            tp(5.0, 7),
        ];
        let report = BacktestReport::compute(trades, date(0));
        assert_eq!(report.max_consecutive_losses, 3);
        assert_eq!(report.winning_trades, 2);
        assert_eq!(report.losing_trades, 5);
    }

    #[test]
    fn report_best_worst_and_holding() {
        let trades = vec![
            make_trade(StrategyKind::Breakout, 8.0, 10, 4),
            make_trade(StrategyKind::Breakout, -3.0, 20, 6),
            make_trade(StrategyKind::Breakout, 1.0, 30, 8),
        ];
        let report = BacktestReport::compute(trades, date(0));
        assert!((report.best_trade - 8.0).abs() < f64::EPSILON);
        assert!((report.worst_trade - (-3.0)).abs() < f64::EPSILON);
        assert!((report.avg_holding_days - 6.0).abs() < 1e-9);
        assert!((report.avg_return - 2.0).abs() < 1e-9);
        assert_eq!(report.exit_counts.get(ExitReason::Target), 2);
        assert_eq!(report.exit_counts.get(ExitReason::Stop), 1);
        assert_eq!(report.exit_counts.get(ExitReason::Timeout), 0);
    }

    #[test]
    fn breakeven_counts_as_loss_without_moving_profit_factor() {
        let report = BacktestReport::compute(vec![tp(0.0, 1)], date(0));
        assert_eq!(report.losing_trades, 1);
        assert_eq!(report.profit_factor, 0.0);
        assert!(!report.no_trades);
    }

    #[test]
    fn drawdown_of_known_curve() {
        let dd = compute_drawdown(&curve(&[100.0, 110.0, 90.0, 95.0]));
        assert!((dd - (-18.18)).abs() < 0.01);
    }

    #[test]
    fn drawdown_takes_deepest_trough() {
        let dd = compute_drawdown(&curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]));
        assert!((dd - (80.0 - 110.0) / 110.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn drawdown_empty_curve() {
        assert_eq!(compute_drawdown(&[]), 0.0);
    }

    #[test]
    fn breakdown_groups_by_strategy() {
        let trades = vec![
            make_trade(StrategyKind::Breakout, 5.0, 10, 3),
            make_trade(StrategyKind::MeanReversion, -2.0, 12, 3),
            make_trade(StrategyKind::Breakout, -1.0, 20, 3),
        ];
        let by_strategy = breakdown_by_strategy(&trades, date(0));
        assert_eq!(by_strategy.len(), 2);
        assert_eq!(by_strategy[&StrategyKind::Breakout].total_trades(), 2);
        assert_eq!(by_strategy[&StrategyKind::MeanReversion].total_trades(), 1);
        assert!(!by_strategy.contains_key(&StrategyKind::GoldenCross));
    }
}

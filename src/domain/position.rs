//! Simulated trades: one open slot per instrument, closed exactly once.

use crate::domain::strategy::{StrategyKind, SuggestedLevels};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExitReason {
    Target,
    Stop,
    Timeout,
}

impl ExitReason {
    pub const ALL: [ExitReason; 3] = [ExitReason::Target, ExitReason::Stop, ExitReason::Timeout];
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Target => "target",
            ExitReason::Stop => "stop",
            ExitReason::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// A trade that has been entered and not yet exited.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub strategy: StrategyKind,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    max_adverse_pct: f64,
    max_favorable_pct: f64,
}

impl OpenTrade {
    /// Open at `entry_price` (slippage already applied) with the detector's
    /// stop and target.
    pub fn new(
        strategy: StrategyKind,
        entry_date: NaiveDate,
        entry_price: f64,
        levels: &SuggestedLevels,
    ) -> Self {
        OpenTrade {
            strategy,
            entry_date,
            entry_price,
            stop_price: levels.stop,
            target_price: levels.target,
            max_adverse_pct: 0.0,
            max_favorable_pct: 0.0,
        }
    }

    /// Calendar days held as of `date`.
    pub fn holding_days(&self, date: NaiveDate) -> i64 {
        (date - self.entry_date).num_days()
    }

    pub fn return_pct_at(&self, price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        (price - self.entry_price) / self.entry_price * 100.0
    }

    /// Widen the recorded excursions with one bar's range.
    pub fn track_excursion(&mut self, low: f64, high: f64) {
        self.max_adverse_pct = self.max_adverse_pct.min(self.return_pct_at(low));
        self.max_favorable_pct = self.max_favorable_pct.max(self.return_pct_at(high));
    }

    pub fn max_adverse_pct(&self) -> f64 {
        self.max_adverse_pct
    }

    pub fn max_favorable_pct(&self) -> f64 {
        self.max_favorable_pct
    }

    /// Consume the open trade into its immutable closed record.
    pub fn close(self, exit_date: NaiveDate, exit_price: f64, exit_reason: ExitReason) -> SimulatedTrade {
        SimulatedTrade {
            strategy: self.strategy,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            stop_price: self.stop_price,
            target_price: self.target_price,
            exit_date,
            exit_price,
            exit_reason,
            return_pct: self.return_pct_at(exit_price),
            holding_days: self.holding_days(exit_date),
            max_adverse_pct: self.max_adverse_pct,
            max_favorable_pct: self.max_favorable_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SimulatedTrade {
    pub strategy: StrategyKind,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    /// Percent points: 10.0 is +10%.
    pub return_pct: f64,
    pub holding_days: i64,
    pub max_adverse_pct: f64,
    pub max_favorable_pct: f64,
}

impl SimulatedTrade {
    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }
}

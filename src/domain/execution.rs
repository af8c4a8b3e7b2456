//! Fill simulation: slippage and the per-bar exit check.
//!
//! Long-only. Slippage always works against the trade: entries fill higher,
//! exits fill lower.

use crate::domain::ohlcv::PriceBar;
use crate::domain::position::{ExitReason, OpenTrade};

/// Long entry (buy): market_price * (1 + slippage_pct / 100)
pub fn apply_slippage_entry(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 + slippage_pct / 100.0)
}

/// Long exit (sell): market_price * (1 - slippage_pct / 100)
pub fn apply_slippage_exit(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 - slippage_pct / 100.0)
}

/// Exit decided for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitFill {
    pub reason: ExitReason,
    pub price: f64,
}

/// Check `bar` against an open trade, in priority order:
/// 1. low <= stop: exit at the stop
/// 2. high >= target: exit at the target
/// 3. calendar days held >= max_holding_days: exit at the close
///
/// A bar touching both stop and target exits at the stop. Fill prices carry
/// exit slippage.
pub fn check_exit(
    trade: &OpenTrade,
    bar: &PriceBar,
    max_holding_days: u32,
    slippage_pct: f64,
) -> Option<ExitFill> {
    let (reason, market_price) = if bar.low <= trade.stop_price {
        (ExitReason::Stop, trade.stop_price)
    } else if bar.high >= trade.target_price {
        (ExitReason::Target, trade.target_price)
    } else if trade.holding_days(bar.date) >= i64::from(max_holding_days) {
        (ExitReason::Timeout, bar.close)
    } else {
        return None;
    };

    Some(ExitFill {
        reason,
        price: apply_slippage_exit(market_price, slippage_pct),
    })
}

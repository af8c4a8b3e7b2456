//! setupscan: technical setup detection, scoring and historical replay for
//! daily price series.
//!
//! Hexagonal architecture: analysis logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].
//!
//! Pipeline: [`compute_indicators`] → [`evaluate_all_strategies`] →
//! [`score`], or [`run_backtest`] over the same enriched series.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use domain::backtest::{run_backtest, BacktestConfig, BacktestWindow, StrategySelector};
pub use domain::config::AnalysisConfig;
pub use domain::error::{Result, SetupscanError};
pub use domain::indicator::{compute_indicators, compute_indicators_with, EnrichedBar};
pub use domain::metrics::{breakdown_by_strategy, BacktestReport};
pub use domain::ohlcv::PriceBar;
pub use domain::position::{ExitReason, SimulatedTrade};
pub use domain::scanner::{backtest_universe, scan_source, scan_universe, InstrumentHistory};
pub use domain::scorer::{score, CompositeResult, ScorerConfig};
pub use domain::strategy::{evaluate_all_strategies, StrategyConfig, StrategyKind, StrategyResult};

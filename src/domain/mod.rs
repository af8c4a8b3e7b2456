//! Core domain types and analysis logic.

pub mod backtest;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod scanner;
pub mod scorer;
pub mod strategy;

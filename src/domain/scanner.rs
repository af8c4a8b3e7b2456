//! Universe-level drivers: indicators → detectors → scorer (or backtest)
//! for many instruments at once.
//!
//! One instrument is one rayon work unit. Output order never depends on
//! scheduling: scans sort by score then instrument id, backtests by id.

use crate::domain::backtest::run_backtest;
use crate::domain::config::AnalysisConfig;
use crate::domain::error::{Result, SetupscanError};
use crate::domain::indicator::compute_indicators_with;
use crate::domain::metrics::BacktestReport;
use crate::domain::ohlcv::PriceBar;
use crate::domain::scorer::{risk_flags, score, CompositeResult};
use crate::domain::strategy::evaluate_all_strategies;
use crate::ports::price_port::PriceSource;
use rayon::prelude::*;

/// One instrument's daily history.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentHistory {
    pub id: String,
    pub bars: Vec<PriceBar>,
}

impl InstrumentHistory {
    pub fn new(id: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        InstrumentHistory {
            id: id.into(),
            bars,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InstrumentBacktest {
    pub instrument_id: String,
    pub report: BacktestReport,
}

/// Full pipeline for one instrument, scored on its latest bar.
pub fn analyze_instrument(
    instrument_id: &str,
    bars: &[PriceBar],
    config: &AnalysisConfig,
) -> Result<CompositeResult> {
    let enriched = compute_indicators_with(bars, &config.indicators)
        .map_err(|e| with_instrument(instrument_id, e))?;
    let results = evaluate_all_strategies(&enriched, &config.strategies);
    let mut composite = score(instrument_id, results, &config.scoring);
    if let Some(latest) = enriched.last() {
        composite.risk_flags = risk_flags(latest);
    }
    Ok(composite)
}

/// Analyze every instrument in parallel. Instruments that fail are logged
/// and skipped; results under the configured minimum score are dropped.
pub fn scan_universe(
    universe: &[InstrumentHistory],
    config: &AnalysisConfig,
) -> Vec<CompositeResult> {
    let results: Vec<CompositeResult> = universe
        .par_iter()
        .filter_map(|inst| match analyze_instrument(&inst.id, &inst.bars, config) {
            Ok(composite) => Some(composite),
            Err(e) => {
                tracing::warn!(instrument = %inst.id, error = %e, "skipping instrument");
                None
            }
        })
        .collect();
    rank(results, config.scoring.min_score)
}

/// Fetch each instrument from `source` and scan it. Fetch failures are
/// logged and skipped.
pub fn scan_source<S>(
    source: &S,
    instruments: &[String],
    config: &AnalysisConfig,
) -> Vec<CompositeResult>
where
    S: PriceSource + Sync,
{
    let results: Vec<CompositeResult> = instruments
        .par_iter()
        .filter_map(|id| {
            let analyzed = source
                .fetch_bars(id)
                .and_then(|bars| analyze_instrument(id, &bars, config));
            match analyzed {
                Ok(composite) => Some(composite),
                Err(e) => {
                    tracing::warn!(instrument = %id, error = %e, "skipping instrument");
                    None
                }
            }
        })
        .collect();
    rank(results, config.scoring.min_score)
}

/// Backtest every instrument in parallel with `config.backtest`.
pub fn backtest_universe(
    universe: &[InstrumentHistory],
    config: &AnalysisConfig,
) -> Result<Vec<InstrumentBacktest>> {
    config.backtest.validate()?;

    let mut reports: Vec<InstrumentBacktest> = universe
        .par_iter()
        .filter_map(|inst| {
            let report = compute_indicators_with(&inst.bars, &config.indicators)
                .and_then(|enriched| run_backtest(&enriched, &config.backtest, &config.strategies));
            match report {
                Ok(report) => Some(InstrumentBacktest {
                    instrument_id: inst.id.clone(),
                    report,
                }),
                Err(e) => {
                    tracing::warn!(instrument = %inst.id, error = %e, "skipping instrument");
                    None
                }
            }
        })
        .collect();

    reports.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
    tracing::info!(instruments = reports.len(), "universe backtest complete");
    Ok(reports)
}

fn rank(mut results: Vec<CompositeResult>, min_score: u32) -> Vec<CompositeResult> {
    results.retain(|c| c.overall_score >= min_score);
    results.sort_by(|a, b| {
        b.overall_score
            .cmp(&a.overall_score)
            .then_with(|| a.instrument_id.cmp(&b.instrument_id))
    });
    tracing::info!(
        ranked = results.len(),
        signals = results.iter().filter(|c| c.has_signal).count(),
        "scan complete"
    );
    results
}

fn with_instrument(instrument_id: &str, err: SetupscanError) -> SetupscanError {
    match err {
        SetupscanError::InsufficientData { bars, minimum } => SetupscanError::Data {
            instrument: instrument_id.to_string(),
            reason: format!("have {} bars, need {}", bars, minimum),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::bars_from_closes;

    fn rising(n: usize) -> Vec<PriceBar> {
        let closes: Vec<f64> = (0..n).map(|i| 50.0 + i as f64 * 0.25).collect();
        bars_from_closes(&closes)
    }

    #[test]
    fn analyze_empty_history_names_instrument() {
        let err = analyze_instrument("XYZ", &[], &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, SetupscanError::Data { instrument, .. } if instrument == "XYZ"));
    }

    #[test]
    fn analyze_short_history_has_no_signal() {
        let composite = analyze_instrument("XYZ", &rising(30), &AnalysisConfig::default()).unwrap();
        assert_eq!(composite.results.len(), 6);
        assert!(!composite.has_signal);
    }

    #[test]
    fn scan_skips_failures_and_orders_deterministically() {
        let universe = vec![
            InstrumentHistory::new("CCC", rising(260)),
            InstrumentHistory::new("BAD", Vec::new()),
            InstrumentHistory::new("AAA", rising(260)),
            InstrumentHistory::new("BBB", rising(260)),
        ];
        let results = scan_universe(&universe, &AnalysisConfig::default());
        let ids: Vec<&str> = results.iter().map(|c| c.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["AAA", "BBB", "CCC"]);
        assert_eq!(results, scan_universe(&universe, &AnalysisConfig::default()));
    }

    #[test]
    fn min_score_filters() {
        let mut config = AnalysisConfig::default();
        config.scoring.min_score = 101;
        let universe = vec![InstrumentHistory::new("AAA", rising(260))];
        assert!(scan_universe(&universe, &config).is_empty());
    }

    #[test]
    fn backtest_universe_sorted_by_id() {
        let universe = vec![
            InstrumentHistory::new("ZZZ", rising(260)),
            InstrumentHistory::new("AAA", rising(260)),
        ];
        let reports = backtest_universe(&universe, &AnalysisConfig::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].instrument_id, "AAA");
        assert_eq!(reports[1].instrument_id, "ZZZ");
        assert_eq!(reports[0].report, reports[1].report);
    }
}

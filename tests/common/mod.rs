#![allow(dead_code)]

use chrono::NaiveDate;
use setupscan::domain::error::SetupscanError;
pub use setupscan::domain::ohlcv::PriceBar;
use setupscan::ports::price_port::PriceSource;
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_bars(&self, instrument: &str) -> Result<Vec<PriceBar>, SetupscanError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(SetupscanError::Data {
                instrument: instrument.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(instrument).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn start_date() -> NaiveDate {
    date(2023, 1, 2)
}

/// One bar per calendar day from `start_date()`, with a 1.0 high-low range
/// around the close and constant volume.
pub fn make_bar(day: usize, close: f64) -> PriceBar {
    PriceBar {
        date: start_date() + chrono::Duration::days(day as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c))
        .collect()
}

pub fn flat_bars(n: usize, close: f64) -> Vec<PriceBar> {
    bars_from_closes(&vec![close; n])
}

/// 200 bars sliding from 150 to ~100, then 150 bars climbing 1.0 per bar.
/// SMA50 starts below SMA200 and crosses above it exactly once, during the
/// climb.
pub fn decline_then_rally() -> Vec<PriceBar> {
    let decline = (0..200).map(|i| 150.0 - i as f64 * 0.25);
    let rally = (1..=150).map(|k| 100.25 + k as f64);
    bars_from_closes(&decline.chain(rally).collect::<Vec<f64>>())
}

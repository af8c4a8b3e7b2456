//! Price history port, implemented by the data-acquisition collaborator.

use crate::domain::error::SetupscanError;
use crate::domain::ohlcv::PriceBar;

/// Source of daily bars for an instrument.
///
/// Implementations return bars ordered by date, deduplicated and gap-free on
/// trading days. Fetching and caching happen entirely behind this trait.
pub trait PriceSource {
    fn fetch_bars(&self, instrument: &str) -> Result<Vec<PriceBar>, SetupscanError>;
}

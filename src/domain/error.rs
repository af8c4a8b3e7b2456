//! Domain error types.

/// Top-level error type for setupscan.
///
/// Only hard failures live here. Indicator and signal degeneracies (short
/// history, flat windows, zero variance) are absorbed by the components and
/// surface as "no signal" data instead.
#[derive(Debug, thiserror::Error)]
pub enum SetupscanError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("data error for {instrument}: {reason}")]
    Data { instrument: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SetupscanError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SetupscanError::InvalidConfiguration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = SetupscanError::InsufficientData {
            bars: 0,
            minimum: 1,
        };
        assert_eq!(err.to_string(), "insufficient data: have 0 bars, need 1");
    }

    #[test]
    fn invalid_configuration_names_field() {
        let err = SetupscanError::invalid("max_holding_days", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid configuration for max_holding_days: must be at least 1"
        );
        assert!(
            matches!(err, SetupscanError::InvalidConfiguration { field, .. } if field == "max_holding_days")
        );
    }

    #[test]
    fn io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: SetupscanError = io.into();
        assert_eq!(err.to_string(), "missing file");
    }
}

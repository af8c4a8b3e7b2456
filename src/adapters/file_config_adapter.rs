//! INI file configuration adapter.

use crate::domain::error::SetupscanError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    /// Read and parse an INI file. A missing or unreadable file is an I/O
    /// error; malformed content is a parse error naming the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SetupscanError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse_content(content, &path.display().to_string())
    }

    pub fn from_string(content: &str) -> Result<Self, SetupscanError> {
        Self::parse_content(content.to_string(), "<string>")
    }

    fn parse_content(content: String, origin: &str) -> Result<Self, SetupscanError> {
        let mut config = Ini::new();
        config
            .read(content)
            .map_err(|reason| SetupscanError::ConfigParse {
                file: origin.to_string(),
                reason,
            })?;
        tracing::debug!(origin, sections = config.sections().len(), "configuration loaded");
        Ok(Self { config })
    }

    /// Typed lookup; a present value that fails to parse is logged and
    /// treated as missing.
    fn parse<T: std::str::FromStr>(&self, section: &str, key: &str) -> Option<T> {
        let raw = self.config.get(section, key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(section, key, value = %raw, "ignoring unparsable config value");
                None
            }
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parse(section, key).unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parse(section, key).unwrap_or(default)
    }
}

// Mon Oct 19 2026 - Alex

use crate::diff::ComparisonOptions;
use crate::reader::{default_encodings, TextEncoding};
use crate::tax::RuleProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encodings: Vec<TextEncoding>,
    pub max_findings: Option<usize>,
    pub rules: RuleProfile,
    pub comparison: ComparisonOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
            max_findings: None,
            rules: RuleProfile::default(),
            comparison: ComparisonOptions::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn with_max_findings(mut self, max_findings: usize) -> Self {
        self.max_findings = Some(max_findings);
        self
    }

    pub fn with_rules(mut self, rules: RuleProfile) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_comparison(mut self, comparison: ComparisonOptions) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encodings.is_empty() {
            return Err(ConfigError::Invalid("encodings must not be empty".to_string()));
        }
        if self.max_findings == Some(0) {
            return Err(ConfigError::Invalid("max_findings must be greater than 0".to_string()));
        }

        let rules = &self.rules;
        let codes = [
            &rules.header_type,
            &rules.invoice_type,
            &rules.item_type,
            &rules.financial_marker_type,
            &rules.totals_type,
            &rules.transaction_type,
            &rules.trailer_type,
        ];
        let listed = rules
            .repeat_allowed
            .iter()
            .chain(rules.item_taxes.iter())
            .chain(rules.tax_checks.iter().map(|c| &c.record_type))
            .chain(rules.total_sources.iter().map(|s| &s.record_type))
            .chain(self.comparison.excluded_types.iter());
        for code in codes.into_iter().chain(listed) {
            if code.chars().count() != 2 {
                return Err(ConfigError::Invalid(format!("record type '{}' must be 2 characters", code)));
            }
        }
        if rules.fatura_position.0 == 0 || rules.nf_position.0 == 0 {
            return Err(ConfigError::Invalid("invoice key positions are 1-based".to_string()));
        }

        self.comparison
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::new().with_encodings(Vec::new()).validate().is_err());
        assert!(Config::new().with_max_findings(0).validate().is_err());

        let mut rules = RuleProfile::default();
        rules.totals_type = "560".to_string();
        assert!(Config::new().with_rules(rules).validate().is_err());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"encodings": ["latin1"], "max_findings": 50}}"#).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.encodings, vec![TextEncoding::Latin1]);
        assert_eq!(config.max_findings, Some(50));
        assert_eq!(config.rules, RuleProfile::nfcom());
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(Config::load("/nonexistent/fwcheck.json"), Err(ConfigError::Io { .. })));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }
}

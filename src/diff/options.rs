// Mon Oct 19 2026 - Alex

use crate::diff::error::ComparisonError;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Candidate record type -> reference record type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordRemap(IndexMap<String, String>);

impl RecordRemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, candidate: &str, reference: &str) -> Result<(), ComparisonError> {
        if candidate.chars().count() != 2 || reference.chars().count() != 2 {
            return Err(ComparisonError::InvalidRemap(format!("{}={}", candidate, reference)));
        }
        self.0.insert(candidate.to_string(), reference.to_string());
        Ok(())
    }

    /// Parses `CAND=REF`.
    pub fn parse_entry(&mut self, entry: &str) -> Result<(), ComparisonError> {
        let (candidate, reference) = entry
            .split_once('=')
            .ok_or_else(|| ComparisonError::InvalidRemap(entry.to_string()))?;
        self.insert(candidate.trim(), reference.trim())
    }

    pub fn reference_for<'a>(&'a self, candidate: &'a str) -> &'a str {
        self.0.get(candidate).map(String::as_str).unwrap_or(candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Prohibition {
    AllZeros,
    Equals(String),
}

/// A value a candidate field must never carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProhibitedValueRule {
    pub field: String,
    pub prohibition: Prohibition,
}

impl ProhibitedValueRule {
    pub fn all_zeros(field: &str) -> Self {
        Self {
            field: field.to_string(),
            prohibition: Prohibition::AllZeros,
        }
    }

    pub fn equals(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            prohibition: Prohibition::Equals(value.to_string()),
        }
    }

    pub fn violated_by(&self, value: &str) -> bool {
        let value = value.trim();
        match &self.prohibition {
            Prohibition::AllZeros => !value.is_empty() && value.chars().all(|c| c == '0'),
            Prohibition::Equals(v) => value == v.trim(),
        }
    }

    pub fn describe(&self) -> String {
        match &self.prohibition {
            Prohibition::AllZeros => format!("{} must not be all zeros", self.field),
            Prohibition::Equals(v) => format!("{} must not be '{}'", self.field, v),
        }
    }
}

/// Cross-environment settings for a comparison run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonOptions {
    pub remap: RecordRemap,
    pub excluded_types: IndexSet<String>,
    pub ignored_fields: IndexSet<String>,
    pub prohibited: Vec<ProhibitedValueRule>,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            remap: RecordRemap::new(),
            excluded_types: IndexSet::new(),
            ignored_fields: IndexSet::new(),
            prohibited: vec![
                ProhibitedValueRule::all_zeros("NFE01-NUM-NF"),
                ProhibitedValueRule::all_zeros("NFE01-NUM-FATURA"),
            ],
        }
    }
}

impl ComparisonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remap(mut self, candidate: &str, reference: &str) -> Result<Self, ComparisonError> {
        self.remap.insert(candidate, reference)?;
        Ok(self)
    }

    pub fn exclude_type(mut self, record_type: &str) -> Self {
        self.excluded_types.insert(record_type.to_string());
        self
    }

    pub fn ignore_field(mut self, field: &str) -> Self {
        self.ignored_fields.insert(field.to_string());
        self
    }

    pub fn is_excluded(&self, record_type: &str) -> bool {
        self.excluded_types.contains(record_type)
    }

    pub fn is_ignored(&self, field: &str) -> bool {
        self.ignored_fields.contains(field)
    }

    pub fn validate(&self) -> Result<(), ComparisonError> {
        for (candidate, reference) in self.remap.iter() {
            if candidate.chars().count() != 2 || reference.chars().count() != 2 {
                return Err(ComparisonError::InvalidRemap(format!("{}={}", candidate, reference)));
            }
        }
        Ok(())
    }
}

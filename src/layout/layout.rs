// Mon Oct 19 2026 - Alex

use crate::layout::error::LayoutError;
use crate::layout::field::FieldSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered fields of one record shape plus its declared line length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub record_type: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub line_length: usize,
}

impl Layout {
    /// Builds a layout, rejecting duplicate names and overlapping ranges.
    pub fn new(name: &str, record_type: Option<&str>, fields: Vec<FieldSpec>) -> Result<Self, LayoutError> {
        if fields.is_empty() {
            return Err(LayoutError::Empty);
        }
        let label = record_type.unwrap_or("*").to_string();

        let mut seen = HashSet::new();
        for field in &fields {
            if field.start == 0 {
                return Err(LayoutError::InvalidStart(field.name.clone()));
            }
            if field.length == 0 {
                return Err(LayoutError::InvalidLength(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(LayoutError::DuplicateField {
                    record_type: label,
                    field: field.name.clone(),
                });
            }
        }

        let mut ordered: Vec<&FieldSpec> = fields.iter().collect();
        ordered.sort_by_key(|f| f.start);
        for pair in ordered.windows(2) {
            if pair[0].overlaps(pair[1]) {
                return Err(LayoutError::Overlap {
                    record_type: label,
                    first: pair[0].name.clone(),
                    first_start: pair[0].start,
                    first_end: pair[0].end(),
                    second: pair[1].name.clone(),
                    second_start: pair[1].start,
                    second_end: pair[1].end(),
                });
            }
        }

        let line_length = fields.iter().map(|f| f.end()).max().unwrap_or(0);

        Ok(Self {
            name: name.to_string(),
            record_type: record_type.map(|s| s.to_string()),
            fields,
            line_length,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Trimmed value of a named field, empty when the field is not in this layout.
    pub fn value<'a>(&self, line: &'a str, name: &str) -> &'a str {
        self.field(name).map(|f| f.extract(line).trim()).unwrap_or("")
    }
}

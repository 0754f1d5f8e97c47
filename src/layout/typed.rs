// Mon Oct 19 2026 - Alex

use crate::layout::error::LayoutError;
use crate::layout::field::FieldSpec;
use crate::layout::layout::Layout;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TYPED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]+?([0-9]{2})-").expect("static regex")
});

/// Record-type code embedded in a field name (`NFE22-ICM00-VLR` -> `22`).
pub fn record_type_of(field_name: &str) -> Option<String> {
    TYPED_NAME
        .captures(field_name.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Record type of a physical line: its first two characters.
pub fn line_record_type(line: &str) -> Option<&str> {
    let mut chars = line.char_indices();
    chars.next()?;
    let (second, c) = chars.next()?;
    Some(&line[..second + c.len_utf8()])
}

/// Layouts keyed by two-character record type, with a flat fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedLayoutSet {
    layouts: IndexMap<String, Layout>,
    flat: Option<Layout>,
}

impl TypedLayoutSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flat(layout: Layout) -> Self {
        Self {
            layouts: IndexMap::new(),
            flat: Some(layout),
        }
    }

    pub fn insert(&mut self, record_type: &str, layout: Layout) {
        self.layouts.insert(record_type.to_string(), layout);
    }

    /// Splits a field list by naming convention and validates each record
    /// type on its own. Falls back to one flat layout when no field carries a
    /// type code.
    pub fn partition(name: &str, fields: Vec<FieldSpec>) -> Result<Self, LayoutError> {
        if fields.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut groups: IndexMap<String, Vec<FieldSpec>> = IndexMap::new();
        let mut untyped = Vec::new();
        for field in fields {
            match record_type_of(&field.name) {
                Some(code) => groups.entry(code).or_default().push(field),
                None => untyped.push(field),
            }
        }

        if groups.is_empty() {
            log::debug!("Layout '{}' has no typed fields, using flat layout", name);
            return Ok(Self::flat(Layout::new(name, None, untyped)?));
        }

        if !untyped.is_empty() {
            log::warn!(
                "Layout '{}': {} field(s) without a record type were dropped: {}",
                name,
                untyped.len(),
                itertools::join(untyped.iter().map(|f| f.name.as_str()), ", ")
            );
        }

        let mut set = Self::new();
        for (code, group) in groups {
            let layout = Layout::new(&format!("{}-{}", name, code), Some(&code), group)?;
            log::trace!("Record type {}: {} fields, {} chars", code, layout.field_count(), layout.line_length);
            set.insert(&code, layout);
        }
        Ok(set)
    }

    pub fn is_typed(&self) -> bool {
        !self.layouts.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty() && self.flat.is_none()
    }

    /// Layout that applies to a record type: its own, else the flat fallback.
    pub fn layout_for(&self, record_type: &str) -> Option<&Layout> {
        self.layouts.get(record_type).or(self.flat.as_ref())
    }

    pub fn field(&self, record_type: &str, name: &str) -> Option<&FieldSpec> {
        self.layout_for(record_type).and_then(|l| l.field(name))
    }

    /// Looks a field up across every record type.
    pub fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.layouts
            .values()
            .chain(self.flat.iter())
            .find_map(|l| l.field(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.find_field(name).is_some()
    }

    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(|k| k.as_str())
    }

    pub fn max_line_length(&self) -> usize {
        self.layouts
            .values()
            .chain(self.flat.iter())
            .map(|l| l.line_length)
            .max()
            .unwrap_or(0)
    }

    /// Declared length used to pad a line of the given type.
    pub fn line_length(&self, record_type: &str) -> usize {
        self.layout_for(record_type)
            .map(|l| l.line_length)
            .unwrap_or_else(|| self.max_line_length())
    }

    pub fn layouts(&self) -> impl Iterator<Item = &Layout> {
        self.layouts.values().chain(self.flat.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::field::FieldKind;

    fn int_field(name: &str, start: usize, len: usize) -> FieldSpec {
        FieldSpec::new(name, start, len, FieldKind::Integer).unwrap()
    }

    #[test]
    fn test_record_type_of() {
        assert_eq!(record_type_of("NFE22-ICM00-VLR"), Some("22".to_string()));
        assert_eq!(record_type_of("NFE01-NUM-NF"), Some("01".to_string()));
        assert_eq!(record_type_of("VALOR"), None);
        assert_eq!(record_type_of("22-X"), None);
    }

    #[test]
    fn test_line_record_type() {
        assert_eq!(line_record_type("01ABC"), Some("01"));
        assert_eq!(line_record_type("9"), None);
        assert_eq!(line_record_type("çã123"), Some("çã"));
    }

    #[test]
    fn test_partition_allows_overlap_across_types() {
        let fields = vec![
            int_field("NFE01-TP-REG", 1, 2),
            int_field("NFE01-NUM-FATURA", 3, 13),
            int_field("NFE22-TP-REG", 1, 2),
            int_field("NFE22-ICM00-VLR-BC", 3, 16),
        ];
        let set = TypedLayoutSet::partition("nfcom", fields).unwrap();
        assert!(set.is_typed());
        assert_eq!(set.record_types().collect::<Vec<_>>(), vec!["01", "22"]);
        assert_eq!(set.line_length("01"), 15);
        assert_eq!(set.line_length("22"), 18);
        assert_eq!(set.line_length("77"), 18);
        assert!(set.field("22", "NFE01-NUM-FATURA").is_none());
        assert!(set.find_field("NFE01-NUM-FATURA").is_some());
    }

    #[test]
    fn test_partition_rejects_overlap_within_type() {
        let fields = vec![int_field("NFE22-A", 1, 4), int_field("NFE22-B", 3, 4)];
        assert!(TypedLayoutSet::partition("x", fields).is_err());
    }

    #[test]
    fn test_partition_degrades_to_flat() {
        let fields = vec![int_field("CODE", 1, 2), int_field("AMOUNT", 3, 10)];
        let set = TypedLayoutSet::partition("flat", fields).unwrap();
        assert!(!set.is_typed());
        assert_eq!(set.line_length("99"), 12);
        assert!(set.field("01", "AMOUNT").is_some());
    }
}

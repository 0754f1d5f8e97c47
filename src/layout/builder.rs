// Mon Oct 19 2026 - Alex

use crate::layout::cache::MappingCache;
use crate::layout::error::LayoutError;
use crate::layout::field::{FieldKind, FieldSpec};
use crate::layout::typed::TypedLayoutSet;
use crate::utils::hash::HashComputer;
use serde::{Deserialize, Serialize};

/// One spreadsheet-shaped layout row, as handed over by the layout authoring side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRow {
    #[serde(alias = "Campo", alias = "campo")]
    pub name: String,
    #[serde(alias = "Posicao_Inicio", alias = "inicio")]
    pub start: usize,
    #[serde(alias = "Tamanho", alias = "tamanho")]
    pub length: usize,
    #[serde(alias = "Tipo", alias = "tipo")]
    pub kind: String,
    #[serde(alias = "Obrigatorio", alias = "obrigatorio", default)]
    pub required: String,
    #[serde(alias = "Formato", alias = "formato", default)]
    pub format: Option<String>,
}

impl LayoutRow {
    pub fn new(name: &str, start: usize, length: usize, kind: &str, required: &str) -> Self {
        Self {
            name: name.to_string(),
            start,
            length,
            kind: kind.to_string(),
            required: required.to_string(),
            format: None,
        }
    }

    pub fn to_field(&self) -> Result<FieldSpec, LayoutError> {
        let kind = FieldKind::from_label(&self.kind).ok_or_else(|| LayoutError::UnknownKind {
            field: self.name.clone(),
            kind: self.kind.clone(),
        })?;
        let mut field = FieldSpec::new(self.name.trim(), self.start, self.length, kind)?
            .required(is_required(&self.required));
        if let Some(format) = self.format.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            field = field.with_format(format);
        }
        Ok(field)
    }
}

pub fn is_required(label: &str) -> bool {
    matches!(
        label.trim().to_uppercase().as_str(),
        "S" | "SIM" | "Y" | "YES" | "1" | "TRUE" | "OBRIG" | "OBRIGATORIO"
    )
}

pub struct TypedLayoutSetBuilder {
    name: String,
    rows: Vec<LayoutRow>,
}

impl TypedLayoutSetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, row: LayoutRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows<I: IntoIterator<Item = LayoutRow>>(mut self, rows: I) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Stable signature of the row set, used as the cache key.
    pub fn signature(&self) -> String {
        let mut material = String::new();
        for row in &self.rows {
            material.push_str(&format!(
                "{}|{}|{}|{}|{}|{};",
                row.name.trim(),
                row.start,
                row.length,
                row.kind.trim().to_uppercase(),
                row.required.trim().to_uppercase(),
                row.format.as_deref().unwrap_or("")
            ));
        }
        format!("{:016x}", HashComputer::fnv1a_64(material.as_bytes()))
    }

    pub fn build(&self) -> Result<TypedLayoutSet, LayoutError> {
        let fields = self
            .rows
            .iter()
            .map(LayoutRow::to_field)
            .collect::<Result<Vec<_>, _>>()?;
        TypedLayoutSet::partition(&self.name, fields)
    }

    pub fn build_cached(&self, cache: &dyn MappingCache) -> Result<TypedLayoutSet, LayoutError> {
        let signature = self.signature();
        if let Some(set) = cache.get(&signature) {
            log::debug!("Layout '{}' served from cache ({})", self.name, signature);
            return Ok(set);
        }
        let set = self.build()?;
        cache.put(&signature, set.clone());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::cache::InMemoryMappingCache;

    fn rows() -> Vec<LayoutRow> {
        vec![
            LayoutRow::new("NFE01-TP-REG", 1, 2, "NUM", "S"),
            LayoutRow::new("NFE01-NUM-FATURA", 3, 13, "NUM", "S"),
            LayoutRow::new("NFE22-TP-REG", 1, 2, "NUM", "S"),
            LayoutRow::new("NFE22-ICM00-VLR-BC", 49, 16, "DECIMAL", "N"),
        ]
    }

    #[test]
    fn test_build_typed_set() {
        let set = TypedLayoutSetBuilder::new("nfcom").rows(rows()).build().unwrap();
        let field = set.field("22", "NFE22-ICM00-VLR-BC").unwrap();
        assert_eq!(field.kind, FieldKind::Decimal);
        assert!(!field.required);
        assert!(set.field("01", "NFE01-TP-REG").unwrap().required);
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let err = TypedLayoutSetBuilder::new("x")
            .row(LayoutRow::new("NFE01-A", 1, 2, "BLOB", "S"))
            .build()
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownKind { .. }));
    }

    #[test]
    fn test_row_deserializes_spreadsheet_headers() {
        let json = r#"{"Campo":"NFE01-NUM-NF","Posicao_Inicio":24,"Tamanho":9,"Tipo":"NUMERO","Obrigatorio":"S"}"#;
        let row: LayoutRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.to_field().unwrap().end(), 32);
    }

    #[test]
    fn test_build_cached_reuses_entry() {
        let cache = InMemoryMappingCache::new(8);
        let builder = TypedLayoutSetBuilder::new("nfcom").rows(rows());
        let first = builder.build_cached(&cache).unwrap();
        assert_eq!(cache.len(), 1);
        let second = builder.build_cached(&cache).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_signature_changes_with_rows() {
        let a = TypedLayoutSetBuilder::new("a").rows(rows()).signature();
        let b = TypedLayoutSetBuilder::new("a")
            .rows(rows())
            .row(LayoutRow::new("NFE56-TOT", 3, 4, "NUM", "N"))
            .signature();
        assert_ne!(a, b);
    }
}

// Mon Oct 19 2026 - Alex

use crate::tax::InvoiceKey;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Lines belonging to one (fatura, NF) pair during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceGroup {
    pub key: InvoiceKey,
    pub lines: Vec<usize>,
    /// Total field -> lines that contributed to it.
    pub contributors: IndexMap<String, Vec<usize>>,
    pub transaction_id: Option<String>,
}

impl InvoiceGroup {
    fn new(key: InvoiceKey) -> Self {
        Self {
            key,
            lines: Vec::new(),
            contributors: IndexMap::new(),
            transaction_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEntry {
    pub line: usize,
    pub fatura: String,
    pub nf: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvoiceStats {
    /// Number of invoice records, duplicates included.
    pub invoices: usize,
    pub distinct_faturas: usize,
    pub unique_pairs: usize,
    pub duplicates: Vec<DuplicateEntry>,
    pub nfs_per_fatura: IndexMap<String, Vec<String>>,
}

/// Invoice identity, grouping and counting across one pass.
#[derive(Debug, Default)]
pub struct InvoiceTracker {
    count: usize,
    current: Option<InvoiceKey>,
    seen: HashSet<InvoiceKey>,
    groups: IndexMap<InvoiceKey, InvoiceGroup>,
    line_owner: BTreeMap<usize, InvoiceKey>,
    duplicates: Vec<DuplicateEntry>,
    nfs_per_fatura: IndexMap<String, IndexSet<String>>,
}

impl InvoiceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `key` the current invoice. Returns `true` when the pair was
    /// already used earlier in the file.
    pub fn open(&mut self, line: usize, key: InvoiceKey) -> bool {
        self.count += 1;
        self.nfs_per_fatura
            .entry(key.fatura.clone())
            .or_default()
            .insert(key.nf.clone());
        self.groups
            .entry(key.clone())
            .or_insert_with(|| InvoiceGroup::new(key.clone()));

        let duplicate = !self.seen.insert(key.clone());
        if duplicate {
            self.duplicates.push(DuplicateEntry {
                line,
                fatura: key.fatura.clone(),
                nf: key.nf.clone(),
            });
        }
        self.current = Some(key);
        duplicate
    }

    pub fn current(&self) -> Option<&InvoiceKey> {
        self.current.as_ref()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn current_group(&mut self) -> Option<&mut InvoiceGroup> {
        let key = self.current.as_ref()?;
        self.groups.get_mut(key)
    }

    pub fn register_line(&mut self, line: usize) {
        let Some(key) = self.current.clone() else {
            return;
        };
        if let Some(group) = self.groups.get_mut(&key) {
            group.lines.push(line);
        }
        self.line_owner.insert(line, key);
    }

    pub fn record_contribution(&mut self, total_field: &str, line: usize) {
        if let Some(group) = self.current_group() {
            group
                .contributors
                .entry(total_field.to_string())
                .or_default()
                .push(line);
        }
    }

    pub fn set_transaction_id(&mut self, id: &str) {
        if let Some(group) = self.current_group() {
            group.transaction_id = Some(id.to_string());
        }
    }

    pub fn stats(&self) -> InvoiceStats {
        InvoiceStats {
            invoices: self.count,
            distinct_faturas: self.nfs_per_fatura.len(),
            unique_pairs: self.seen.len(),
            duplicates: self.duplicates.clone(),
            nfs_per_fatura: self
                .nfs_per_fatura
                .iter()
                .map(|(fatura, nfs)| (fatura.clone(), nfs.iter().cloned().collect()))
                .collect(),
        }
    }

    pub fn into_parts(self) -> (Vec<InvoiceGroup>, BTreeMap<usize, InvoiceKey>) {
        (self.groups.into_values().collect(), self.line_owner)
    }
}

/// Item opened by an item record, waiting for its tax records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenItem {
    pub line: usize,
    pub seen: BTreeSet<String>,
    pub financial: bool,
}

impl OpenItem {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            seen: BTreeSet::new(),
            financial: false,
        }
    }

    /// Expected taxes not seen for a non-financial item, in expected order.
    pub fn missing<'a>(&self, expected: &'a [String]) -> Vec<&'a str> {
        if self.financial {
            return Vec::new();
        }
        expected
            .iter()
            .filter(|t| !self.seen.contains(*t))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_includes_duplicates() {
        let mut tracker = InvoiceTracker::new();
        assert!(!tracker.open(1, InvoiceKey::new("F1", "1")));
        assert!(!tracker.open(5, InvoiceKey::new("F1", "2")));
        assert!(tracker.open(9, InvoiceKey::new("F1", "1")));

        let stats = tracker.stats();
        assert_eq!(stats.invoices, 3);
        assert_eq!(stats.unique_pairs, 2);
        assert_eq!(stats.distinct_faturas, 1);
        assert_eq!(stats.duplicates, vec![DuplicateEntry { line: 9, fatura: "F1".into(), nf: "1".into() }]);
        assert_eq!(stats.nfs_per_fatura["F1"], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_line_owner_side_lookup() {
        let mut tracker = InvoiceTracker::new();
        tracker.register_line(1);
        tracker.open(2, InvoiceKey::new("F1", "1"));
        tracker.register_line(2);
        tracker.register_line(3);
        tracker.record_contribution("T", 3);
        tracker.set_transaction_id("1234567890FTC");

        let (groups, owner) = tracker.into_parts();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].lines, vec![2, 3]);
        assert_eq!(groups[0].contributors["T"], vec![3]);
        assert_eq!(groups[0].transaction_id.as_deref(), Some("1234567890FTC"));
        assert!(!owner.contains_key(&1));
        assert_eq!(owner[&3], InvoiceKey::new("F1", "1"));
    }

    #[test]
    fn test_open_item_missing() {
        let expected: Vec<String> = ["22", "38", "40"].iter().map(|s| s.to_string()).collect();
        let mut item = OpenItem::new(4);
        item.seen.insert("38".into());
        assert_eq!(item.missing(&expected), vec!["22", "40"]);
        item.financial = true;
        assert!(item.missing(&expected).is_empty());
    }
}

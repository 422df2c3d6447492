//! Linear-scan reference index.
//!
//! Answers the same overlap query as [`IntervalTree`](crate::tree::IntervalTree)
//! by testing every stored record. Used for side-by-side comparison in the CLI
//! and as a brute-force oracle in tests.

use crate::interval::GeneRecord;

/// Records in insertion order, searched by full scan.
#[derive(Debug, Clone, Default)]
pub struct NaiveIndex {
    records: Vec<GeneRecord>,
}

impl NaiveIndex {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn insert_record(&mut self, record: GeneRecord) {
        self.records.push(record);
    }

    /// Find overlapping records, in insertion order.
    pub fn overlap_search(&self, query_start: i64, query_end: i64) -> Vec<&GeneRecord> {
        self.records
            .iter()
            .filter(|r| r.overlaps(query_start, query_end))
            .collect()
    }

    pub fn records(&self) -> &[GeneRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<GeneRecord> for NaiveIndex {
    fn from_iter<I: IntoIterator<Item = GeneRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Compare two result sets ignoring order. Duplicates are counted.
pub fn same_matches(a: &[&GeneRecord], b: &[&GeneRecord]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&GeneRecord> = a.to_vec();
    let mut b: Vec<&GeneRecord> = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_in_insertion_order() {
        let index: NaiveIndex = [
            GeneRecord::new(500, 680, "C"),
            GeneRecord::new(100, 300, "A"),
            GeneRecord::new(250, 420, "B"),
        ]
        .into_iter()
        .collect();

        let hits: Vec<_> = index
            .overlap_search(200, 600)
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(hits, ["C", "A", "B"]);
    }

    #[test]
    fn test_same_matches_ignores_order() {
        let a = GeneRecord::new(1, 2, "a");
        let b = GeneRecord::new(3, 4, "b");
        assert!(same_matches(&[&a, &b], &[&b, &a]));
        assert!(!same_matches(&[&a], &[&b]));
        assert!(!same_matches(&[&a, &a], &[&a]));
    }
}

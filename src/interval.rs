//! Core record type for annotated gene intervals.
//!
//! Intervals are closed: `[start, end]` contains both endpoints. Coordinates
//! are signed and never validated here; a record with `start > end` is legal
//! and simply overlaps nothing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// String attributes carried alongside an interval. Never inspected by the tree.
pub type Metadata = BTreeMap<String, String>;

/// Well-known metadata keys used by the gene file format and the demo catalog.
pub mod keys {
    pub const CHROMOSOME: &str = "chromosome";
    pub const TYPE: &str = "type";
    pub const FUNCTION: &str = "function";
    pub const DISEASE: &str = "disease";
    pub const APPLICATIONS: &str = "applications";
}

/// Returns true if closed intervals `[s1, e1]` and `[s2, e2]` share a position.
#[inline]
pub fn overlaps(s1: i64, e1: i64, s2: i64, e2: i64) -> bool {
    s1 <= e2 && s2 <= e1
}

/// A labelled interval with optional metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneRecord {
    #[serde(rename = "name")]
    pub label: String,
    pub start: i64,
    pub end: i64,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl GeneRecord {
    /// Create a record with no metadata.
    #[inline]
    pub fn new(start: i64, end: i64, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            metadata: Metadata::new(),
        }
    }

    /// Create a record carrying the given metadata.
    pub fn with_metadata(start: i64, end: i64, label: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            label: label.into(),
            start,
            end,
            metadata,
        }
    }

    /// Attach one attribute, replacing any previous value for `key`.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata attribute.
    #[inline]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Chromosome attribute, if present.
    #[inline]
    pub fn chromosome(&self) -> Option<&str> {
        self.attr(keys::CHROMOSOME)
    }

    /// True when `start > end`; such a record can never overlap a query.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Check whether this record overlaps the closed query `[query_start, query_end]`.
    #[inline]
    pub fn overlaps(&self, query_start: i64, query_end: i64) -> bool {
        overlaps(self.start, self.end, query_start, query_end)
    }
}

impl fmt::Display for GeneRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}]", self.label, self.start, self.end)
    }
}

/// Positional order: start, then end, then label. Metadata breaks remaining ties.
impl Ord for GeneRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.end.cmp(&other.end))
            .then_with(|| self.label.cmp(&other.label))
            .then_with(|| self.metadata.cmp(&other.metadata))
    }
}

impl PartialOrd for GeneRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_overlap() {
        assert!(overlaps(100, 200, 200, 300)); // shared endpoint
        assert!(overlaps(100, 200, 150, 160));
        assert!(overlaps(150, 160, 100, 200));
        assert!(!overlaps(100, 200, 201, 300));
        assert!(!overlaps(201, 300, 100, 200));
    }

    #[test]
    fn test_single_point_interval() {
        let r = GeneRecord::new(50, 50, "P");
        assert!(r.overlaps(50, 50));
        assert!(r.overlaps(0, 50));
        assert!(!r.overlaps(51, 60));
    }

    #[test]
    fn test_inverted_never_overlaps() {
        let r = GeneRecord::new(10, 5, "INV");
        assert!(r.is_inverted());
        for (qs, qe) in [(0, 100), (5, 10), (7, 7), (-100, 100)] {
            assert!(!r.overlaps(qs, qe));
        }
        // Inverted query against a well-formed record
        assert!(!GeneRecord::new(5, 10, "A").overlaps(10, 5));
    }

    #[test]
    fn test_negative_coordinates() {
        let r = GeneRecord::new(-50, -10, "NEG");
        assert!(r.overlaps(-20, 0));
        assert!(!r.overlaps(-9, 0));
    }

    #[test]
    fn test_display() {
        let r = GeneRecord::new(100, 300, "BRCA1");
        assert_eq!(r.to_string(), "BRCA1 [100, 300]");
    }

    #[test]
    fn test_attrs() {
        let r = GeneRecord::new(100, 300, "BRCA1")
            .with_attr(keys::CHROMOSOME, "Chr17")
            .with_attr(keys::TYPE, "Protein Coding");
        assert_eq!(r.chromosome(), Some("Chr17"));
        assert_eq!(r.attr(keys::TYPE), Some("Protein Coding"));
        assert_eq!(r.attr(keys::DISEASE), None);
    }

    #[test]
    fn test_json_shape_is_flat() {
        let r = GeneRecord::new(100, 300, "BRCA1").with_attr(keys::CHROMOSOME, "Chr17");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["name"], "BRCA1");
        assert_eq!(json["start"], 100);
        assert_eq!(json["end"], 300);
        assert_eq!(json["chromosome"], "Chr17");

        let back: GeneRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_ordering() {
        let mut records = [
            GeneRecord::new(200, 300, "B"),
            GeneRecord::new(100, 400, "C"),
            GeneRecord::new(100, 200, "A"),
        ];
        records.sort();
        assert_eq!(records[0].label, "A");
        assert_eq!(records[1].label, "C");
        assert_eq!(records[2].label, "B");
    }
}

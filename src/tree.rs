//! Augmented interval tree for overlap queries.
//!
//! A binary search tree keyed by interval start, where every node also caches
//! `max_end`: the largest `end` found anywhere in its subtree. The cache lets
//! an overlap search skip a left subtree whose best endpoint still falls short
//! of the query start.
//!
//! The tree is never rebalanced. Inserting strictly increasing starts builds a
//! linked list down the right spine and every operation becomes linear. All
//! traversals here are iterative, so such a tree is still safe to insert into,
//! search, and drop regardless of its height.
//!
//! # Example
//!
//! ```
//! use generange::tree::IntervalTree;
//! use generange::interval::Metadata;
//!
//! let mut tree = IntervalTree::new();
//! tree.insert(100, 300, "A", Metadata::new());
//! tree.insert(250, 420, "B", Metadata::new());
//! tree.insert(500, 680, "C", Metadata::new());
//!
//! let hits = tree.overlap_search(200, 600);
//! assert_eq!(hits.len(), 3);
//! ```

use crate::interval::{GeneRecord, Metadata};

/// One stored record plus its subtree augmentation.
#[derive(Debug)]
pub struct IntervalNode {
    record: GeneRecord,
    max_end: i64,
    left: Option<Box<IntervalNode>>,
    right: Option<Box<IntervalNode>>,
}

impl IntervalNode {
    fn new(record: GeneRecord) -> Self {
        Self {
            max_end: record.end,
            record,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn record(&self) -> &GeneRecord {
        &self.record
    }

    #[inline]
    pub fn start(&self) -> i64 {
        self.record.start
    }

    #[inline]
    pub fn end(&self) -> i64 {
        self.record.end
    }

    /// Maximum `end` over this node and its entire subtree.
    #[inline]
    pub fn max_end(&self) -> i64 {
        self.max_end
    }

    #[inline]
    pub fn left(&self) -> Option<&IntervalNode> {
        self.left.as_deref()
    }

    #[inline]
    pub fn right(&self) -> Option<&IntervalNode> {
        self.right.as_deref()
    }
}

/// Unbalanced interval tree owning every inserted record.
///
/// Not internally synchronized: callers sharing a tree across threads must
/// serialize inserts and searches themselves (see [`crate::server`]).
#[derive(Debug, Default)]
pub struct IntervalTree {
    root: Option<Box<IntervalNode>>,
    len: usize,
}

impl IntervalTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Insert an interval with its label and metadata.
    ///
    /// Any integers are accepted, including `start > end`. Duplicates produce
    /// independent nodes.
    pub fn insert(&mut self, start: i64, end: i64, label: impl Into<String>, metadata: Metadata) {
        self.insert_record(GeneRecord::with_metadata(start, end, label, metadata));
    }

    /// Insert a prepared record.
    ///
    /// Descends by start key (equal starts go right) and raises `max_end` on
    /// every node along the path, since each of them gains the new record in
    /// its subtree.
    pub fn insert_record(&mut self, record: GeneRecord) {
        let (start, end) = (record.start, record.end);

        let mut slot = &mut self.root;
        while let Some(node) = slot {
            node.max_end = node.max_end.max(end);
            slot = if start < node.record.start {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *slot = Some(Box::new(IntervalNode::new(record)));
        self.len += 1;
    }

    /// Call `f` for every record overlapping `[query_start, query_end]`.
    ///
    /// Visits nodes in pre-order (node, left subtree, right subtree). A left
    /// subtree is skipped when its `max_end < query_start`. The right subtree
    /// is always visited: a larger start can still lie within the query.
    pub fn visit_overlaps<'a, F>(&'a self, query_start: i64, query_end: i64, mut f: F)
    where
        F: FnMut(&'a GeneRecord),
    {
        let mut stack: Vec<&'a IntervalNode> = Vec::new();
        stack.extend(self.root.as_deref());

        while let Some(node) = stack.pop() {
            if node.record.overlaps(query_start, query_end) {
                f(&node.record);
            }
            // Right is pushed first so the left subtree is drained before it.
            if let Some(right) = node.right.as_deref() {
                stack.push(right);
            }
            if let Some(left) = node.left.as_deref() {
                if left.max_end >= query_start {
                    stack.push(left);
                }
            }
        }
    }

    /// Find every record overlapping `[query_start, query_end]`.
    ///
    /// Results are in tree pre-order, not sorted by position. An inverted
    /// query (`query_start > query_end`) returns nothing.
    pub fn overlap_search(&self, query_start: i64, query_end: i64) -> Vec<&GeneRecord> {
        let mut results = Vec::new();
        self.visit_overlaps(query_start, query_end, |r| results.push(r));
        results
    }

    /// Count records overlapping the query without collecting them.
    pub fn count_overlaps(&self, query_start: i64, query_end: i64) -> usize {
        let mut count = 0;
        self.visit_overlaps(query_start, query_end, |_| count += 1);
        count
    }

    /// True until the first insertion.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of stored records.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Root node, for diagnostics and structural tests.
    #[inline]
    pub fn root(&self) -> Option<&IntervalNode> {
        self.root.as_deref()
    }

    /// Longest root-to-leaf path counted in nodes; 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack: Vec<(&IntervalNode, usize)> = Vec::new();
        stack.extend(self.root.as_deref().map(|n| (n, 1)));

        while let Some((node, depth)) = stack.pop() {
            best = best.max(depth);
            stack.extend(node.left.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.right.as_deref().map(|n| (n, depth + 1)));
        }
        best
    }

    /// Iterate over all records in pre-order, inverted ones included.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
        }
    }
}

impl Drop for IntervalTree {
    // Unlink nodes one at a time; recursive Box drops would overflow the
    // stack on a degenerate tree.
    fn drop(&mut self) {
        let mut pending: Vec<Box<IntervalNode>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl FromIterator<GeneRecord> for IntervalTree {
    fn from_iter<I: IntoIterator<Item = GeneRecord>>(iter: I) -> Self {
        let mut tree = IntervalTree::new();
        tree.extend(iter);
        tree
    }
}

impl Extend<GeneRecord> for IntervalTree {
    fn extend<I: IntoIterator<Item = GeneRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert_record(record);
        }
    }
}

impl<'a> IntoIterator for &'a IntervalTree {
    type Item = &'a GeneRecord;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over stored records.
pub struct Iter<'a> {
    stack: Vec<&'a IntervalNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a GeneRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.right.as_deref());
        self.stack.extend(node.left.as_deref());
        Some(&node.record)
    }
}

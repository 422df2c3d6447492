//! Property tests for the interval tree.
//!
//! Every query is checked against a brute-force linear scan over the same
//! records, for several insertion orders, so that pruning can never silently
//! drop a match.

use generange::interval::{overlaps, GeneRecord, Metadata};
use generange::naive::{same_matches, NaiveIndex};
use generange::tree::{IntervalNode, IntervalTree};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_records(rng: &mut SmallRng, n: usize, span: i64, max_len: i64) -> Vec<GeneRecord> {
    (0..n)
        .map(|i| {
            let start = rng.gen_range(-span..span);
            // Occasionally inverted, occasionally single-point
            let end = match rng.gen_range(0..10) {
                0 => start - rng.gen_range(1..=max_len),
                1 => start,
                _ => start + rng.gen_range(1..=max_len),
            };
            GeneRecord::new(start, end, format!("R{}", i))
        })
        .collect()
}

fn random_query(rng: &mut SmallRng, span: i64) -> (i64, i64) {
    let a = rng.gen_range(-span - 50..span + 50);
    let b = rng.gen_range(-span - 50..span + 50);
    // Mostly ordered queries, some inverted
    if rng.gen_bool(0.9) {
        (a.min(b), a.max(b))
    } else {
        (a.max(b), a.min(b))
    }
}

/// Recomputes max_end bottom-up and asserts the cached value matches.
fn assert_max_end(node: Option<&IntervalNode>) -> i64 {
    let Some(node) = node else {
        return i64::MIN;
    };
    let expected = node
        .end()
        .max(assert_max_end(node.left()))
        .max(assert_max_end(node.right()));
    assert_eq!(node.max_end(), expected, "max_end mismatch at {}", node.record());
    expected
}

/// Asserts the BST ordering: left starts are smaller, right starts are not.
fn assert_ordering(node: Option<&IntervalNode>, lower: Option<i64>, upper: Option<i64>) {
    let Some(node) = node else {
        return;
    };
    if let Some(lo) = lower {
        assert!(node.start() >= lo);
    }
    if let Some(hi) = upper {
        assert!(node.start() < hi);
    }
    assert_ordering(node.left(), lower, Some(node.start()));
    assert_ordering(node.right(), Some(node.start()), upper);
}

fn shape(node: Option<&IntervalNode>, out: &mut String) {
    match node {
        None => out.push('.'),
        Some(n) => {
            out.push('(');
            out.push_str(&n.record().label);
            shape(n.left(), out);
            shape(n.right(), out);
            out.push(')');
        }
    }
}

fn labels(records: &[&GeneRecord]) -> Vec<String> {
    let mut v: Vec<String> = records.iter().map(|r| r.label.clone()).collect();
    v.sort();
    v
}

#[test]
fn test_matches_brute_force_random_order() {
    let mut rng = SmallRng::seed_from_u64(7);
    for round in 0..20 {
        let records = random_records(&mut rng, 300, 1_000, 120);
        let tree: IntervalTree = records.iter().cloned().collect();
        let naive: NaiveIndex = records.into_iter().collect();

        for _ in 0..200 {
            let (qs, qe) = random_query(&mut rng, 1_000);
            let got = tree.overlap_search(qs, qe);
            let want = naive.overlap_search(qs, qe);
            assert!(
                same_matches(&got, &want),
                "round {} query [{}, {}]: tree {:?} vs scan {:?}",
                round,
                qs,
                qe,
                labels(&got),
                labels(&want)
            );
        }
    }
}

#[test]
fn test_matches_brute_force_sorted_and_reverse_order() {
    let mut rng = SmallRng::seed_from_u64(11);
    let mut records = random_records(&mut rng, 400, 2_000, 300);
    records.sort();

    let ascending: IntervalTree = records.iter().cloned().collect();
    let descending: IntervalTree = records.iter().rev().cloned().collect();
    let naive: NaiveIndex = records.into_iter().collect();

    assert_eq!(ascending.height(), ascending.len());

    for _ in 0..300 {
        let (qs, qe) = random_query(&mut rng, 2_000);
        let want = naive.overlap_search(qs, qe);
        assert!(same_matches(&ascending.overlap_search(qs, qe), &want));
        assert!(same_matches(&descending.overlap_search(qs, qe), &want));
    }
}

#[test]
fn test_membership_matches_overlap_predicate() {
    let mut rng = SmallRng::seed_from_u64(3);
    let records = random_records(&mut rng, 200, 500, 80);
    let tree: IntervalTree = records.iter().cloned().collect();

    for _ in 0..100 {
        let (qs, qe) = random_query(&mut rng, 500);
        let hits = tree.overlap_search(qs, qe);
        for r in tree.iter() {
            let expected = overlaps(r.start, r.end, qs, qe);
            let found = hits.iter().any(|h| std::ptr::eq(*h, r));
            assert_eq!(expected, found, "{} vs query [{}, {}]", r, qs, qe);
        }
    }
}

#[test]
fn test_invariants_after_every_insert() {
    let mut rng = SmallRng::seed_from_u64(19);
    let mut tree = IntervalTree::new();
    for record in random_records(&mut rng, 250, 400, 100) {
        tree.insert_record(record);
        assert_max_end(tree.root());
        assert_ordering(tree.root(), None, None);
    }
    assert_eq!(tree.len(), 250);
    assert_eq!(tree.iter().count(), 250);
}

#[test]
fn test_insertion_is_deterministic() {
    let mut rng = SmallRng::seed_from_u64(23);
    let records = random_records(&mut rng, 150, 100, 20);

    let a: IntervalTree = records.iter().cloned().collect();
    let b: IntervalTree = records.into_iter().collect();

    let (mut sa, mut sb) = (String::new(), String::new());
    shape(a.root(), &mut sa);
    shape(b.root(), &mut sb);
    assert_eq!(sa, sb);
}

#[test]
fn test_empty_store() {
    let tree = IntervalTree::new();
    assert!(tree.is_empty());
    assert!(tree.overlap_search(i64::MIN, i64::MAX).is_empty());
}

// Concrete scenarios

fn three_genes() -> IntervalTree {
    let mut tree = IntervalTree::new();
    tree.insert(100, 300, "A", Metadata::new());
    tree.insert(250, 420, "B", Metadata::new());
    tree.insert(500, 680, "C", Metadata::new());
    tree
}

#[test]
fn test_scenario_all_three_overlap() {
    let tree = three_genes();
    assert_eq!(labels(&tree.overlap_search(200, 600)), ["A", "B", "C"]);
}

#[test]
fn test_scenario_query_before_everything() {
    assert!(three_genes().overlap_search(0, 50).is_empty());
}

#[test]
fn test_scenario_gap_no_false_positives() {
    let mut tree = IntervalTree::new();
    tree.insert(100, 300, "A", Metadata::new());
    tree.insert(700, 900, "D", Metadata::new());
    assert!(tree.overlap_search(400, 600).is_empty());
}

#[test]
fn test_scenario_duplicate_start() {
    let mut tree = IntervalTree::new();
    tree.insert(100, 200, "X", Metadata::new());
    tree.insert(100, 150, "Y", Metadata::new());
    assert_eq!(labels(&tree.overlap_search(120, 140)), ["X", "Y"]);
    assert_eq!(tree.root().unwrap().right().unwrap().record().label, "Y");
}

#[test]
fn test_scenario_inverted_query() {
    let mut tree = IntervalTree::new();
    tree.insert(5, 10, "A", Metadata::new());
    assert!(tree.overlap_search(10, 5).is_empty());
}

#[test]
fn test_metadata_is_carried_untouched() {
    let mut meta = Metadata::new();
    meta.insert("chromosome".to_string(), "Chr17".to_string());
    meta.insert("note".to_string(), "anything at all".to_string());

    let mut tree = IntervalTree::new();
    tree.insert(1, 2, "M", meta.clone());
    assert_eq!(tree.overlap_search(1, 1)[0].metadata, meta);
}

#[test]
fn test_deep_chain_does_not_overflow() {
    const N: i64 = 10_000;
    let mut tree = IntervalTree::new();
    for i in 0..N {
        tree.insert(i, i + 2, "C", Metadata::new());
    }
    assert_eq!(tree.height(), N as usize);
    assert_eq!(tree.count_overlaps(N - 1, N + 10), 3);
    assert_eq!(tree.root().unwrap().max_end(), N + 1);
    drop(tree);
}

//! Partition reconciliation.
//!
//! A pass walks the sets in order and folds each one into the first earlier
//! result it overlaps (by key or by product). One pass cannot close a merge
//! chain whose connecting set arrives after both ends were placed, so the
//! default mode repeats passes until a pass absorbs nothing. At that point no
//! two sets share a key or a product.

use serde::{Deserialize, Serialize};

use crate::model::KeySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Repeat passes until the sets are pairwise disjoint.
    #[default]
    FixedPoint,
    /// Exactly one pass; chains introduced out of order may stay split.
    SinglePass,
}

impl std::fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedPoint => write!(f, "fixed_point"),
            Self::SinglePass => write!(f, "single_pass"),
        }
    }
}

/// Result of a single left-to-right pass.
#[derive(Debug)]
pub struct PassOutcome {
    pub sets: Vec<KeySet>,
    /// Number of input sets folded into an earlier result.
    pub absorbed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReconcileReport {
    pub passes: usize,
    pub absorbed: usize,
}

/// One absorption sweep. Only the first overlapping result absorbs a set, and
/// results are never merged with each other within the same pass.
pub fn reconcile_pass(sets: Vec<KeySet>) -> PassOutcome {
    let mut result: Vec<KeySet> = Vec::with_capacity(sets.len());
    let mut absorbed = 0;

    for mut set in sets {
        set.normalize();
        match result.iter_mut().find(|r| set.overlaps(r)) {
            Some(target) => {
                target.absorb(set);
                absorbed += 1;
            }
            None => result.push(set),
        }
    }

    PassOutcome {
        sets: result,
        absorbed,
    }
}

/// Run passes per `mode`. Always runs at least one pass so every set comes
/// out normalized.
pub fn reconcile_to(sets: Vec<KeySet>, mode: ReconcileMode) -> (Vec<KeySet>, ReconcileReport) {
    let mut report = ReconcileReport::default();
    let mut current = sets;

    loop {
        let pass = reconcile_pass(current);
        report.passes += 1;
        report.absorbed += pass.absorbed;
        current = pass.sets;

        if pass.absorbed == 0 || mode == ReconcileMode::SinglePass {
            break;
        }
    }

    // Absorbed products were appended unsorted.
    if report.absorbed > 0 {
        for set in &mut current {
            set.products.sort();
        }
    }

    (current, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(products: &[&str], keys: &[&str]) -> KeySet {
        KeySet {
            products: products.iter().map(|s| s.to_string()).collect(),
            keys: keys.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn disjoint_sets_pass_through() {
        let input = vec![set(&["B"], &["k2"]), set(&["A"], &["k1"])];
        let (out, report) = reconcile_to(input.clone(), ReconcileMode::FixedPoint);
        assert_eq!(out, input);
        assert_eq!(report, ReconcileReport { passes: 1, absorbed: 0 });
    }

    #[test]
    fn key_overlap_merges() {
        let input = vec![set(&["B"], &["k1"]), set(&["A"], &["K1", "k2"])];
        let (out, _) = reconcile_to(input, ReconcileMode::FixedPoint);
        assert_eq!(out, vec![set(&["A", "B"], &["k1", "k2"])]);
    }

    #[test]
    fn product_overlap_merges_case_insensitively() {
        let input = vec![set(&["Office"], &["k1"]), set(&["OFFICE"], &["k2"])];
        let (out, _) = reconcile_to(input, ReconcileMode::FixedPoint);
        assert_eq!(out, vec![set(&["Office"], &["k1", "k2"])]);
    }

    #[test]
    fn only_first_match_absorbs() {
        // C overlaps both A (k1) and B (k2); a single pass folds it into A only.
        let input = vec![
            set(&["A"], &["k1"]),
            set(&["B"], &["k2"]),
            set(&["C"], &["k1", "k2"]),
        ];
        let pass = reconcile_pass(input);
        assert_eq!(pass.absorbed, 1);
        assert_eq!(pass.sets.len(), 2);
        assert_eq!(pass.sets[0].products, vec!["A", "C"]);
        assert_eq!(pass.sets[1].products, vec!["B"]);
    }

    #[test]
    fn chain_needs_second_pass() {
        let input = vec![
            set(&["A"], &["k1"]),
            set(&["B"], &["k2"]),
            set(&["C"], &["k1", "k2"]),
        ];

        let (single, report) = reconcile_to(input.clone(), ReconcileMode::SinglePass);
        assert_eq!(single.len(), 2);
        assert_eq!(report.passes, 1);

        let (fixed, report) = reconcile_to(input, ReconcileMode::FixedPoint);
        assert_eq!(fixed, vec![set(&["A", "B", "C"], &["k1", "k2"])]);
        assert_eq!(report.passes, 3);
        assert_eq!(report.absorbed, 2);
    }

    #[test]
    fn normalizes_each_set() {
        let input = vec![set(&["Z", "A", "a"], &["k1", "K1"])];
        let (out, _) = reconcile_to(input, ReconcileMode::SinglePass);
        assert_eq!(out, vec![set(&["A", "Z"], &["k1"])]);
    }

    #[test]
    fn empty_input() {
        let (out, report) = reconcile_to(Vec::new(), ReconcileMode::FixedPoint);
        assert!(out.is_empty());
        assert_eq!(report.passes, 1);
    }
}

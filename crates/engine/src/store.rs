use crate::model::KeySet;
use crate::reconcile::{reconcile_to, ReconcileMode, ReconcileReport};
use crate::record::KeyRecord;

/// What `KeyStore::ingest` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Some set already holds both the product and the key.
    Duplicate,
    /// The key was appended to the set at this index, matched by product.
    Extended { set: usize },
    /// A new set was appended at this index.
    Created { set: usize },
}

/// Ordered collection of key sets.
///
/// Ingestion only ever extends one set or appends a new one; merging sets
/// that turn out to overlap is left to [`KeyStore::reconcile`].
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    sets: Vec<KeySet>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sets(sets: Vec<KeySet>) -> Self {
        Self { sets }
    }

    pub fn ingest(&mut self, record: &KeyRecord) -> IngestOutcome {
        debug_assert!(
            !record.product.trim().is_empty(),
            "product label must be non-empty"
        );

        if self
            .sets
            .iter()
            .any(|s| s.has_key(&record.key) && s.has_product(&record.product))
        {
            return IngestOutcome::Duplicate;
        }

        if let Some(idx) = self.sets.iter().position(|s| s.has_product(&record.product)) {
            // The pair check above rules out this set already holding the key.
            self.sets[idx].keys.push(record.key.clone());
            return IngestOutcome::Extended { set: idx };
        }

        self.sets.push(KeySet::new(record.product.clone(), record.key.clone()));
        IngestOutcome::Created {
            set: self.sets.len() - 1,
        }
    }

    /// Re-merge the store against itself; see [`crate::reconcile`].
    pub fn reconcile(&mut self, mode: ReconcileMode) -> ReconcileReport {
        let sets = std::mem::take(&mut self.sets);
        let (merged, report) = reconcile_to(sets, mode);
        self.sets = merged;
        report
    }

    pub fn sets(&self) -> &[KeySet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn into_sets(self) -> Vec<KeySet> {
        self.sets
    }
}

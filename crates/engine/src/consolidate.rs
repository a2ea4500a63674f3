use serde::Serialize;

use crate::baseline::Snapshot;
use crate::model::{KeySet, Summary};
use crate::reconcile::{ReconcileMode, ReconcileReport};
use crate::record::{AuditLine, AuditLog, KeyFilter, RawRecord, RecordSource, TabularRow};
use crate::store::{IngestOutcome, KeyStore};

/// Tally of what happened to a batch of raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IngestStats {
    pub records: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub extended: usize,
    pub created: usize,
}

impl IngestStats {
    fn count(&mut self, outcome: Option<IngestOutcome>) {
        self.records += 1;
        match outcome {
            None => self.rejected += 1,
            Some(IngestOutcome::Duplicate) => self.duplicates += 1,
            Some(IngestOutcome::Extended { .. }) => self.extended += 1,
            Some(IngestOutcome::Created { .. }) => self.created += 1,
        }
    }

    pub fn merge(&mut self, other: IngestStats) {
        self.records += other.records;
        self.rejected += other.rejected;
        self.duplicates += other.duplicates;
        self.extended += other.extended;
        self.created += other.created;
    }
}

/// Final output handed to the exporters and the reporter.
#[derive(Debug, Clone)]
pub struct Consolidated {
    pub key_sets: Vec<KeySet>,
    pub audit_lines: Vec<AuditLine>,
    pub summary: Summary,
    pub reconcile: ReconcileReport,
}

/// Owns everything one run accumulates: the store, the audit log and the
/// baseline. Passed explicitly through ingestion, reconciliation and reporting.
#[derive(Debug)]
pub struct Consolidator {
    store: KeyStore,
    audit: AuditLog,
    filter: KeyFilter,
    mode: ReconcileMode,
    baseline: Option<Snapshot>,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self::new(KeyFilter::default(), ReconcileMode::default())
    }
}

impl Consolidator {
    pub fn new(filter: KeyFilter, mode: ReconcileMode) -> Self {
        Self {
            store: KeyStore::new(),
            audit: AuditLog::new(),
            filter,
            mode,
            baseline: None,
        }
    }

    /// Normalize and ingest one raw record. `None` means the key was rejected.
    ///
    /// Tabular rows are always kept in the audit log since the tabular file is
    /// rewritten from it; markup rows only when their key is accepted.
    pub fn ingest(&mut self, raw: RawRecord) -> Option<IngestOutcome> {
        let record = raw.normalize(&self.filter);
        if record.is_some() || raw.source == RecordSource::Tabular {
            self.audit.record(raw.audit_line());
        }
        record.map(|r| self.store.ingest(&r))
    }

    pub fn ingest_all<I>(&mut self, records: I) -> IngestStats
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut stats = IngestStats::default();
        for raw in records {
            let outcome = self.ingest(raw);
            stats.count(outcome);
        }
        stats
    }

    /// Ingest one tabular row. Its line is always audited verbatim; only a row
    /// with an accepted key reaches the store.
    pub fn ingest_row(&mut self, row: TabularRow) -> Option<IngestOutcome> {
        self.audit.record(row.line);
        let record = row.record?.normalize(&self.filter)?;
        Some(self.store.ingest(&record))
    }

    pub fn ingest_rows<I>(&mut self, rows: I) -> IngestStats
    where
        I: IntoIterator<Item = TabularRow>,
    {
        let mut stats = IngestStats::default();
        for row in rows {
            let outcome = self.ingest_row(row);
            stats.count(outcome);
        }
        stats
    }

    /// Reconcile what is known so far and remember its counts as the baseline.
    pub fn mark_baseline(&mut self) -> Snapshot {
        self.store.reconcile(self.mode);
        let snapshot = Snapshot::of(&self.store);
        self.baseline = Some(snapshot);
        snapshot
    }

    pub fn baseline(&self) -> Option<Snapshot> {
        self.baseline
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Terminal reconciliation plus summary. Without a baseline every key and
    /// product counts as new.
    pub fn finish(mut self) -> Consolidated {
        let reconcile = self.store.reconcile(self.mode);
        let totals = Snapshot::of(&self.store);
        let delta = totals.delta_since(&self.baseline.unwrap_or_default());

        let summary = Summary {
            total_keys: totals.keys,
            total_products: totals.products,
            new_keys: delta.new_keys,
            new_products: delta.new_products,
            key_sets: self.store.len(),
        };

        Consolidated {
            key_sets: self.store.into_sets(),
            audit_lines: self.audit.into_lines(),
            summary,
            reconcile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: RecordSource, name: &str, key: &str, key_type: &str) -> RawRecord {
        RawRecord {
            source,
            name: name.into(),
            key: key.into(),
            key_type: key_type.into(),
            claimed_date: String::new(),
            id: String::new(),
            note: String::new(),
        }
    }

    #[test]
    fn rejected_markup_keys_leave_no_audit_line() {
        let mut c = Consolidator::default();
        assert!(c.ingest(raw(RecordSource::Markup, "Office", "<none>", "Retail")).is_none());
        assert!(c.audit().is_empty());
        assert!(c.store().is_empty());
    }

    #[test]
    fn rejected_tabular_rows_are_still_audited() {
        let mut c = Consolidator::default();
        assert!(c.ingest(raw(RecordSource::Tabular, "Office", "", "Retail")).is_none());
        assert_eq!(c.audit().len(), 1);
    }

    #[test]
    fn stats_tally_outcomes() {
        let mut c = Consolidator::default();
        let stats = c.ingest_all(vec![
            raw(RecordSource::Markup, "Office", "K1", "Retail"),
            raw(RecordSource::Markup, "Office", "K2", "Retail"),
            raw(RecordSource::Markup, "Office", "K2", "Retail"),
            raw(RecordSource::Markup, "Visio", "product key", "Retail"),
        ]);
        assert_eq!(
            stats,
            IngestStats {
                records: 4,
                rejected: 1,
                duplicates: 1,
                extended: 1,
                created: 1,
            }
        );
    }

    #[test]
    fn baseline_delta_reported_on_finish() {
        let mut c = Consolidator::default();
        c.ingest_all(vec![
            raw(RecordSource::Tabular, "Office", "K1", "Retail"),
            raw(RecordSource::Tabular, "Office", "K2", "Retail"),
        ]);
        assert_eq!(c.mark_baseline(), Snapshot { keys: 2, products: 1 });

        c.ingest_all(vec![
            raw(RecordSource::Markup, "Visio", "K3", "Retail"),
            raw(RecordSource::Markup, "Visio", "K4", "Retail"),
            raw(RecordSource::Markup, "Project", "K5", "MAK"),
        ]);
        let done = c.finish();
        assert_eq!(done.summary.total_keys, 5);
        assert_eq!(done.summary.total_products, 3);
        assert_eq!(done.summary.new_keys, 3);
        assert_eq!(done.summary.new_products, 2);
        assert_eq!(done.summary.key_sets, 3);
        assert_eq!(done.audit_lines.len(), 5);
    }

    #[test]
    fn tabular_rows_are_audited_verbatim() {
        let mut c = Consolidator::default();
        let stats = c.ingest_rows(vec![
            TabularRow::from_fields(vec!["orphan".into()]),
            TabularRow::from_fields(
                ["Office", "K1", "Retail", "", "1", "", "extra"].iter().map(|s| s.to_string()).collect(),
            ),
        ]);
        assert_eq!(stats.records, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.created, 1);

        let done = c.finish();
        let lines: Vec<_> = done.audit_lines.iter().map(AuditLine::as_str).collect();
        assert_eq!(lines, vec!["Office,K1,Retail,,1,,extra", "orphan"]);
        assert_eq!(done.summary.total_keys, 1);
    }

    #[test]
    fn no_baseline_means_everything_is_new() {
        let mut c = Consolidator::default();
        c.ingest(raw(RecordSource::Markup, "Office", "K1", "Retail"));
        let done = c.finish();
        assert_eq!(done.summary.new_keys, 1);
        assert_eq!(done.summary.new_products, 1);
    }
}

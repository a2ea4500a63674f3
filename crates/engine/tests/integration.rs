use keyset_engine::fold;
use keyset_engine::model::KeySet;
use keyset_engine::reconcile::ReconcileMode;
use keyset_engine::record::{KeyRecord, RawRecord, RecordSource, TabularRow};
use keyset_engine::store::KeyStore;
use keyset_engine::{Consolidator, KeyFilter, Snapshot};

fn ingest_all(store: &mut KeyStore, records: &[(&str, &str)]) {
    for (product, key) in records {
        store.ingest(&KeyRecord::new(*product, *key));
    }
}

fn assert_partition(sets: &[KeySet]) {
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i + 1..] {
            assert!(!fold::overlaps(&a.keys, &b.keys), "sets share a key: {a:?} / {b:?}");
            assert!(
                !fold::overlaps(&a.products, &b.products),
                "sets share a product: {a:?} / {b:?}"
            );
        }
    }
}

fn markup(name: &str, key: &str, key_type: &str) -> RawRecord {
    RawRecord {
        source: RecordSource::Markup,
        name: name.into(),
        key: key.into(),
        key_type: key_type.into(),
        claimed_date: "2014-01-02".into(),
        id: "1".into(),
        note: String::new(),
    }
}

// -------------------------------------------------------------------------
// Store + reconcile
// -------------------------------------------------------------------------

#[test]
fn chain_merge_reaches_single_set() {
    let mut store = KeyStore::new();
    ingest_all(&mut store, &[("A", "k1"), ("B", "k1"), ("B", "k2")]);

    store.reconcile(ReconcileMode::FixedPoint);

    assert_eq!(
        store.sets(),
        &[KeySet {
            products: vec!["A".into(), "B".into()],
            keys: vec!["k1".into(), "k2".into()],
        }]
    );
}

#[test]
fn reconcile_is_idempotent() {
    let mut store = KeyStore::new();
    ingest_all(
        &mut store,
        &[("A", "k1"), ("B", "k2"), ("C", "k3"), ("D", "k1"), ("D", "k2"), ("E", "k9")],
    );

    store.reconcile(ReconcileMode::FixedPoint);
    let once = store.sets().to_vec();
    let report = store.reconcile(ReconcileMode::FixedPoint);

    assert_eq!(store.sets(), once.as_slice());
    assert_eq!(report.absorbed, 0);
    assert_eq!(report.passes, 1);
    assert_partition(store.sets());
}

#[test]
fn out_of_order_chain_resolved_only_by_fixed_point() {
    // A and B are placed first; C links them afterwards.
    let records = [("A", "k1"), ("B", "k2"), ("C", "k1"), ("C", "k2")];

    let mut single = KeyStore::new();
    ingest_all(&mut single, &records);
    let report = single.reconcile(ReconcileMode::SinglePass);
    assert_eq!(report.passes, 1);
    assert_eq!(single.len(), 2);

    let mut fixed = KeyStore::new();
    ingest_all(&mut fixed, &records);
    fixed.reconcile(ReconcileMode::FixedPoint);
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed.sets()[0].products, vec!["A", "B", "C"]);
}

#[test]
fn case_insensitive_match_case_preserving_storage() {
    let mut store = KeyStore::new();
    ingest_all(&mut store, &[("Widget", "ABC-1"), ("widget", "ABC-1")]);
    let before = Snapshot::of(&store);
    store.reconcile(ReconcileMode::FixedPoint);

    assert_eq!(before, Snapshot { keys: 1, products: 1 });
    assert_eq!(store.sets(), &[KeySet::new("Widget", "ABC-1")]);
}

#[test]
fn no_duplicates_within_any_set() {
    let mut store = KeyStore::from_sets(vec![
        KeySet {
            products: vec!["P".into(), "p".into()],
            keys: vec!["k".into(), "K".into()],
        },
        KeySet {
            products: vec!["Q".into()],
            keys: vec!["K".into(), "x".into()],
        },
    ]);
    store.reconcile(ReconcileMode::FixedPoint);

    for set in store.sets() {
        let mut keys = set.keys.clone();
        fold::dedup(&mut keys);
        assert_eq!(keys, set.keys);
        let mut products = set.products.clone();
        fold::dedup(&mut products);
        assert_eq!(products, set.products);
    }
    assert_eq!(store.sets()[0].products, vec!["P", "Q"]);
    assert_eq!(store.sets()[0].keys, vec!["k", "x"]);
}

// -------------------------------------------------------------------------
// Consolidator end to end
// -------------------------------------------------------------------------

#[test]
fn rerun_against_known_data_is_stable() {
    let first_run = vec![
        markup("Office Professional Plus 2010", "AAAAA-11111", "Retail"),
        markup("Office Professional Plus 2010", "AAAAA-22222", "Retail"),
        markup("Visio Premium 2010", "AAAAA-22222", "Retail"),
        markup("Windows 7 Ultimate", "BBBBB-33333", "MAK"),
    ];

    let mut c = Consolidator::new(KeyFilter::default(), ReconcileMode::FixedPoint);
    c.ingest_all(first_run.clone());
    let first = c.finish();

    // Second run: the tabular export is read back as known data, then the
    // same markup again.
    let mut c = Consolidator::default();
    c.ingest_rows(
        first
            .audit_lines
            .iter()
            .map(|line| TabularRow::from_fields(line.fields().to_vec())),
    );
    c.mark_baseline();
    c.ingest_all(first_run);
    let second = c.finish();

    assert_eq!(second.summary.new_keys, 0);
    assert_eq!(second.summary.new_products, 0);
    assert_eq!(second.summary.key_sets, first.summary.key_sets);
    assert_eq!(second.audit_lines, first.audit_lines);
    assert_partition(&second.key_sets);
}

//! `keyset-engine`: product/license-key consolidation engine.
//!
//! Pure engine crate: receives normalized records, returns disjoint key sets.
//! No CLI or IO dependencies.

pub mod baseline;
pub mod consolidate;
pub mod fold;
pub mod model;
pub mod reconcile;
pub mod record;
pub mod store;

pub use baseline::{Delta, Snapshot};
pub use consolidate::{Consolidated, Consolidator, IngestStats};
pub use model::{KeySet, Summary};
pub use reconcile::{ReconcileMode, ReconcileReport};
pub use record::{AuditLine, AuditLog, KeyFilter, KeyRecord, RawRecord, RecordSource, TabularRow};
pub use store::{IngestOutcome, KeyStore};

use std::collections::BTreeSet;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Where a raw record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// A markup key export (one `Key` element).
    Markup,
    /// A row of the flat tabular file.
    Tabular,
}

/// One discovered key with its metadata, as produced by either reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub source: RecordSource,
    pub name: String,
    pub key: String,
    pub key_type: String,
    pub claimed_date: String,
    pub id: String,
    pub note: String,
}

impl RawRecord {
    /// Canonical `(product label, key)` pair, or `None` when the key is not usable.
    pub fn normalize(&self, filter: &KeyFilter) -> Option<KeyRecord> {
        let key = self.key.trim();
        if !filter.accepts(key) {
            return None;
        }
        Some(KeyRecord {
            product: format!("{}; {}", self.name.trim(), self.key_type.trim()),
            key: key.to_string(),
        })
    }

    pub fn audit_line(&self) -> AuditLine {
        AuditLine::new(vec![
            self.name.clone(),
            self.key.clone(),
            self.key_type.clone(),
            self.claimed_date.clone(),
            self.id.clone(),
            self.note.clone(),
        ])
    }
}

/// One data row of the tabular file.
///
/// The row always survives as an audit line, exactly as read (short rows and
/// columns past `note` included). It only yields a record when it has at
/// least a name and a key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    pub line: AuditLine,
    pub record: Option<RawRecord>,
}

impl TabularRow {
    /// Columns are positional: name, key, type, ClaimedDate, id, note.
    /// Missing trailing columns read as empty.
    pub fn from_fields(fields: Vec<String>) -> Self {
        let record = (fields.len() >= 2).then(|| {
            let field = |i: usize| fields.get(i).cloned().unwrap_or_default();
            RawRecord {
                source: RecordSource::Tabular,
                name: field(0),
                key: field(1),
                key_type: field(2),
                claimed_date: field(3),
                id: field(4),
                note: field(5),
            }
        });
        Self {
            line: AuditLine::new(fields),
            record,
        }
    }
}

/// Normalized record accepted by the cluster store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub product: String,
    pub key: String,
}

impl KeyRecord {
    pub fn new(product: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            key: key.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Key filter
// ---------------------------------------------------------------------------

/// Rejects empty keys and placeholder text such as `<enter key>`.
#[derive(Debug, Clone)]
pub struct KeyFilter {
    pub rejected_fragments: Vec<String>,
}

impl Default for KeyFilter {
    fn default() -> Self {
        Self {
            rejected_fragments: vec!["<".into(), "key".into()],
        }
    }
}

impl KeyFilter {
    pub fn new(rejected_fragments: Vec<String>) -> Self {
        Self { rejected_fragments }
    }

    /// `key` is expected to be trimmed already.
    pub fn accepts(&self, key: &str) -> bool {
        !key.is_empty()
            && !self
                .rejected_fragments
                .iter()
                .any(|fragment| !fragment.is_empty() && key.contains(fragment.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

pub const AUDIT_HEADER: [&str; 6] = ["name", "key", "type", "ClaimedDate", "id", "note"];

/// Flat per-record line preserving the original metadata, independent of clustering.
///
/// Ordered and deduplicated by the comma-joined text, byte-wise; the field
/// list only breaks ties between lines that join to the same text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AuditLine {
    text: String,
    fields: Vec<String>,
}

impl AuditLine {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            text: fields.join(","),
            fields,
        }
    }

    /// Fields in `AUDIT_HEADER` order, plus any extra columns of a tabular row.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Deduplicated audit lines, iterated in ascending order.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    lines: BTreeSet<AuditLine>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the line was not already present.
    pub fn record(&mut self, line: AuditLine) -> bool {
        self.lines.insert(line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditLine> {
        self.lines.iter()
    }

    pub fn into_lines(self) -> Vec<AuditLine> {
        self.lines.into_iter().collect()
    }
}

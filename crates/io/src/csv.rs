// Tabular key list import/export
//
// Layout: header `name,key,type,ClaimedDate,id,note`, one key per row.
// Columns are read by position so a renamed header still loads. Every data
// row is kept for the rewrite, including short rows and extra columns.

use std::path::Path;

use keyset_engine::record::{AuditLine, TabularRow, AUDIT_HEADER};

use crate::decode::read_text;
use crate::error::IoError;

/// Read the tabular key list. Rows with fewer than two fields carry no
/// record but still come back as rows.
pub fn read_tabular_file(path: &Path) -> Result<Vec<TabularRow>, IoError> {
    let content = read_text(path)?;
    if content.trim().is_empty() {
        return Err(IoError::Empty { path: path.to_path_buf() });
    }
    let rows = parse_tabular(&content, path)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "parsed tabular file");
    Ok(rows)
}

pub fn parse_tabular(content: &str, path: &Path) -> Result<Vec<TabularRow>, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| IoError::Csv {
            path: path.to_path_buf(),
            // +2: one for the header, one for 1-based line numbers
            message: format!("line {}: {e}", idx + 2),
        })?;
        rows.push(TabularRow::from_fields(record.iter().map(String::from).collect()));
    }

    Ok(rows)
}

/// Write the header followed by `lines` in the order given. Lines keep their
/// own width, so a short or wide row is written back as it was read.
pub fn write_audit_file(path: &Path, lines: &[AuditLine]) -> Result<(), IoError> {
    let csv_err = |e: csv::Error| IoError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    writer.write_record(AUDIT_HEADER).map_err(csv_err)?;
    for line in lines {
        writer.write_record(line.fields()).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| IoError::io(path, e))?;

    Ok(())
}

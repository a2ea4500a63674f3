//! `keyset scan`: parse markup key files without consolidating.

use std::path::PathBuf;

use keyset_engine::KeyFilter;
use serde::Serialize;

use crate::exit_codes::EXIT_NO_INPUT;
use crate::{load_settings, resolve_folder, CliError};

#[derive(Debug, Serialize)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub products: usize,
    pub accepted: usize,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn cmd_scan(folder: Option<PathBuf>, config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let folder = resolve_folder(folder)?;
    let (settings, _) = load_settings(config.as_deref(), &folder)?;
    let filter = settings.key_filter();

    let extension = settings.markup_extension();
    let files = keyset_io::discover::markup_files(&folder, &extension)
        .map_err(|e| CliError::io(e.to_string()))?;
    if files.is_empty() {
        return Err(CliError::new(
            EXIT_NO_INPUT,
            format!("{} does not contain any {} files", folder.display(), extension),
        ));
    }

    let entries: Vec<ScanEntry> = files.into_iter().map(|path| scan_file(path, &filter)).collect();

    if json {
        let json_str = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for entry in &entries {
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match entry.error {
            Some(ref err) => eprintln!("{name}: skipped ({err})"),
            None => eprintln!(
                "{name}: {} products, {} keys accepted, {} rejected",
                entry.products, entry.accepted, entry.rejected
            ),
        }
    }
    Ok(())
}

fn scan_file(path: PathBuf, filter: &KeyFilter) -> ScanEntry {
    match keyset_io::xml::read_key_file(&path) {
        Ok(records) => {
            let mut products: Vec<String> = Vec::new();
            let mut accepted = 0;
            for record in records.iter().filter_map(|r| r.normalize(filter)) {
                keyset_engine::fold::push_unique(&mut products, &record.product);
                accepted += 1;
            }
            ScanEntry {
                path,
                products: products.len(),
                accepted,
                rejected: records.len() - accepted,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "skipping file: {e}");
            ScanEntry { path, products: 0, accepted: 0, rejected: 0, error: Some(e.to_string()) }
        }
    }
}

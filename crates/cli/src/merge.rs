//! `keyset merge`: consolidate a folder of key exports.
//!
//! Order: tabular file, baseline, markup files, terminal reconcile, export, report.

use std::path::{Path, PathBuf};

use keyset_engine::{Consolidator, IngestStats, ReconcileMode, ReconcileReport, Snapshot, Summary};
use serde::Serialize;

use crate::exit_codes::{EXIT_NO_INPUT, EXIT_NO_KEYS};
use crate::{load_settings, resolve_folder, CliError};

pub struct MergeOptions {
    pub folder: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub dry_run: bool,
    pub single_pass: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Read,
    Missing,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct Outputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabular: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct MergeReport {
    pub folder: PathBuf,
    pub settings: String,
    pub mode: ReconcileMode,
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub ingest: IngestStats,
    pub baseline: Snapshot,
    pub reconcile: ReconcileReport,
    pub summary: Summary,
    pub outputs: Outputs,
}

pub fn cmd_merge(opts: MergeOptions) -> Result<(), CliError> {
    let folder = resolve_folder(opts.folder)?;
    let (settings, source) = load_settings(opts.config.as_deref(), &folder)?;

    let mode = if opts.single_pass { ReconcileMode::SinglePass } else { settings.reconcile };

    let extension = settings.markup_extension();
    let markup = keyset_io::discover::markup_files(&folder, &extension)
        .map_err(|e| CliError::io(e.to_string()))?;
    if markup.is_empty() {
        return Err(CliError::new(
            EXIT_NO_INPUT,
            format!("{} does not contain any {} files", folder.display(), extension),
        )
        .with_hint("export your keys to the folder first, or pass the folder that holds them"));
    }

    let mut consolidator = Consolidator::new(settings.key_filter(), mode);
    let mut files = Vec::with_capacity(markup.len() + 1);
    let mut ingest = IngestStats::default();

    let tabular_path = folder.join(&settings.tabular_file);
    files.push(ingest_tabular(&tabular_path, &mut consolidator, &mut ingest)?);
    let baseline = consolidator.mark_baseline();
    tracing::debug!(keys = baseline.keys, products = baseline.products, "baseline");

    for path in &markup {
        files.push(ingest_markup(path, &mut consolidator, &mut ingest));
    }

    if consolidator.store().is_empty() {
        return Err(CliError::new(EXIT_NO_KEYS, "no keys found in given folder")
            .with_hint("check that the key files contain Product_Key entries"));
    }

    let done = consolidator.finish();
    tracing::info!(
        passes = done.reconcile.passes,
        absorbed = done.reconcile.absorbed,
        sets = done.summary.key_sets,
        "reconciled"
    );

    let mut outputs = Outputs::default();
    if !opts.dry_run {
        let json_path = keyset_io::json::export_path(
            &folder,
            &settings.json_prefix,
            &settings.timestamp_format,
            &chrono::Local::now(),
        )
        .map_err(|e| CliError::config(e).with_hint("check timestamp_format in your settings"))?;

        keyset_io::json::write_key_sets(&json_path, &done.key_sets)
            .map_err(|e| CliError::write(e.to_string()))?;
        keyset_io::csv::write_audit_file(&tabular_path, &done.audit_lines)
            .map_err(|e| CliError::write(e.to_string()))?;

        outputs.json = Some(json_path);
        outputs.tabular = Some(tabular_path);
    }

    let report = MergeReport {
        folder,
        settings: source.to_string(),
        mode,
        dry_run: opts.dry_run,
        files,
        ingest,
        baseline,
        reconcile: done.reconcile,
        summary: done.summary,
        outputs,
    };

    if opts.json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    print_summary(&report);
    Ok(())
}

/// The tabular file is rewritten at the end of the run, so anything but an
/// empty file must load or the run stops before it can be overwritten.
fn ingest_tabular(
    path: &Path,
    consolidator: &mut Consolidator,
    totals: &mut IngestStats,
) -> Result<FileReport, CliError> {
    if !path.is_file() {
        tracing::info!(path = %path.display(), "no tabular file, starting empty");
        return Ok(FileReport { path: path.to_path_buf(), status: FileStatus::Missing, records: 0, error: None });
    }

    match keyset_io::csv::read_tabular_file(path) {
        Ok(rows) => {
            let stats = consolidator.ingest_rows(rows);
            tracing::info!(path = %path.display(), rows = stats.records, "read tabular file");
            totals.merge(stats);
            Ok(FileReport { path: path.to_path_buf(), status: FileStatus::Read, records: stats.records, error: None })
        }
        Err(e @ keyset_io::IoError::Empty { .. }) => Ok(skipped(path, e)),
        Err(e) => Err(CliError::io(e.to_string())
            .with_hint("fix or move the tabular file; it would be overwritten by this run")),
    }
}

fn ingest_markup(path: &Path, consolidator: &mut Consolidator, totals: &mut IngestStats) -> FileReport {
    match keyset_io::xml::read_key_file(path) {
        Ok(records) => {
            let stats = consolidator.ingest_all(records);
            tracing::info!(
                path = %path.display(),
                records = stats.records,
                rejected = stats.rejected,
                "read key file"
            );
            totals.merge(stats);
            FileReport { path: path.to_path_buf(), status: FileStatus::Read, records: stats.records, error: None }
        }
        Err(e) => skipped(path, e),
    }
}

fn skipped(path: &Path, err: keyset_io::IoError) -> FileReport {
    tracing::warn!(path = %path.display(), "skipping file: {err}");
    FileReport {
        path: path.to_path_buf(),
        status: FileStatus::Skipped,
        records: 0,
        error: Some(err.to_string()),
    }
}

fn print_summary(report: &MergeReport) {
    let s = &report.summary;
    eprintln!(
        "total distinct key count: {} and total distinct product count: {}",
        s.total_keys, s.total_products
    );
    eprintln!("found {} new keys for {} new products", s.new_keys, s.new_products);

    let skipped = report
        .files
        .iter()
        .filter(|f| matches!(f.status, FileStatus::Skipped))
        .count();
    if skipped > 0 {
        eprintln!("skipped {} unreadable file(s)", skipped);
    }

    if let Some(ref path) = report.outputs.json {
        eprintln!("wrote {}", path.display());
    }
    if let Some(ref path) = report.outputs.tabular {
        eprintln!("wrote {}", path.display());
    }
    if report.dry_run {
        eprintln!("dry run: nothing written");
    }
}

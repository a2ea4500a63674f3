// JSON export

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use keyset_engine::KeySet;

use crate::error::IoError;

/// `<folder>/<prefix><timestamp>.json`. Fails on an unusable format string or
/// one whose output would leave `folder`.
pub fn export_path<Tz>(
    folder: &Path,
    prefix: &str,
    timestamp_format: &str,
    now: &DateTime<Tz>,
) -> Result<PathBuf, String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut stamp = String::new();
    write!(stamp, "{}", now.format(timestamp_format))
        .map_err(|_| format!("invalid timestamp format '{timestamp_format}'"))?;
    // Specifiers such as %D render with slashes.
    if stamp.contains(['/', '\\']) {
        return Err(format!(
            "timestamp format '{timestamp_format}' renders a path separator ('{stamp}')"
        ));
    }
    Ok(folder.join(format!("{prefix}{stamp}.json")))
}

/// Export key sets as a pretty-printed JSON array, replacing any existing file.
pub fn write_key_sets(path: &Path, sets: &[KeySet]) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, sets).map_err(|e| IoError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer.flush().map_err(|e| IoError::io(path, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use tempfile::tempdir;

    #[test]
    fn export_name_uses_format() {
        let now = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 7)
                .unwrap(),
        );
        let path = export_path(Path::new("/data"), "keys_", "%Y-%d-%m_%H-%M-%S", &now).unwrap();
        assert_eq!(path, Path::new("/data/keys_2024-09-03_14-05-07.json"));
    }

    #[test]
    fn bad_format_is_an_error() {
        let now = Utc::now();
        assert!(export_path(Path::new("."), "keys_", "%Q%", &now).is_err());
    }

    #[test]
    fn slash_rendering_format_is_an_error() {
        let now = Utc::now();
        assert!(export_path(Path::new("."), "keys_", "%D", &now).is_err());
    }

    #[test]
    fn export_round_trips_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys.json");
        std::fs::write(&path, "stale").unwrap();

        let sets = vec![KeySet {
            products: vec!["Office; Retail".into(), "Visio; Retail".into()],
            keys: vec!["AAAAA".into()],
        }];
        write_key_sets(&path, &sets).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Products\""));
        assert!(text.contains("\"Keys\""));
        let back: Vec<KeySet> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sets);
    }
}

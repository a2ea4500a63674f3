// Key file discovery

use std::path::{Path, PathBuf};

use crate::error::IoError;

/// Top-level files in `folder` whose extension matches `extension`
/// (case-insensitive, no leading dot), sorted by file name.
pub fn markup_files(folder: &Path, extension: &str) -> Result<Vec<PathBuf>, IoError> {
    let entries = std::fs::read_dir(folder).map_err(|e| IoError::io(folder, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IoError::io(folder, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn finds_top_level_markup_sorted() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.xml"), "<root/>").unwrap();
        std::fs::write(dir.path().join("A.XML"), "<root/>").unwrap();
        std::fs::write(dir.path().join("keys.csv"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested.xml")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.xml"), "<root/>").unwrap();

        let files = markup_files(dir.path(), "xml").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.XML", "b.xml"]);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(markup_files(&dir.path().join("missing"), "xml").is_err());
    }
}

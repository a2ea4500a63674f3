use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// File could not be read or written.
    Io { path: PathBuf, message: String },
    /// File exists but holds no content.
    Empty { path: PathBuf },
    /// Markup could not be parsed.
    Xml { path: PathBuf, message: String },
    /// Markup parsed but holds no `Product_Key` entries.
    NoKeys { path: PathBuf },
    /// Tabular read/write error.
    Csv { path: PathBuf, message: String },
    /// JSON serialization error.
    Json { path: PathBuf, message: String },
}

impl IoError {
    pub(crate) fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::Io { path: path.to_path_buf(), message: err.to_string() }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::Empty { path }
            | Self::Xml { path, .. }
            | Self::NoKeys { path }
            | Self::Csv { path, .. }
            | Self::Json { path, .. } => path,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::Empty { path } => write!(f, "{}: content is empty", path.display()),
            Self::Xml { path, message } => write!(f, "{}: XML error: {message}", path.display()),
            Self::NoKeys { path } => {
                write!(f, "{}: does not contain any keys", path.display())
            }
            Self::Csv { path, message } => write!(f, "{}: CSV error: {message}", path.display()),
            Self::Json { path, message } => write!(f, "{}: JSON error: {message}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}

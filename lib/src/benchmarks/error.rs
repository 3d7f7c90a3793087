use std::{fmt, io};
use std::path::{Path, PathBuf};

/// Failure to produce a benchmark summary or chart.
///
/// Every variant aborts the insertion point that requested it. Rows whose
/// reference throughput is unusable are not errors: they are dropped and
/// listed in [`Comparison::skipped`](super::Comparison::skipped).
#[derive(Debug)]
pub enum BenchmarkError {
    /// A results document does not exist.
    NotFound { path: PathBuf },
    /// A results document exists but could not be read.
    Io { path: PathBuf, source: io::Error },
    /// A results document is not valid JSON.
    Parse { path: PathBuf, source: serde_json::Error },
    /// A results document is JSON but is missing fields or has mistyped ones.
    Schema { path: PathBuf, reason: String },
    /// A platform identifier that cannot be used to name a results file.
    InvalidPlatform(String),
    /// A theme color that is not a `#rrggbb` hex triple.
    InvalidColor(String),
    /// A chart element id that is not a JavaScript identifier.
    InvalidElementId(String),
}

impl BenchmarkError {
    pub(crate) fn read(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => BenchmarkError::NotFound { path: path.into() },
            _ => BenchmarkError::Io { path: path.into(), source: error },
        }
    }

    pub(crate) fn decode(path: &Path, error: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match error.classify() {
            Category::Data => BenchmarkError::Schema {
                path: path.into(),
                reason: error.to_string(),
            },
            Category::Syntax | Category::Eof | Category::Io => BenchmarkError::Parse {
                path: path.into(),
                source: error,
            },
        }
    }

    /// The results document the error concerns, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            BenchmarkError::NotFound { path }
            | BenchmarkError::Io { path, .. }
            | BenchmarkError::Parse { path, .. }
            | BenchmarkError::Schema { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for BenchmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchmarkError::NotFound { path } => {
                write!(f, "benchmark results not found: {}", path.display())
            }
            BenchmarkError::Io { path, .. } => {
                write!(f, "failed to read benchmark results: {}", path.display())
            }
            BenchmarkError::Parse { path, .. } => {
                write!(f, "benchmark results are not valid JSON: {}", path.display())
            }
            BenchmarkError::Schema { path, reason } => {
                write!(f, "invalid benchmark results in {}: {reason}", path.display())
            }
            BenchmarkError::InvalidPlatform(id) => write!(f, "invalid platform id {id:?}"),
            BenchmarkError::InvalidColor(color) => {
                write!(f, "invalid color {color:?}: expected `#rrggbb`")
            }
            BenchmarkError::InvalidElementId(id) => {
                write!(f, "invalid chart element id {id:?}: expected a JavaScript identifier")
            }
        }
    }
}

impl std::error::Error for BenchmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchmarkError::Io { source, .. } => Some(source),
            BenchmarkError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl_error_detail_with_std_error!(BenchmarkError);

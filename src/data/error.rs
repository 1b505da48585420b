use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a listings source from loading.
///
/// A failed load never yields a partial dataset.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("malformed zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive {0} contains no CSV member")]
    NoCsvMember(PathBuf),

    #[error("archive {path} contains several CSV members: {members:?}")]
    AmbiguousCsvMembers { path: PathBuf, members: Vec<String> },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("malformed arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': '{value}' is not a valid number")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

impl DataLoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataLoadError::Io {
            path: path.into(),
            source,
        }
    }
}

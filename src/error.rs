use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Source '{source_name}' is missing mandatory column '{column}'")]
    Schema { source_name: String, column: String },

    #[error("Source '{source_name}' could not be read from {}: {inner}", path.display())]
    Source {
        source_name: String,
        path: PathBuf,
        #[source]
        inner: Box<ProcessingError>,
    },

    #[error("Dataset is missing column '{0}'")]
    MissingColumn(String),

    #[error("Missing required feature '{0}'")]
    MissingFeature(String),

    #[error("Dataset invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    pub fn schema(source_name: &str, column: &str) -> Self {
        ProcessingError::Schema {
            source_name: source_name.to_string(),
            column: column.to_string(),
        }
    }

    /// Attach the failing source to a read error. Schema errors already name it.
    pub fn in_source(self, source_name: &str, path: &Path) -> Self {
        match self {
            err @ (ProcessingError::Schema { .. } | ProcessingError::Source { .. }) => err,
            inner => ProcessingError::Source {
                source_name: source_name.to_string(),
                path: path.to_path_buf(),
                inner: Box::new(inner),
            },
        }
    }
}

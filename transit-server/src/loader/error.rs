//! Ingestion error types.

use std::path::PathBuf;

use crate::domain::DomainError;

/// Errors from loading network data files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A data file could not be opened
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be read or did not match the expected columns
    #[error("{file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    /// A row parsed but holds an invalid value. Rows count from 1 after the
    /// header.
    #[error("{file} row {row}: {source}")]
    InvalidRecord {
        file: &'static str,
        row: usize,
        #[source]
        source: DomainError,
    },
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not take exclusive lock on {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The existing store was written with a different column layout. Fatal:
    /// nothing is appended.
    #[error("store {} has header [{found}], expected [{expected}]", .path.display())]
    SchemaMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a whole generation pass.
#[derive(Debug, Error)]
pub enum TypegenError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to get collections: {0}")]
    Snapshot(#[from] SourceError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to obtain a schema snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid collections JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid snapshot pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("no collection snapshots (*.json) found at {}", path.display())]
    Empty { path: PathBuf },

    #[error("schema source unavailable: {0}")]
    Unavailable(String),
}

/// Failure while emitting declarations for a single collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("collection \"{collection}\" does not map to a usable TypeScript identifier")]
    InvalidIdentifier { collection: String },
}

//! Schema snapshot sources.
//!
//! The generator never owns collection definitions; it asks a
//! [`SchemaSource`] for a fresh snapshot on every pass.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::types::Collection;

/// Supplies the current collection definitions.
pub trait SchemaSource: Send + Sync {
    fn load_collections(&self) -> Result<Vec<Collection>, SourceError>;
}

/// In-memory snapshot; mostly for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub collections: Vec<Collection>,
}

impl StaticSource {
    pub fn new(collections: Vec<Collection>) -> Self {
        Self { collections }
    }
}

impl SchemaSource for StaticSource {
    fn load_collections(&self) -> Result<Vec<Collection>, SourceError> {
        Ok(self.collections.clone())
    }
}

impl<F> SchemaSource for F
where
    F: Fn() -> Result<Vec<Collection>, SourceError> + Send + Sync,
{
    fn load_collections(&self) -> Result<Vec<Collection>, SourceError> {
        self()
    }
}

/// Reads PocketBase collection exports from disk.
///
/// The path is either a single JSON file (an array of collections, as
/// produced by "Export collections") or a directory whose `*.json` files are
/// read in path order and concatenated.
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for JsonSnapshotSource {
    fn load_collections(&self) -> Result<Vec<Collection>, SourceError> {
        if self.path.is_dir() {
            let files = scan_directory(&self.path)?;
            let mut collections = Vec::new();
            for file in files {
                collections.extend(read_snapshot_file(&file)?);
            }
            return Ok(collections);
        }
        read_snapshot_file(&self.path)
    }
}

/// Parse one export file.
pub fn read_snapshot_file(path: &Path) -> Result<Vec<Collection>, SourceError> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_snapshot(&content).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse export JSON: either a bare array of collections or an object with
/// an `items` array (the paginated `GET /api/collections` response).
pub fn parse_snapshot(content: &str) -> Result<Vec<Collection>, serde_json::Error> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Export {
        List(Vec<Collection>),
        Page { items: Vec<Collection> },
    }

    Ok(match serde_json::from_str::<Export>(content)? {
        Export::List(items) | Export::Page { items } => items,
    })
}

fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let pattern = dir.join("*.json");
    let pattern_str = pattern.to_string_lossy().replace('\\', "/");

    let mut paths: Vec<PathBuf> = glob::glob(&pattern_str)?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(SourceError::Empty {
            path: dir.to_path_buf(),
        });
    }
    Ok(paths)
}

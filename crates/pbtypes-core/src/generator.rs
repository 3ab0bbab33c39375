//! Content-addressed writer for `pocketbase-types.ts`.
//!
//! A pass always renders the full declaration text, but the file is only
//! rewritten when its SHA-256 digest differs from the last successful write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::catalogs::{hash_content, OUTPUT_FILE_NAME};
use crate::config::Config;
use crate::emitter::build_content;
use crate::error::TypegenError;
use crate::source::SchemaSource;

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Written { path: PathBuf, digest: String },
    Unchanged { digest: String },
}

impl GenerateOutcome {
    pub fn digest(&self) -> &str {
        match self {
            GenerateOutcome::Written { digest, .. } | GenerateOutcome::Unchanged { digest } => {
                digest
            }
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, GenerateOutcome::Written { .. })
    }
}

/// Serializes generation passes and remembers the digest of the last write.
#[derive(Debug, Default)]
pub struct TypeGenerator {
    last_digest: Mutex<Option<String>>,
}

impl TypeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored digest from an artifact already on disk, so a fresh
    /// process does not rewrite an up-to-date file.
    pub fn from_existing(config: &Config) -> Self {
        let last = fs::read_to_string(config.output_path())
            .ok()
            .map(|content| hash_content(&content));
        Self {
            last_digest: Mutex::new(last),
        }
    }

    /// Digest of the last artifact this generator wrote, if any.
    pub fn last_digest(&self) -> Option<String> {
        self.last_digest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one pass. Concurrent callers block until the in-flight pass is done.
    pub fn generate(
        &self,
        source: &dyn SchemaSource,
        config: &Config,
    ) -> Result<GenerateOutcome, TypegenError> {
        // The stored digest is only replaced after a complete write, so a
        // panic mid-pass leaves it valid.
        let mut last = self
            .last_digest
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let dir = config.resolve_output_dir();
        fs::create_dir_all(dir).map_err(|source| TypegenError::CreateOutputDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let collections = source.load_collections()?;
        let content = build_content(&collections);
        let digest = hash_content(&content);

        if last.as_deref() == Some(digest.as_str()) {
            debug!(digest = %digest, "generated types unchanged; skipping write");
            return Ok(GenerateOutcome::Unchanged { digest });
        }

        let path = dir.join(OUTPUT_FILE_NAME);
        write_atomic(dir, &path, content.as_bytes())?;
        debug!(path = %path.display(), digest = %digest, "wrote generated types");

        *last = Some(digest.clone());
        Ok(GenerateOutcome::Written { path, digest })
    }
}

/// Write through a temporary file in the same directory, then rename over
/// the target. Readers see either the old or the new file, never a prefix.
fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), TypegenError> {
    let write_err = |source| TypegenError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

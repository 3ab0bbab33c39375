use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalogs::{DEFAULT_DATA_DIR, OUTPUT_FILE_NAME};

/// Generator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving `pocketbase-types.ts`; `pb_data` when unset.
    pub output_dir: Option<PathBuf>,
    /// Run a pass when the host starts.
    pub generate_on_startup: bool,
}

impl Config {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(output_dir.into()),
            generate_on_startup: false,
        }
    }

    pub fn with_generate_on_startup(mut self, enabled: bool) -> Self {
        self.generate_on_startup = enabled;
        self
    }

    pub fn resolve_output_dir(&self) -> &Path {
        match &self.output_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new(DEFAULT_DATA_DIR),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve_output_dir().join(OUTPUT_FILE_NAME)
    }
}

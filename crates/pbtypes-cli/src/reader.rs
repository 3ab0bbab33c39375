use std::fs;
use std::path::{Path, PathBuf};

use pbtypes_core::Config;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "pbtypes.config.yaml";

/// Project configuration from pbtypes.config.yaml. Relative paths are
/// resolved against the directory holding the file.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    pub snapshot: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub generate_on_startup: Option<bool>,
}

/// Where to read collections from and how to generate.
#[derive(Debug)]
pub struct Invocation {
    pub snapshot: PathBuf,
    pub config: Config,
    /// `generate_on_startup` as written in the project file, if any.
    pub startup: Option<bool>,
}

/// Resolve the snapshot path and generator config from the CLI arguments.
///
/// Without `--config`, a directory argument holding `pbtypes.config.yaml`
/// is treated as a project; any other path is the snapshot itself. The
/// `-o` flag wins over `output_dir` from the file.
pub fn resolve_invocation(
    path: &Path,
    output: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<Invocation, String> {
    let project_file = match config_file {
        Some(file) => Some(file.to_path_buf()),
        None if path.is_dir() && path.join(CONFIG_FILE_NAME).is_file() => {
            Some(path.join(CONFIG_FILE_NAME))
        }
        None => None,
    };

    let (project, base) = match &project_file {
        Some(file) => {
            let project = read_project_config(file)?;
            let base = file.parent().unwrap_or(Path::new("")).to_path_buf();
            (project, base)
        }
        None => (ProjectConfig::default(), PathBuf::new()),
    };

    // An explicit path argument wins over `snapshot` from an explicit --config.
    let from_project = project
        .snapshot
        .as_ref()
        .filter(|_| config_file.is_none() || path == Path::new("."));
    let snapshot = match from_project {
        Some(snapshot) => base.join(snapshot),
        None => path.to_path_buf(),
    };

    if !snapshot.exists() {
        return Err(format!("Path does not exist: {}", snapshot.display()));
    }

    let output_dir = match output {
        Some(dir) => Some(dir.to_path_buf()),
        None => project.output_dir.as_ref().map(|dir| base.join(dir)),
    };

    Ok(Invocation {
        snapshot,
        config: Config {
            output_dir,
            generate_on_startup: project.generate_on_startup.unwrap_or(false),
        },
        startup: project.generate_on_startup,
    })
}

pub fn read_project_config(config_path: &Path) -> Result<ProjectConfig, String> {
    let content = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path.display(), e))?;
    serde_yaml::from_str(&content)
        .map_err(|e| format!("Invalid config {}: {}", config_path.display(), e))
}

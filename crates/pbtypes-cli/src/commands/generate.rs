use std::path::Path;

use pbtypes_core::{GenerateOutcome, JsonSnapshotSource, TypeGenerator};

use crate::reader::resolve_invocation;

pub fn run_generate(
    path: &Path,
    output: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<String, String> {
    let invocation = resolve_invocation(path, output, config_file)?;
    let source = JsonSnapshotSource::new(&invocation.snapshot);

    let generator = TypeGenerator::from_existing(&invocation.config);
    let outcome = generator
        .generate(&source, &invocation.config)
        .map_err(|e| e.to_string())?;

    Ok(match outcome {
        GenerateOutcome::Written { path, digest } => {
            format!("Written to {} (sha256 {})", path.display(), short(&digest))
        }
        GenerateOutcome::Unchanged { digest } => format!(
            "Up to date: {} (sha256 {})",
            invocation.config.output_path().display(),
            short(&digest)
        ),
    })
}

fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

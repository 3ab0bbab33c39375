use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use pbtypes_core::{diff_snapshots, JsonSnapshotSource, SchemaSource, TypegenPlugin};
use tracing::{info, warn};

use crate::reader::resolve_invocation;

/// Quiet period that closes a burst of filesystem events from one save.
const DEBOUNCE: Duration = Duration::from_millis(200);

pub fn run_watch(
    path: &Path,
    output: Option<&Path>,
    config_file: Option<&Path>,
    no_startup: bool,
) -> Result<String, String> {
    let invocation = resolve_invocation(path, output, config_file)?;
    let snapshot = fs::canonicalize(&invocation.snapshot)
        .map_err(|e| format!("Failed to resolve {}: {e}", invocation.snapshot.display()))?;

    let mut config = invocation.config;
    config.generate_on_startup = !no_startup && invocation.startup.unwrap_or(true);

    let plugin = TypegenPlugin::resume(JsonSnapshotSource::new(&snapshot), config);
    let mut current = plugin.source().load_collections().unwrap_or_else(|err| {
        warn!(error = %err, "Failed to load collection snapshot");
        Vec::new()
    });
    plugin.on_startup();

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher =
        notify::recommended_watcher(tx).map_err(|e| format!("Failed to start watcher: {e}"))?;
    let watch_root = watch_root(&snapshot);
    watcher
        .watch(&watch_root, RecursiveMode::NonRecursive)
        .map_err(|e| format!("Failed to watch {}: {e}", watch_root.display()))?;
    info!(path = %snapshot.display(), "Watching collection snapshot");

    while let Ok(event) = rx.recv() {
        if !touches_snapshot(&event, &snapshot) {
            continue;
        }
        while rx.recv_timeout(DEBOUNCE).is_ok() {}

        let next = match plugin.source().load_collections() {
            Ok(collections) => collections,
            Err(err) => {
                warn!(error = %err, "Failed to reload collection snapshot");
                continue;
            }
        };

        for change in diff_snapshots(&current, &next) {
            info!(
                collection = %change.collection,
                action = %change.action,
                "Collection changed"
            );
            plugin.on_collection_change(&change);
        }
        current = next;
    }

    Ok("Watcher stopped".to_string())
}

fn watch_root(snapshot: &Path) -> PathBuf {
    if snapshot.is_dir() {
        return snapshot.to_path_buf();
    }
    snapshot
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Editors often replace files instead of writing in place, so a single
/// snapshot file is matched by name inside its watched directory.
fn touches_snapshot(event: &notify::Result<Event>, snapshot: &Path) -> bool {
    let Ok(event) = event else {
        return false;
    };
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }

    event.paths.iter().any(|p| {
        if snapshot.is_dir() {
            p.extension().is_some_and(|ext| ext == "json")
        } else {
            p.file_name() == snapshot.file_name()
        }
    })
}

use std::path::Path;

use pbtypes_core::{resolve_expand, JsonSnapshotSource, RelationGraph, SchemaSource};

pub fn run_expand(
    snapshot: &Path,
    collection: &str,
    expr: &str,
    format: &str,
) -> Result<String, String> {
    let collections = JsonSnapshotSource::new(snapshot)
        .load_collections()
        .map_err(|e| e.to_string())?;
    let graph = RelationGraph::build(&collections);

    if !graph.contains(collection) {
        return Err(format!("Unknown collection: {collection}"));
    }

    let shape = resolve_expand(&graph, collection, expr);
    match format {
        "json" => serde_json::to_string_pretty(&shape)
            .map_err(|e| format!("JSON serialization error: {e}")),
        _ => Ok(shape.to_typescript()),
    }
}

use std::path::Path;

use pbtypes_core::{JsonSnapshotSource, RelationGraph, SchemaSource};

use crate::reader::resolve_invocation;

/// One relation field: (source collection, target collection, field, is_multi).
type Edge<'a> = (&'a str, &'a str, &'a str, bool);

pub fn run_analyze(
    input_path: &Path,
    config_file: Option<&Path>,
    format: &str,
) -> Result<String, String> {
    let invocation = resolve_invocation(input_path, None, config_file)?;
    let collections = JsonSnapshotSource::new(&invocation.snapshot)
        .load_collections()
        .map_err(|e| e.to_string())?;
    let graph = RelationGraph::build(&collections);

    let names: Vec<&str> = graph.collections().collect();
    let edges: Vec<Edge> = names
        .iter()
        .flat_map(|&name| {
            graph.forward(name).iter().map(move |rel| {
                (
                    name,
                    rel.target_collection.as_str(),
                    rel.field_name.as_str(),
                    rel.is_multi,
                )
            })
        })
        .collect();

    match format {
        "dot" => Ok(render_dot(&names, &edges)),
        _ => Ok(render_mermaid(&names, &edges)),
    }
}

fn render_mermaid(names: &[&str], edges: &[Edge]) -> String {
    let mut lines = vec!["graph LR".to_string()];

    // Collections without any relation
    for name in names {
        if !edges.iter().any(|(src, tgt, _, _)| src == name || tgt == name) {
            lines.push(format!("    {name}"));
        }
    }

    for (src, tgt, field, is_multi) in edges {
        let label = if *is_multi {
            format!("{field}[]")
        } else {
            field.to_string()
        };
        lines.push(format!("    {src} -->|{label}| {tgt}"));
    }

    lines.push(format!(
        "%% {} collections, {} relations",
        names.len(),
        edges.len()
    ));
    lines.join("\n")
}

fn render_dot(names: &[&str], edges: &[Edge]) -> String {
    let mut lines = vec![
        "digraph PocketBase {".to_string(),
        "    rankdir=LR;".to_string(),
        "    node [shape=box, style=filled, fillcolor=lightyellow];".to_string(),
    ];

    for name in names {
        lines.push(format!("    \"{name}\";"));
    }

    for (src, tgt, field, is_multi) in edges {
        let style = if *is_multi {
            "color=blue, arrowhead=crow"
        } else {
            "color=black"
        };
        lines.push(format!(
            "    \"{src}\" -> \"{tgt}\" [label=\"{field}\", {style}];"
        ));
    }

    lines.push("}".to_string());
    lines.join("\n")
}

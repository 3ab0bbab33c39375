//! Expand-path resolution.
//!
//! Two renditions of the same rules:
//!
//! - [`write_expand_rules`] emits generic recursive TypeScript types
//!   (`InferExpand<C, E>`) that the client's compiler evaluates for whatever
//!   expand string appears at a call site.
//! - [`resolve_expand`] evaluates an expand string against a
//!   [`RelationGraph`] at runtime and yields the concrete [`ExpandShape`].
//!
//! Rules: split on commas and trim each path; look a segment up in the
//! forward relations of the current collection, then in its back-relations;
//! an unknown segment yields `unknown`; multi relations are array-wrapped;
//! for `a.b…` the record reached through `a` gets its `expand` slot replaced
//! by the resolution of `b…` on the target collection. Paths are merged into
//! one object keyed by their first segment.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalogs::pascal_case;
use crate::relations::RelationGraph;
use crate::ts_writer::{property_key, TsWriter};

// ---------------------------------------------------------------------------
// Runtime resolution
// ---------------------------------------------------------------------------

/// Resolved shape of an `expand` slot: first segment → resolved relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpandShape(pub BTreeMap<String, ExpandType>);

/// Resolved type of one expanded relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExpandType {
    /// The segment names no relation of the collection.
    Unknown,
    Record {
        collection: String,
        #[serde(rename = "isMulti")]
        is_multi: bool,
        #[serde(skip_serializing_if = "ExpandShape::is_empty")]
        expand: ExpandShape,
    },
}

/// Resolve an expand expression such as `"app.default_branch, builds_via_app"`
/// on `collection`.
pub fn resolve_expand(graph: &RelationGraph, collection: &str, expr: &str) -> ExpandShape {
    let mut shape = ExpandShape::default();
    for path in expr.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        shape.insert(segments[0], resolve_path(graph, collection, &segments));
    }
    shape
}

fn resolve_path(graph: &RelationGraph, collection: &str, segments: &[&str]) -> ExpandType {
    let Some((first, rest)) = segments.split_first() else {
        return ExpandType::Unknown;
    };
    let Some(hop) = graph.lookup(collection, first) else {
        return ExpandType::Unknown;
    };

    let mut expand = ExpandShape::default();
    if let Some(next) = rest.first() {
        expand.insert(next, resolve_path(graph, hop.collection, rest));
    }

    ExpandType::Record {
        collection: hop.collection.to_string(),
        is_multi: hop.is_multi,
        expand,
    }
}

impl ExpandShape {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ExpandType> {
        self.0.get(key)
    }

    /// Insert, merging nested expand slots when two paths share a first
    /// segment (`"app.a, app.b"`).
    fn insert(&mut self, key: &str, ty: ExpandType) {
        match self.0.get_mut(key) {
            Some(existing) => existing.merge(ty),
            None => {
                self.0.insert(key.to_string(), ty);
            }
        }
    }

    /// Concrete TypeScript object type for this slot.
    pub fn to_typescript(&self) -> String {
        if self.0.is_empty() {
            return "{}".to_string();
        }
        let entries: Vec<String> = self
            .0
            .iter()
            .map(|(key, ty)| format!("{}?: {}", property_key(key), ty.to_typescript()))
            .collect();
        format!("{{ {} }}", entries.join("; "))
    }
}

impl ExpandType {
    fn merge(&mut self, other: ExpandType) {
        if let (
            ExpandType::Record { expand, .. },
            ExpandType::Record {
                expand: other_expand,
                ..
            },
        ) = (self, other)
        {
            for (key, ty) in other_expand.0 {
                expand.insert(&key, ty);
            }
        }
    }

    /// Concrete TypeScript type, e.g. `Omit<AppsResponse, 'expand'> & { expand?: {...} }[]`.
    pub fn to_typescript(&self) -> String {
        match self {
            ExpandType::Unknown => "unknown".to_string(),
            ExpandType::Record {
                collection,
                is_multi,
                expand,
            } => {
                let response = format!("{}Response", pascal_case(collection));
                let base = if expand.is_empty() {
                    response
                } else {
                    format!(
                        "(Omit<{response}, 'expand'> & {{ expand?: {} }})",
                        expand.to_typescript()
                    )
                };
                if *is_multi {
                    format!("{base}[]")
                } else {
                    base
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Type-level rules
// ---------------------------------------------------------------------------

/// Emit the recursive type-level resolver. Independent of the schema: it
/// reads `CollectionRelations` / `CollectionBackRelations` emitted alongside.
pub fn write_expand_rules(w: &mut TsWriter) {
    write_split_type(w);
    write_trim_types(w);
    write_split_path_type(w);
    write_first_segment_type(w);
    write_relation_info_type(w);
    write_simple_field_type(w);
    write_with_nested_expand_type(w);
    write_nested_expand_type(w);
    write_expand_field_type(w);
    write_expand_from_list_type(w);
    write_infer_expand_type(w);
}

/// Emit a multi-line type alias: the head line, then every body line one
/// level deeper. Nesting inside the body is spelled out with leading spaces.
fn alias(w: &mut TsWriter, head: &str, body: &[&str]) {
    w.line(head);
    w.indent();
    for line in body {
        w.line(line);
    }
    w.dedent();
    w.blank_line();
}

fn write_split_type(w: &mut TsWriter) {
    alias(
        w,
        "type Split<S extends string, D extends string = \",\"> =",
        &[
            "string extends S ? string[] :",
            "S extends \"\" ? [] :",
            "S extends `${infer T}${D}${infer U}` ? [T, ...Split<U, D>] : [S];",
        ],
    );
}

fn write_trim_types(w: &mut TsWriter) {
    w.line("type TrimLeft<S extends string> = S extends ` ${infer R}` ? TrimLeft<R> : S;");
    w.line("type TrimRight<S extends string> = S extends `${infer L} ` ? TrimRight<L> : S;");
    w.line("type Trim<S extends string> = TrimLeft<TrimRight<S>>;");
    w.blank_line();
}

fn write_split_path_type(w: &mut TsWriter) {
    alias(
        w,
        "type SplitPath<S extends string> =",
        &["S extends `${infer Head}.${infer Tail}` ? [Trim<Head>, ...SplitPath<Tail>] : [Trim<S>];"],
    );
}

fn write_first_segment_type(w: &mut TsWriter) {
    alias(
        w,
        "type GetFirstPathSegment<S extends string> =",
        &["S extends `${infer Head}.${infer _Tail}` ? Trim<Head> : Trim<S>;"],
    );
}

fn write_relation_info_type(w: &mut TsWriter) {
    alias(
        w,
        "type GetRelationInfo<C extends Collections, F extends string> =",
        &[
            "Trim<F> extends keyof CollectionRelations[C]",
            "    ? CollectionRelations[C][Trim<F>]",
            "    : Trim<F> extends keyof CollectionBackRelations[C]",
            "        ? CollectionBackRelations[C][Trim<F>]",
            "        : { response: unknown; isMulti: false; collection: never };",
        ],
    );
}

fn write_simple_field_type(w: &mut TsWriter) {
    alias(
        w,
        "type ResolveSimpleExpandField<C extends Collections, F extends string> =",
        &[
            "GetRelationInfo<C, F> extends { response: infer R; isMulti: infer M }",
            "    ? M extends true ? R[] : R",
            "    : unknown;",
        ],
    );
}

fn write_with_nested_expand_type(w: &mut TsWriter) {
    alias(
        w,
        "type WithNestedExpand<T, NestedExpand> =",
        &[
            "T extends object",
            "    ? Omit<T, 'expand'> & { expand?: NestedExpand }",
            "    : T;",
        ],
    );
}

fn write_nested_expand_type(w: &mut TsWriter) {
    alias(
        w,
        "type ResolveNestedExpand<C extends Collections, Path extends string[]> =",
        &[
            "Path extends [infer First extends string, ...infer Rest extends string[]]",
            "    ? GetRelationInfo<C, First> extends { response: infer R; isMulti: infer M; collection: infer NC }",
            "        ? Rest extends [infer Next extends string, ...string[]]",
            "            ? [NC] extends [never]",
            "                ? unknown",
            "                : NC extends Collections",
            "                    ? M extends true",
            "                        ? WithNestedExpand<R, { [K in Next]?: ResolveNestedExpand<NC, Rest> }>[]",
            "                        : WithNestedExpand<R, { [K in Next]?: ResolveNestedExpand<NC, Rest> }>",
            "                    : unknown",
            "            : M extends true ? R[] : R",
            "        : unknown",
            "    : {};",
        ],
    );
}

fn write_expand_field_type(w: &mut TsWriter) {
    alias(
        w,
        "type ResolveExpandField<C extends Collections, F extends string> =",
        &[
            "Trim<F> extends `${infer _Head}.${infer _Tail}`",
            "    ? ResolveNestedExpand<C, SplitPath<Trim<F>>>",
            "    : ResolveSimpleExpandField<C, F>;",
        ],
    );
}

fn write_expand_from_list_type(w: &mut TsWriter) {
    alias(
        w,
        "type BuildExpandFromList<C extends Collections, L extends string[]> =",
        &[
            "L extends [] ? {} :",
            "L extends [infer First extends string, ...infer Rest extends string[]]",
            "    ? Trim<First> extends \"\"",
            "        ? BuildExpandFromList<C, Rest>",
            "        : { [K in GetFirstPathSegment<First>]?: ResolveExpandField<C, First> } & BuildExpandFromList<C, Rest>",
            "    : {};",
        ],
    );
}

fn write_infer_expand_type(w: &mut TsWriter) {
    alias(
        w,
        "export type InferExpand<C extends Collections, E extends string> =",
        &["E extends \"\" ? {} :", "BuildExpandFromList<C, Split<E, \",\">>;"],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Collection, CollectionKind, Field, FieldKind, RelationOptions};

    fn relation(name: &str, target_id: &str, max_select: u32) -> Field {
        Field::new(
            name,
            FieldKind::Relation(RelationOptions {
                collection_id: target_id.into(),
                max_select,
            }),
        )
    }

    fn graph() -> RelationGraph {
        let coll = |id: &str, name: &str, fields: Vec<Field>| Collection {
            id: id.into(),
            name: name.into(),
            kind: CollectionKind::Base,
            fields,
            indexes: vec![],
        };
        RelationGraph::build(&[
            coll(
                "c_apps",
                "apps",
                vec![
                    Field::new("name", FieldKind::Text),
                    relation("default_branch", "c_branches", 1),
                ],
            ),
            coll("c_branches", "branches", vec![relation("app", "c_apps", 1)]),
            coll(
                "c_builds",
                "app_builds",
                vec![
                    relation("app", "c_apps", 1),
                    relation("branches", "c_branches", 5),
                ],
            ),
        ])
    }

    #[test]
    fn single_segment() {
        let shape = resolve_expand(&graph(), "app_builds", "app");
        assert_eq!(
            shape.get("app"),
            Some(&ExpandType::Record {
                collection: "apps".into(),
                is_multi: false,
                expand: ExpandShape::default(),
            })
        );
        assert_eq!(shape.to_typescript(), "{ app?: AppsResponse }");
    }

    #[test]
    fn dotted_path_nests_under_next_segment() {
        let shape = resolve_expand(&graph(), "app_builds", "app.default_branch");
        let ExpandType::Record { expand, .. } = shape.get("app").unwrap() else {
            panic!("expected record");
        };
        assert_eq!(
            expand.get("default_branch"),
            Some(&ExpandType::Record {
                collection: "branches".into(),
                is_multi: false,
                expand: ExpandShape::default(),
            })
        );
        assert_eq!(
            shape.to_typescript(),
            "{ app?: (Omit<AppsResponse, 'expand'> & { expand?: { default_branch?: BranchesResponse } }) }"
        );
    }

    #[test]
    fn multi_and_back_relations() {
        let shape = resolve_expand(&graph(), "apps", " app_builds_via_app , branches_via_app");
        assert_eq!(
            shape.to_typescript(),
            "{ app_builds_via_app?: AppBuildsResponse[]; branches_via_app?: BranchesResponse[] }"
        );

        let shape = resolve_expand(&graph(), "app_builds", "branches");
        assert_eq!(shape.to_typescript(), "{ branches?: BranchesResponse[] }");
    }

    #[test]
    fn unknown_segments() {
        let shape = resolve_expand(&graph(), "app_builds", "nope,app.nope");
        assert_eq!(shape.get("nope"), Some(&ExpandType::Unknown));
        assert_eq!(
            shape.to_typescript(),
            "{ app?: (Omit<AppsResponse, 'expand'> & { expand?: { nope?: unknown } }); nope?: unknown }"
        );
    }

    #[test]
    fn shared_first_segment_merges() {
        let shape = resolve_expand(&graph(), "branches", "app.default_branch, app.branches_via_app");
        let ExpandType::Record { expand, .. } = shape.get("app").unwrap() else {
            panic!("expected record");
        };
        assert_eq!(expand.0.len(), 2);
    }

    #[test]
    fn empty_paths_are_skipped() {
        assert!(resolve_expand(&graph(), "apps", "").is_empty());
        let shape = resolve_expand(&graph(), "app_builds", "app,, ,");
        assert_eq!(shape.0.len(), 1);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let shape = resolve_expand(&graph(), "app_builds", "app");
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["app"]["kind"], "record");
        assert_eq!(json["app"]["collection"], "apps");
        assert_eq!(json["app"]["isMulti"], false);
        assert!(json["app"].get("expand").is_none());
    }

    #[test]
    fn rules_are_schema_independent() {
        let mut w = TsWriter::new();
        write_expand_rules(&mut w);
        let text = w.into_string();
        assert!(text.contains("export type InferExpand<C extends Collections, E extends string> ="));
        assert!(text.contains("type ResolveNestedExpand<C extends Collections, Path extends string[]> ="));
        assert!(!text.contains("Response"));
    }
}

//! Bidirectional relation graph derived from a collection snapshot.
//!
//! Relation fields only point one way (source → target). The graph inverts
//! them so a target collection also knows every collection that references
//! it, keyed as `{source}_via_{field}`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::catalogs::VIA;
use crate::indexes::find_single_column_unique_index;
use crate::types::Collection;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRelation {
    pub field_name: String,
    pub target_collection: String,
    pub is_multi: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackRelation {
    pub source_collection: String,
    pub source_field: String,
    pub is_multi: bool,
}

impl BackRelation {
    /// Key under which the back-relation is exposed on the target collection.
    pub fn key(&self) -> String {
        format!("{}{VIA}{}", self.source_collection, self.source_field)
    }
}

/// A relation reachable from a collection by one expand segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationHop<'a> {
    /// Collection the hop lands on.
    pub collection: &'a str,
    pub is_multi: bool,
}

/// Forward and back relation maps, keyed by collection name.
///
/// Built once per generation pass by [`RelationGraph::build`] and read-only
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationGraph {
    forward: BTreeMap<String, Vec<ForwardRelation>>,
    back: BTreeMap<String, Vec<BackRelation>>,
}

impl RelationGraph {
    pub fn build(collections: &[Collection]) -> Self {
        // Pass 1: id → name
        let names: HashMap<&str, &str> = collections
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        let mut forward: BTreeMap<String, Vec<ForwardRelation>> = BTreeMap::new();
        let mut back: BTreeMap<String, Vec<BackRelation>> = BTreeMap::new();

        // Pass 2: every relation field once, both directions
        for coll in collections {
            back.entry(coll.name.clone()).or_default();
            let mut entries = Vec::new();

            for (field, opts) in coll.relation_fields() {
                let Some(&target) = names.get(opts.collection_id.as_str()) else {
                    debug!(
                        collection = %coll.name,
                        field = %field.name,
                        target_id = %opts.collection_id,
                        "dropping relation to a collection missing from the snapshot"
                    );
                    continue;
                };

                entries.push(ForwardRelation {
                    field_name: field.name.clone(),
                    target_collection: target.to_string(),
                    is_multi: opts.is_multi(),
                });

                let unique = find_single_column_unique_index(&coll.indexes, &field.name).is_some();
                back.entry(target.to_string()).or_default().push(BackRelation {
                    source_collection: coll.name.clone(),
                    source_field: field.name.clone(),
                    is_multi: !unique,
                });
            }

            forward.insert(coll.name.clone(), entries);
        }

        for rels in back.values_mut() {
            rels.sort_by_cached_key(BackRelation::key);
        }

        Self { forward, back }
    }

    /// Forward relations declared on `collection`, in field order.
    pub fn forward(&self, collection: &str) -> &[ForwardRelation] {
        self.forward.get(collection).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Back-relations pointing at `collection`, sorted by key.
    pub fn back(&self, collection: &str) -> &[BackRelation] {
        self.back.get(collection).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve one expand segment on `collection`: forward fields win over
    /// back-relation keys.
    pub fn lookup(&self, collection: &str, segment: &str) -> Option<RelationHop<'_>> {
        if let Some(rel) = self
            .forward(collection)
            .iter()
            .find(|r| r.field_name == segment)
        {
            return Some(RelationHop {
                collection: &rel.target_collection,
                is_multi: rel.is_multi,
            });
        }

        self.back(collection)
            .iter()
            .find(|r| r.key() == segment)
            .map(|r| RelationHop {
                collection: &r.source_collection,
                is_multi: r.is_multi,
            })
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.forward.contains_key(collection)
    }

    /// Collection names known to the graph, sorted.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.forward.keys().map(String::as_str)
    }
}

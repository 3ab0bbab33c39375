//! Regeneration triggers.
//!
//! A host calls [`TypegenPlugin::on_startup`] once and
//! [`TypegenPlugin::on_collection_change`] after every committed collection
//! mutation. Failures are logged and swallowed so the host keeps serving.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::generator::{GenerateOutcome, TypeGenerator};
use crate::source::SchemaSource;
use crate::types::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeAction::Create => "create",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// A committed create, update or delete of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEvent {
    pub action: ChangeAction,
    pub collection: String,
}

impl CollectionEvent {
    pub fn new(action: ChangeAction, collection: impl Into<String>) -> Self {
        Self {
            action,
            collection: collection.into(),
        }
    }
}

pub struct TypegenPlugin<S> {
    source: S,
    config: Config,
    generator: TypeGenerator,
}

impl<S: SchemaSource> TypegenPlugin<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self {
            source,
            config,
            generator: TypeGenerator::new(),
        }
    }

    /// Like [`TypegenPlugin::new`], but an up-to-date artifact left by an
    /// earlier run is not rewritten.
    pub fn resume(source: S, config: Config) -> Self {
        let generator = TypeGenerator::from_existing(&config);
        Self {
            source,
            config,
            generator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn generator(&self) -> &TypeGenerator {
        &self.generator
    }

    /// Startup hook. Does nothing unless `generate_on_startup` is set.
    pub fn on_startup(&self) -> Option<GenerateOutcome> {
        if !self.config.generate_on_startup {
            return None;
        }
        match self.generator.generate(&self.source, &self.config) {
            Ok(outcome) => {
                info!(
                    path = %self.config.output_path().display(),
                    written = outcome.is_written(),
                    "Generated TypeScript types"
                );
                Some(outcome)
            }
            Err(err) => {
                warn!(error = %err, "Failed to generate TypeScript types on startup");
                None
            }
        }
    }

    /// Mutation hook: every create, update or delete triggers a full pass.
    pub fn on_collection_change(&self, event: &CollectionEvent) -> Option<GenerateOutcome> {
        match self.generator.generate(&self.source, &self.config) {
            Ok(outcome) => {
                debug!(
                    collection = %event.collection,
                    action = %event.action,
                    written = outcome.is_written(),
                    "Regenerated TypeScript types"
                );
                Some(outcome)
            }
            Err(err) => {
                warn!(
                    collection = %event.collection,
                    action = %event.action,
                    error = %err,
                    "Failed to regenerate TypeScript types"
                );
                None
            }
        }
    }
}

/// Events turning `old` into `new`. Collections are matched by id, so a
/// rename is an update; events come out ordered by collection name.
pub fn diff_snapshots(old: &[Collection], new: &[Collection]) -> Vec<CollectionEvent> {
    let old_by_id: BTreeMap<&str, &Collection> = old.iter().map(|c| (c.id.as_str(), c)).collect();
    let new_by_id: BTreeMap<&str, &Collection> = new.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut events = Vec::new();
    for (id, coll) in &new_by_id {
        match old_by_id.get(id) {
            None => events.push(CollectionEvent::new(ChangeAction::Create, &coll.name)),
            Some(prev) if prev != coll => {
                events.push(CollectionEvent::new(ChangeAction::Update, &coll.name))
            }
            Some(_) => {}
        }
    }
    for (id, coll) in &old_by_id {
        if !new_by_id.contains_key(id) {
            events.push(CollectionEvent::new(ChangeAction::Delete, &coll.name));
        }
    }

    events.sort_by(|a, b| {
        a.collection
            .cmp(&b.collection)
            .then(a.action.cmp(&b.action))
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::source::StaticSource;
    use crate::types::{CollectionKind, Field, FieldKind};

    fn collection(id: &str, name: &str, fields: Vec<Field>) -> Collection {
        Collection {
            id: id.into(),
            name: name.into(),
            kind: CollectionKind::Base,
            fields,
            indexes: vec![],
        }
    }

    #[test]
    fn startup_respects_flag() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = TypegenPlugin::new(StaticSource::default(), Config::new(dir.path()));
        assert_eq!(plugin.on_startup(), None);
        assert!(!plugin.config().output_path().exists());

        let plugin = TypegenPlugin::new(
            StaticSource::default(),
            Config::new(dir.path()).with_generate_on_startup(true),
        );
        assert!(plugin.on_startup().unwrap().is_written());
        assert!(plugin.config().output_path().is_file());
    }

    #[test]
    fn change_hook_swallows_failures() {
        let dir = tempfile::tempdir().unwrap();
        let source = || -> Result<Vec<Collection>, SourceError> {
            Err(SourceError::Unavailable("closed".into()))
        };
        let plugin = TypegenPlugin::new(source, Config::new(dir.path()));
        let event = CollectionEvent::new(ChangeAction::Delete, "apps");
        assert_eq!(plugin.on_collection_change(&event), None);
        assert_eq!(plugin.generator().last_digest(), None);
    }

    #[test]
    fn concurrent_changes_produce_one_write() {
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource::new(vec![collection(
            "c1",
            "apps",
            vec![Field::new("name", FieldKind::Text)],
        )]);
        let plugin = TypegenPlugin::new(source, Config::new(dir.path()));
        let plugin = &plugin;

        let outcomes: Vec<GenerateOutcome> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(move || {
                        plugin
                            .on_collection_change(&CollectionEvent::new(
                                ChangeAction::Update,
                                "apps",
                            ))
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(outcomes.iter().filter(|o| o.is_written()).count(), 1);
        assert!(outcomes.windows(2).all(|w| w[0].digest() == w[1].digest()));
    }

    #[test]
    fn diff_detects_create_update_delete() {
        let old = vec![
            collection("c1", "apps", vec![]),
            collection("c2", "branches", vec![]),
            collection("c3", "tags", vec![]),
        ];
        let new = vec![
            collection("c1", "apps", vec![Field::new("name", FieldKind::Text)]),
            collection("c3", "tags", vec![]),
            collection("c4", "app_builds", vec![]),
        ];

        assert_eq!(
            diff_snapshots(&old, &new),
            vec![
                CollectionEvent::new(ChangeAction::Create, "app_builds"),
                CollectionEvent::new(ChangeAction::Update, "apps"),
                CollectionEvent::new(ChangeAction::Delete, "branches"),
            ]
        );
    }

    #[test]
    fn rename_is_an_update() {
        let old = vec![collection("c1", "builds", vec![])];
        let new = vec![collection("c1", "app_builds", vec![])];
        assert_eq!(
            diff_snapshots(&old, &new),
            vec![CollectionEvent::new(ChangeAction::Update, "app_builds")]
        );
    }
}

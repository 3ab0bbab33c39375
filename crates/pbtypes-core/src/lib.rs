pub mod catalogs;
pub mod config;
pub mod emitter;
pub mod error;
pub mod expand;
pub mod generator;
pub mod indexes;
pub mod plugin;
pub mod relations;
pub mod source;
pub mod ts_writer;
pub mod types;

pub use catalogs::OUTPUT_FILE_NAME;
pub use config::Config;
pub use emitter::build_content;
pub use error::{EmitError, SourceError, TypegenError};
pub use expand::{resolve_expand, ExpandShape, ExpandType};
pub use generator::{GenerateOutcome, TypeGenerator};
pub use plugin::{diff_snapshots, ChangeAction, CollectionEvent, TypegenPlugin};
pub use relations::RelationGraph;
pub use source::{parse_snapshot, JsonSnapshotSource, SchemaSource, StaticSource};
pub use types::*;

use std::path::PathBuf;

use pbtypes_core::source::read_snapshot_file;
use pbtypes_core::{
    parse_snapshot, CollectionKind, FieldKind, FileOptions, JsonSnapshotSource, RelationOptions,
    SchemaSource, SelectOptions,
};
use pretty_assertions::assert_eq;

fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../samples")
}

#[test]
fn export_file_field_options() {
    let collections =
        read_snapshot_file(&samples_dir().join("launcher/collections.json")).unwrap();
    let builds = collections.iter().find(|c| c.name == "app_builds").unwrap();

    assert_eq!(builds.kind, CollectionKind::Base);
    let kinds: Vec<&FieldKind> = builds.fields.iter().map(|f| &f.kind).collect();
    assert_eq!(
        kinds,
        [
            &FieldKind::Text,
            &FieldKind::Relation(RelationOptions {
                collection_id: "pbc_apps".into(),
                max_select: 1,
            }),
            &FieldKind::Relation(RelationOptions {
                collection_id: "pbc_branches".into(),
                max_select: 1,
            }),
            &FieldKind::Select(SelectOptions {
                values: vec!["windows-x86_64".into(), "linux-x86_64".into()],
                max_select: 1,
            }),
            &FieldKind::File(FileOptions { max_select: 99 }),
            &FieldKind::Editor,
            &FieldKind::Number,
            &FieldKind::Autodate,
        ]
    );
    assert_eq!(builds.indexes.len(), 1);
}

#[test]
fn collection_types() {
    let collections =
        read_snapshot_file(&samples_dir().join("launcher/collections.json")).unwrap();
    let kind_of = |name: &str| collections.iter().find(|c| c.name == name).unwrap().kind;
    assert_eq!(kind_of("users"), CollectionKind::Auth);
    assert_eq!(kind_of("apps"), CollectionKind::Base);
    assert_eq!(kind_of("build_stats"), CollectionKind::View);
}

#[test]
fn directory_snapshot_mixes_export_styles() {
    let collections = JsonSnapshotSource::new(samples_dir().join("blog"))
        .load_collections()
        .unwrap();
    let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["authors", "posts", "tags"]);

    let posts = &collections[1];
    assert_eq!(posts.fields.last().unwrap().kind, FieldKind::GeoPoint);
}

#[test]
fn missing_and_null_options_default() {
    let collections = parse_snapshot(
        r#"[{"id": "c1", "name": "notes", "fields": [
            {"name": "kind", "type": "select", "values": null, "maxSelect": null},
            {"name": "ref", "type": "relation"}
        ]}]"#,
    )
    .unwrap();

    let notes = &collections[0];
    assert_eq!(notes.kind, CollectionKind::Base);
    assert!(notes.indexes.is_empty());
    assert_eq!(
        notes.fields[0].kind,
        FieldKind::Select(SelectOptions::default())
    );
    assert_eq!(
        notes.fields[1].kind,
        FieldKind::Relation(RelationOptions::default())
    );
}

#[test]
fn rejects_non_collection_json() {
    assert!(parse_snapshot(r#"{"message": "Unauthorized"}"#).is_err());
}

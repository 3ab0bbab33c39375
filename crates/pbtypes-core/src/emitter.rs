//! Declaration emitter: renders the full `pocketbase-types.ts` text from a
//! collection snapshot.
//!
//! Output is a pure function of the snapshot. Collections are emitted sorted
//! by name and back-relations sorted by key, so neither input order nor map
//! iteration order leaks into the text.

use tracing::warn;

use crate::catalogs::{is_ts_identifier, pascal_case, AUTH_IDENTITY_FIELDS, SYSTEM_FIELDS};
use crate::error::EmitError;
use crate::expand::write_expand_rules;
use crate::relations::RelationGraph;
use crate::ts_writer::{property_key, string_literal, TsWriter};
use crate::types::{Collection, Field, FieldKind};

/// Suffixes of the declarations emitted once per collection.
const COLLECTION_TYPE_SUFFIXES: &[&str] = &[
    "Record",
    "Response",
    "Relations",
    "BackRelations",
    "Create",
    "Update",
];

/// Names that are visible inside a record interface.
const RECORD_SCOPE_NAMES: &[&str] = &[
    "Expand",
    "RecordIdString",
    "AutodateString",
    "HTMLString",
    "Email",
    "URL",
    "GeoPoint",
];

/// Imports and file-level declarations shared by every collection.
const FILE_SCOPE_NAMES: &[&str] = &[
    "PocketBase",
    "RecordService",
    "ListResult",
    "RecordSubscription",
    "UnsubscribeFunc",
    "RecordOptions",
    "RecordListOptions",
    "RecordFullListOptions",
    "RecordSubscribeOptions",
    "RecordIdString",
    "AutodateString",
    "HTMLString",
    "Email",
    "URL",
    "GeoPoint",
    "BaseSystemFields",
    "AuthSystemFields",
    "SystemFields",
    "RecordCreate",
    "RecordUpdate",
    "RecordOptionsWithExpand",
    "RecordListOptionsWithExpand",
    "RecordFullListOptionsWithExpand",
    "RecordSubscribeOptionsWithExpand",
    "Collections",
    "CollectionNames",
    "AllResponses",
    "CollectionRecords",
    "CollectionResponses",
    "CollectionCreates",
    "CollectionUpdates",
    "CollectionRelations",
    "CollectionBackRelations",
    "WithExpand",
    "TypedRecordService",
    "TypedPocketBase",
    "Split",
    "TrimLeft",
    "TrimRight",
    "Trim",
    "SplitPath",
    "GetFirstPathSegment",
    "GetRelationInfo",
    "ResolveSimpleExpandField",
    "WithNestedExpand",
    "ResolveNestedExpand",
    "ResolveExpandField",
    "BuildExpandFromList",
    "InferExpand",
];

/// Render the complete declaration file for `collections`.
pub fn build_content(collections: &[Collection]) -> String {
    let mut sorted: Vec<&Collection> = Vec::with_capacity(collections.len());
    for coll in collections {
        match check_collection(coll) {
            Ok(()) => sorted.push(coll),
            Err(err) => warn!(
                collection = %coll.name,
                error = %err,
                "Failed to generate types for collection"
            ),
        }
    }
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let emitted: Vec<Collection> = sorted.iter().map(|c| (*c).clone()).collect();
    let graph = RelationGraph::build(&emitted);

    let emitter = Emitter {
        collections: sorted,
        graph: &graph,
    };
    emitter.render()
}

/// Per-collection precondition for emission: every declaration name is
/// derived from the PascalCase collection name.
pub fn check_collection(coll: &Collection) -> Result<(), EmitError> {
    let name = pascal_case(&coll.name);
    let clashes = COLLECTION_TYPE_SUFFIXES
        .iter()
        .any(|suffix| FILE_SCOPE_NAMES.contains(&format!("{name}{suffix}").as_str()));
    if is_ts_identifier(&name) && !clashes {
        Ok(())
    } else {
        Err(EmitError::InvalidIdentifier {
            collection: coll.name.clone(),
        })
    }
}

struct Emitter<'a> {
    collections: Vec<&'a Collection>,
    graph: &'a RelationGraph,
}

impl Emitter<'_> {
    fn render(&self) -> String {
        let mut w = TsWriter::new();

        write_file_header(&mut w);
        write_imports(&mut w);

        write_branded_types(&mut w);
        write_base_interfaces(&mut w);
        write_utility_types(&mut w);

        self.write_collections_const(&mut w);
        self.write_select_values(&mut w);

        self.write_record_types(&mut w);
        self.write_response_types(&mut w);

        self.write_relation_schemas(&mut w);

        self.write_create_types(&mut w);
        self.write_update_types(&mut w);

        self.write_union_types(&mut w);
        self.write_collection_maps(&mut w);
        self.write_collection_relation_maps(&mut w);

        write_expand_rules(&mut w);

        self.write_type_guards(&mut w);

        write_expandable_option_types(&mut w);
        write_typed_record_service(&mut w);
        write_typed_pocketbase(&mut w);

        w.into_string()
    }

    fn non_view(&self) -> impl Iterator<Item = &&Collection> {
        self.collections.iter().filter(|c| !c.is_view())
    }

    // -----------------------------------------------------------------------
    // Collections const and select value sets
    // -----------------------------------------------------------------------

    fn write_collections_const(&self, w: &mut TsWriter) {
        if self.collections.is_empty() {
            w.export_type("Collections", "never");
            w.blank_line();
            return;
        }

        w.line("export const Collections = {");
        w.indent();
        for coll in &self.collections {
            w.line(format!(
                "{}: {},",
                pascal_case(&coll.name),
                string_literal(&coll.name)
            ));
        }
        w.end_block_as_const();
        w.blank_line();

        w.export_type("Collections", "typeof Collections[keyof typeof Collections]");
        w.blank_line();
    }

    fn write_select_values(&self, w: &mut TsWriter) {
        for coll in &self.collections {
            for field in &coll.fields {
                let FieldKind::Select(opts) = &field.kind else {
                    continue;
                };
                if opts.values.is_empty() {
                    continue;
                }

                let base = select_base_name(&coll.name, &field.name);
                let values: Vec<String> = opts.values.iter().map(|v| string_literal(v)).collect();
                w.export_const_as(&format!("{base}Values"), &format!("[{}]", values.join(", ")));
                w.export_type(
                    &format!("{base}Options"),
                    &format!("typeof {base}Values[number]"),
                );
                w.blank_line();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Record and response shapes
    // -----------------------------------------------------------------------

    fn write_record_types(&self, w: &mut TsWriter) {
        for coll in &self.collections {
            let name = pascal_case(&coll.name);
            let generics = json_generics(coll);
            let params = if generics.is_empty() {
                String::new()
            } else {
                let list: Vec<String> = generics
                    .iter()
                    .map(|(_, param)| format!("{param} = unknown"))
                    .collect();
                format!("<{}>", list.join(", "))
            };

            w.begin_export_interface(&format!("{name}Record"), &params, "");
            for field in &coll.fields {
                if !in_record_shape(coll, field) {
                    continue;
                }
                let generic = generics
                    .iter()
                    .find(|(field_name, _)| *field_name == field.name)
                    .map(|(_, param)| param.as_str());
                w.field(
                    &field.name,
                    &field_type(&coll.name, field, generic),
                    !field.is_required(),
                );
            }
            w.end_block_semi();
            w.blank_line();
        }
    }

    fn write_response_types(&self, w: &mut TsWriter) {
        for coll in &self.collections {
            let name = pascal_case(&coll.name);
            let generics = json_generics(coll);

            let mut params: Vec<String> = generics
                .iter()
                .map(|(_, param)| format!("{param} = unknown"))
                .collect();
            params.push("Expand = {}".to_string());

            let args = if generics.is_empty() {
                String::new()
            } else {
                let list: Vec<&str> = generics.iter().map(|(_, p)| p.as_str()).collect();
                format!("<{}>", list.join(", "))
            };

            let mut extends = format!("{name}Record{args}, BaseSystemFields");
            if coll.is_auth() {
                extends.push_str(", AuthSystemFields");
            }

            w.begin_export_interface(
                &format!("{name}Response"),
                &format!("<{}>", params.join(", ")),
                &extends,
            );
            w.field("collectionId", "string", false);
            w.field("collectionName", &string_literal(&coll.name), false);
            w.field("expand", "Expand", true);
            w.end_block_semi();
            w.blank_line();
        }
    }

    // -----------------------------------------------------------------------
    // Relation schemas
    // -----------------------------------------------------------------------

    fn write_relation_schemas(&self, w: &mut TsWriter) {
        for coll in &self.collections {
            let name = pascal_case(&coll.name);

            let forward = self.graph.forward(&coll.name);
            if forward.is_empty() {
                w.export_type(&format!("{name}Relations"), "{}");
            } else {
                w.begin_export_type(&format!("{name}Relations"));
                for rel in forward {
                    w.line(format!(
                        "{}: {};",
                        property_key(&rel.field_name),
                        relation_entry(&rel.target_collection, rel.is_multi)
                    ));
                }
                w.end_block_semi();
            }
            w.blank_line();

            let back = self.graph.back(&coll.name);
            if back.is_empty() {
                w.export_type(&format!("{name}BackRelations"), "{}");
            } else {
                w.begin_export_type(&format!("{name}BackRelations"));
                for rel in back {
                    w.line(format!(
                        "{}: {};",
                        string_literal(&rel.key()),
                        relation_entry(&rel.source_collection, rel.is_multi)
                    ));
                }
                w.end_block_semi();
            }
            w.blank_line();
        }
    }

    // -----------------------------------------------------------------------
    // Create / update shapes
    // -----------------------------------------------------------------------

    fn write_create_types(&self, w: &mut TsWriter) {
        for coll in self.non_view() {
            let name = pascal_case(&coll.name);
            if coll.is_auth() {
                w.line(format!("export type {name}Create = {name}Record & {{"));
                w.indent();
                w.field("id", "string", true);
                w.field("email", "string", false);
                w.field("password", "string", false);
                w.field("passwordConfirm", "string", true);
                w.end_block_semi();
            } else {
                w.export_type(
                    &format!("{name}Create"),
                    &format!("{name}Record & {{ id?: string }}"),
                );
            }
            w.blank_line();
        }
    }

    fn write_update_types(&self, w: &mut TsWriter) {
        for coll in self.non_view() {
            let name = pascal_case(&coll.name);
            if coll.is_auth() {
                w.line(format!("export type {name}Update = Partial<{name}Record> & {{"));
                w.indent();
                w.field("email", "string", true);
                w.field("password", "string", true);
                w.field("passwordConfirm", "string", true);
                w.field("oldPassword", "string", true);
                w.end_block_semi();
            } else {
                w.export_type(
                    &format!("{name}Update"),
                    &format!("Partial<{name}Record>"),
                );
            }
            w.blank_line();
        }
    }

    // -----------------------------------------------------------------------
    // Unions and lookup maps
    // -----------------------------------------------------------------------

    fn write_union_types(&self, w: &mut TsWriter) {
        let (responses, names) = if self.collections.is_empty() {
            ("never".to_string(), "never".to_string())
        } else {
            let responses: Vec<String> = self
                .collections
                .iter()
                .map(|c| format!("{}Response", pascal_case(&c.name)))
                .collect();
            let names: Vec<String> = self
                .collections
                .iter()
                .map(|c| string_literal(&c.name))
                .collect();
            (responses.join(" | "), names.join(" | "))
        };

        w.export_type("AllResponses", &responses);
        w.blank_line();
        w.export_type("CollectionNames", &names);
        w.blank_line();
    }

    fn write_collection_maps(&self, w: &mut TsWriter) {
        let all: Vec<&Collection> = self.collections.clone();
        let writable: Vec<&Collection> = self.non_view().copied().collect();

        for (map_name, suffix, colls) in [
            ("CollectionRecords", "Record", &all),
            ("CollectionResponses", "Response", &all),
            ("CollectionCreates", "Create", &writable),
            ("CollectionUpdates", "Update", &writable),
        ] {
            write_name_map(w, map_name, suffix, colls);
        }
    }

    fn write_collection_relation_maps(&self, w: &mut TsWriter) {
        write_name_map(w, "CollectionRelations", "Relations", &self.collections);
        write_name_map(w, "CollectionBackRelations", "BackRelations", &self.collections);
    }

    fn write_type_guards(&self, w: &mut TsWriter) {
        for coll in &self.collections {
            let name = pascal_case(&coll.name);
            w.begin_export_function(&format!(
                "is{name}Response(record: AllResponses): record is {name}Response"
            ));
            w.line(format!(
                "return record.collectionName === {};",
                string_literal(&coll.name)
            ));
            w.end_block();
            w.blank_line();
        }
    }
}

// ---------------------------------------------------------------------------
// Field mapping
// ---------------------------------------------------------------------------

/// Whether a field belongs to the authored record shape.
pub fn in_record_shape(coll: &Collection, field: &Field) -> bool {
    if SYSTEM_FIELDS.contains(&field.name.as_str()) {
        return false;
    }
    if coll.is_auth() && AUTH_IDENTITY_FIELDS.contains(&field.name.as_str()) {
        return false;
    }
    !matches!(field.kind, FieldKind::Password)
}

/// TypeScript type of a field. `generic` is the generic slot a json field was
/// promoted to, if any.
pub fn field_type(collection: &str, field: &Field, generic: Option<&str>) -> String {
    match &field.kind {
        FieldKind::Text | FieldKind::Password => "string".into(),
        FieldKind::Editor => "HTMLString".into(),
        FieldKind::Email => "Email".into(),
        FieldKind::Url => "URL".into(),
        FieldKind::Date => "string".into(),
        FieldKind::Autodate => "AutodateString".into(),
        FieldKind::Select(opts) => {
            let base = if opts.values.is_empty() {
                "string".to_string()
            } else {
                format!("{}Options", select_base_name(collection, &field.name))
            };
            array_if(base, opts.is_multi())
        }
        FieldKind::Number => "number".into(),
        FieldKind::Bool => {
            if field.required {
                "true".into()
            } else {
                "boolean".into()
            }
        }
        FieldKind::Json => generic.unwrap_or("any").into(),
        FieldKind::Relation(opts) => array_if("RecordIdString".into(), opts.is_multi()),
        FieldKind::File(opts) => array_if("string".into(), opts.is_multi()),
        FieldKind::GeoPoint => "GeoPoint".into(),
        FieldKind::Unknown(_) => "any".into(),
    }
}

/// Generic slots for json fields: `(field name, parameter name)` in field
/// order. Names that would clash with another slot, with the response's
/// `Expand` parameter, or that are not identifiers stay untyped.
pub fn json_generics(coll: &Collection) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for name in coll.json_field_names() {
        if !in_record_shape(coll, &Field::new(name, FieldKind::Json)) {
            continue;
        }
        let param = pascal_case(name);
        if RECORD_SCOPE_NAMES.contains(&param.as_str())
            || !is_ts_identifier(&param)
            || out.iter().any(|(_, p)| *p == param)
        {
            continue;
        }
        out.push((name.to_string(), param));
    }
    out
}

fn select_base_name(collection: &str, field: &str) -> String {
    format!("{}{}", pascal_case(collection), pascal_case(field))
}

fn array_if(ty: String, multi: bool) -> String {
    if multi {
        format!("{ty}[]")
    } else {
        ty
    }
}

fn relation_entry(collection: &str, is_multi: bool) -> String {
    format!(
        "{{ response: {}Response; isMulti: {is_multi}; collection: {} }}",
        pascal_case(collection),
        string_literal(collection)
    )
}

fn write_name_map(w: &mut TsWriter, map_name: &str, suffix: &str, colls: &[&Collection]) {
    if colls.is_empty() {
        w.export_type(map_name, "{}");
        w.blank_line();
        return;
    }
    w.begin_export_type(map_name);
    for coll in colls {
        w.line(format!(
            "{}: {}{suffix};",
            string_literal(&coll.name),
            pascal_case(&coll.name)
        ));
    }
    w.end_block_semi();
    w.blank_line();
}

// ---------------------------------------------------------------------------
// Fixed preamble and client surface
// ---------------------------------------------------------------------------

fn write_file_header(w: &mut TsWriter) {
    w.raw_line("/**");
    w.raw_line(" * PocketBase TypeScript Types");
    w.raw_line(" * Auto-generated - DO NOT EDIT");
    w.raw_line(" */");
    w.blank_line();
}

fn write_imports(w: &mut TsWriter) {
    w.raw_line("import PocketBase, {");
    w.indent();
    for name in [
        "RecordService,",
        "type ListResult,",
        "type RecordSubscription,",
        "type UnsubscribeFunc,",
        "type RecordOptions,",
        "type RecordListOptions,",
        "type RecordFullListOptions,",
        "type RecordSubscribeOptions,",
    ] {
        w.line(name);
    }
    w.dedent();
    w.raw_line("} from 'pocketbase';");
    w.blank_line();
}

fn write_branded_types(w: &mut TsWriter) {
    for (name, brand) in [
        ("RecordIdString", "__recordId"),
        ("AutodateString", "__autodate"),
        ("HTMLString", "__html"),
        ("Email", "__email"),
        ("URL", "__url"),
    ] {
        w.export_type(name, &format!("string & {{ readonly {brand}: unique symbol }}"));
    }
    w.blank_line();

    w.begin_export_interface("GeoPoint", "", "");
    w.field("lat", "number", false);
    w.field("lon", "number", false);
    w.end_block_semi();
    w.blank_line();
}

fn write_base_interfaces(w: &mut TsWriter) {
    w.begin_export_interface("BaseSystemFields", "", "");
    w.field("id", "RecordIdString", false);
    w.field("created", "AutodateString", false);
    w.field("updated", "AutodateString", false);
    w.end_block_semi();
    w.blank_line();

    w.begin_export_interface("AuthSystemFields", "", "");
    w.field("email", "Email", false);
    w.field("emailVisibility", "boolean", false);
    w.field("verified", "boolean", false);
    w.end_block_semi();
    w.blank_line();
}

fn write_utility_types(w: &mut TsWriter) {
    w.export_type(
        "SystemFields",
        "keyof BaseSystemFields | 'collectionId' | 'collectionName' | 'expand'",
    );
    w.blank_line();
    w.export_type("RecordCreate<T>", "Omit<T, SystemFields> & { id?: string }");
    w.export_type("RecordUpdate<T>", "Partial<Omit<T, SystemFields>>");
    w.blank_line();
}

fn write_expandable_option_types(w: &mut TsWriter) {
    for base in [
        "RecordOptions",
        "RecordListOptions",
        "RecordFullListOptions",
        "RecordSubscribeOptions",
    ] {
        w.export_type(
            &format!("{base}WithExpand<E extends string = \"\">"),
            &format!("Omit<{base}, 'expand'> & {{ expand?: E }}"),
        );
    }
    w.blank_line();
}

fn write_typed_record_service(w: &mut TsWriter) {
    const RESULT: &str = "WithExpand<CollectionResponses[C], InferExpand<C, E>>";

    w.export_type("WithExpand<T, E>", "Omit<T, 'expand'> & { expand?: E }");
    w.blank_line();

    w.begin_export_interface("TypedRecordService<C extends Collections>", "", "");

    let methods: [(&str, &[&str], String); 7] = [
        (
            "getOne",
            &["id: string,", "options?: RecordOptionsWithExpand<E>"],
            format!("Promise<{RESULT}>"),
        ),
        (
            "getList",
            &[
                "page?: number,",
                "perPage?: number,",
                "options?: RecordListOptionsWithExpand<E>",
            ],
            format!("Promise<ListResult<{RESULT}>>"),
        ),
        (
            "getFirstListItem",
            &["filter: string,", "options?: RecordListOptionsWithExpand<E>"],
            format!("Promise<{RESULT}>"),
        ),
        (
            "getFullList",
            &["options?: RecordFullListOptionsWithExpand<E>"],
            format!("Promise<{RESULT}[]>"),
        ),
        (
            "create",
            &[
                "bodyOrRecord: C extends keyof CollectionCreates ? CollectionCreates[C] | FormData : FormData,",
                "options?: RecordOptionsWithExpand<E>",
            ],
            format!("Promise<{RESULT}>"),
        ),
        (
            "update",
            &[
                "id: string,",
                "bodyOrRecord: C extends keyof CollectionUpdates ? CollectionUpdates[C] | FormData : FormData,",
                "options?: RecordOptionsWithExpand<E>",
            ],
            format!("Promise<{RESULT}>"),
        ),
        (
            "subscribe",
            &[
                "topic: string,",
                "callback: (data: RecordSubscription<WithExpand<CollectionResponses[C], InferExpand<C, E>>>) => void,",
                "options?: RecordSubscribeOptionsWithExpand<E>",
            ],
            "Promise<UnsubscribeFunc>".to_string(),
        ),
    ];

    for (i, (name, args, ret)) in methods.iter().enumerate() {
        if i > 0 {
            w.blank_line();
        }
        w.line(format!("{name}<E extends string = \"\">("));
        w.indent();
        for arg in *args {
            w.line(arg);
        }
        w.dedent();
        w.line(format!("): {ret};"));
    }

    w.end_block_semi();
    w.blank_line();
}

fn write_typed_pocketbase(w: &mut TsWriter) {
    w.begin_export_interface("TypedPocketBase", "", "PocketBase");
    w.line("collection<C extends Collections>(idOrName: C): TypedRecordService<C> & RecordService<CollectionResponses[C]>;");
    w.line("collection(idOrName: string): RecordService;");
    w.end_block_semi();
}

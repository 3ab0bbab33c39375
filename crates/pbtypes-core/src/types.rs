use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Base,
    Auth,
    View,
}

/// A collection descriptor as exported by the PocketBase admin API
/// (`GET /api/collections` or the "Export collections" JSON).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CollectionKind,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub indexes: Vec<String>,
}

impl Collection {
    pub fn is_auth(&self) -> bool {
        self.kind == CollectionKind::Auth
    }

    pub fn is_view(&self) -> bool {
        self.kind == CollectionKind::View
    }

    /// Relation fields in declaration order, paired with their options.
    pub fn relation_fields(&self) -> impl Iterator<Item = (&Field, &RelationOptions)> {
        self.fields.iter().filter_map(|f| match &f.kind {
            FieldKind::Relation(opts) => Some((f, opts)),
            _ => None,
        })
    }

    /// Names of json fields; each becomes a generic slot on the record shape.
    pub fn json_field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Json))
            .map(|f| f.name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawField")]
pub struct Field {
    pub name: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            required: false,
            kind,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether the authored shape must carry a value. Autodate fields are
    /// assigned by the server, so they are never required here.
    pub fn is_required(&self) -> bool {
        match self.kind {
            FieldKind::Autodate | FieldKind::Password | FieldKind::Unknown(_) => false,
            _ => self.required,
        }
    }
}

/// Closed set of field kinds with their kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Password,
    Editor,
    Email,
    Url,
    Date,
    Autodate,
    Select(SelectOptions),
    Number,
    Bool,
    Json,
    Relation(RelationOptions),
    File(FileOptions),
    GeoPoint,
    /// A kind this generator does not know; rendered as an open type.
    Unknown(String),
}

impl FieldKind {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Editor => "editor",
            Self::Email => "email",
            Self::Url => "url",
            Self::Date => "date",
            Self::Autodate => "autodate",
            Self::Select(_) => "select",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Json => "json",
            Self::Relation(_) => "relation",
            Self::File(_) => "file",
            Self::GeoPoint => "geoPoint",
            Self::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    pub values: Vec<String>,
    pub max_select: u32,
}

impl SelectOptions {
    pub fn is_multi(&self) -> bool {
        self.max_select > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationOptions {
    pub collection_id: String,
    pub max_select: u32,
}

impl RelationOptions {
    pub fn is_multi(&self) -> bool {
        self.max_select > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileOptions {
    pub max_select: u32,
}

impl FileOptions {
    pub fn is_multi(&self) -> bool {
        self.max_select > 1
    }
}

/// Wire form of a field. Every kind-specific key is optional so one struct
/// covers all field types; unknown keys (`hidden`, `presentable`, ...) are
/// ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    values: Option<Vec<String>>,
    #[serde(default)]
    max_select: Option<u32>,
    #[serde(default)]
    collection_id: Option<String>,
}

impl From<RawField> for Field {
    fn from(raw: RawField) -> Self {
        let max_select = raw.max_select.unwrap_or_default();
        let kind = match raw.field_type.as_str() {
            "text" => FieldKind::Text,
            "password" => FieldKind::Password,
            "editor" => FieldKind::Editor,
            "email" => FieldKind::Email,
            "url" => FieldKind::Url,
            "date" => FieldKind::Date,
            "autodate" => FieldKind::Autodate,
            "select" => FieldKind::Select(SelectOptions {
                values: raw.values.unwrap_or_default(),
                max_select,
            }),
            "number" => FieldKind::Number,
            "bool" => FieldKind::Bool,
            "json" => FieldKind::Json,
            "relation" => FieldKind::Relation(RelationOptions {
                collection_id: raw.collection_id.unwrap_or_default(),
                max_select,
            }),
            "file" => FieldKind::File(FileOptions { max_select }),
            "geoPoint" => FieldKind::GeoPoint,
            other => FieldKind::Unknown(other.to_string()),
        };

        Self {
            name: raw.name,
            required: raw.required,
            kind,
        }
    }
}

use sha2::{Digest, Sha256};

/// File name of the generated declaration artifact.
pub const OUTPUT_FILE_NAME: &str = "pocketbase-types.ts";

/// Default output directory when none is configured (the process data dir).
pub const DEFAULT_DATA_DIR: &str = "pb_data";

/// Fields managed by the server on every collection; never part of a record shape.
pub const SYSTEM_FIELDS: &[&str] = &["id", "created", "updated", "collectionId", "collectionName"];

/// Identity fields of auth collections; surfaced through `AuthSystemFields` instead.
pub const AUTH_IDENTITY_FIELDS: &[&str] = &["email", "emailVisibility", "verified", "tokenKey"];

/// Join marker used in back-relation keys (`{source}_via_{field}`).
pub const VIA: &str = "_via_";

/// PascalCase a collection or field name: `app_builds` → `AppBuilds`.
pub fn pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Escape a value for use inside a double-quoted TypeScript string literal.
pub fn escape_ts_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether `name` can be used unquoted as a TypeScript identifier or property key.
pub fn is_ts_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Lowercase hex SHA-256 of the emitted text.
pub fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

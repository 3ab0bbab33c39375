//! Minimal parser for the `CREATE INDEX` statements stored on a collection.
//!
//! Only what relation multiplicity needs: uniqueness, the column list and
//! whether the index is partial.

use std::sync::LazyLock;

use regex::Regex;

static RE_INDEX_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*CREATE\s+(UNIQUE\s+)?INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?(\S+)\s+ON\s+([^\s(]+)\s*\((.*)$",
    )
    .unwrap()
});

static RE_WHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^WHERE\s+(.*?)\s*;?$").unwrap());

static RE_COLUMN_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:COLLATE\s+\S+|ASC|DESC)\b.*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub table: String,
    pub unique: bool,
    pub columns: Vec<String>,
    pub where_clause: Option<String>,
}

/// Parse a single `CREATE [UNIQUE] INDEX` statement. Returns `None` for
/// anything that does not look like one.
pub fn parse_index(sql: &str) -> Option<IndexDef> {
    let caps = RE_INDEX_HEAD.captures(sql)?;
    let (column_list, rest) = split_group(caps.get(4)?.as_str())?;

    let columns: Vec<String> = split_columns(column_list)
        .into_iter()
        .map(|c| unquote(RE_COLUMN_SUFFIX.replace(c.trim(), "").trim()).to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if columns.is_empty() {
        return None;
    }

    let rest = rest.trim().trim_end_matches(';').trim();
    let where_clause = if rest.is_empty() {
        None
    } else {
        let where_caps = RE_WHERE.captures(rest)?;
        Some(where_caps[1].to_string()).filter(|w| !w.is_empty())
    };

    Some(IndexDef {
        name: unquote(&caps[2]).to_string(),
        table: unquote(&caps[3]).to_string(),
        unique: caps.get(1).is_some(),
        columns,
        where_clause,
    })
}

/// First index that is unique over exactly `column` (case-insensitive).
/// A WHERE clause does not disqualify it: it only narrows the covered rows.
pub fn find_single_column_unique_index(indexes: &[String], column: &str) -> Option<IndexDef> {
    indexes.iter().filter_map(|sql| parse_index(sql)).find(|idx| {
        idx.unique
            && idx.columns.len() == 1
            && idx.columns[0].eq_ignore_ascii_case(column)
    })
}

/// Split `cols) tail` at the paren closing the column group.
fn split_group(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some((&s[..i], &s[i + 1..])),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split a column list on top-level commas (expressions may nest parens).
fn split_columns(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for (open, close) in [('`', '`'), ('"', '"'), ('\'', '\''), ('[', ']')] {
        if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

//! Indentation-aware text buffer for TypeScript declarations.

use crate::catalogs::{escape_ts_string, is_ts_identifier};

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct TsWriter {
    buf: String,
    indent: usize,
}

impl TsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Append a line at the current indentation.
    pub fn line(&mut self, s: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(s.as_ref());
        self.buf.push('\n');
    }

    /// Append a line ignoring the current indentation.
    pub fn raw_line(&mut self, s: &str) {
        self.buf.push_str(s);
        self.buf.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn export_type(&mut self, name: &str, definition: &str) {
        self.line(format!("export type {name} = {definition};"));
    }

    pub fn export_const_as(&mut self, name: &str, value: &str) {
        self.line(format!("export const {name} = {value} as const;"));
    }

    pub fn begin_export_interface(&mut self, name: &str, generics: &str, extends: &str) {
        let mut head = format!("export interface {name}{generics}");
        if !extends.is_empty() {
            head.push_str(" extends ");
            head.push_str(extends);
        }
        head.push_str(" {");
        self.line(head);
        self.indent();
    }

    pub fn begin_export_type(&mut self, name: &str) {
        self.line(format!("export type {name} = {{"));
        self.indent();
    }

    pub fn begin_export_function(&mut self, signature: &str) {
        self.line(format!("export function {signature} {{"));
        self.indent();
    }

    pub fn end_block(&mut self) {
        self.dedent();
        self.line("}");
    }

    pub fn end_block_semi(&mut self) {
        self.dedent();
        self.line("};");
    }

    pub fn end_block_as_const(&mut self) {
        self.dedent();
        self.line("} as const;");
    }

    /// A property line; names that are not plain identifiers are quoted.
    pub fn field(&mut self, name: &str, ty: &str, optional: bool) {
        let key = property_key(name);
        let mark = if optional { "?" } else { "" };
        self.line(format!("{key}{mark}: {ty};"));
    }
}

/// Render an object property key, quoting it when required.
pub fn property_key(name: &str) -> String {
    if is_ts_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape_ts_string(name))
    }
}

/// Render a double-quoted string literal.
pub fn string_literal(value: &str) -> String {
    format!("\"{}\"", escape_ts_string(value))
}

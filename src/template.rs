//! SQL templates with named placeholders.
//!
//! A template is a list of lines joined with `\n`. Placeholders are written
//! `{{ .name }}` (or `{{ name }}`) and refer to a field of the parameter type.
//! Rendering replaces each occurrence, in order, with the next PostgreSQL
//! style positional placeholder (`$1`, `$2`, ...) and collects the matching
//! argument values.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, RowBindError};
use crate::naming::to_column_name;
use crate::types::SqlValue;

/// Parameter values a template can refer to by name.
/// Implementations are typically generated with the `params!` macro.
pub trait Params {
    /// Names of all parameters, checked when a template is parsed.
    fn names() -> &'static [&'static str];

    /// The value of parameter `name`.
    fn value(&self, name: &str) -> Option<SqlValue>;
}

impl Params for () {
    fn names() -> &'static [&'static str] {
        &[]
    }

    fn value(&self, _name: &str) -> Option<SqlValue> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Param(&'static str),
}

/// A parsed template for parameter type `P`.
pub struct Template<P> {
    segments: Vec<Segment>,
    _params: PhantomData<fn(&P)>,
}

impl<P> fmt::Debug for Template<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("segments", &self.segments)
            .finish()
    }
}

impl<P> Clone for Template<P> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            _params: PhantomData,
        }
    }
}

impl<P: Params> Template<P> {
    /// Parses template lines, resolving every placeholder against
    /// [`Params::names`].
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let source = join_lines(lines);
        let mut segments = Vec::new();
        let mut rest = source.as_str();
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let end = after_open.find("}}").ok_or_else(|| {
                RowBindError::Template(format!("unclosed placeholder at offset {}", offset + start))
            })?;
            segments.push(Segment::Param(resolve_name::<P>(&after_open[..end])?));

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            segments,
            _params: PhantomData,
        })
    }

    /// Renders the final statement and its positional arguments.
    pub fn render(&self, params: &P) -> Result<(String, Vec<SqlValue>)> {
        let mut sql = String::with_capacity(256);
        let mut args = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => sql.push_str(text),
                Segment::Param(name) => {
                    let value = params.value(name).ok_or_else(|| {
                        RowBindError::Template(format!("no value for parameter {name}"))
                    })?;
                    args.push(value);
                    sql.push('$');
                    sql.push_str(&args.len().to_string());
                }
            }
        }

        Ok((sql, args))
    }

    /// Number of placeholders, counting repeats.
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count()
    }
}

/// Joins statement lines the way templates do.
pub(crate) fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n")
}

fn resolve_name<P: Params>(raw: &str) -> Result<&'static str> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix('.').unwrap_or(trimmed).trim();
    if name.is_empty() {
        return Err(RowBindError::Template("empty placeholder".to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RowBindError::Template(format!(
            "invalid placeholder {trimmed:?}"
        )));
    }

    let names = P::names();
    if let Some(found) = names.iter().find(|n| **n == name) {
        return Ok(*found);
    }
    // `{{ .UserId }}` refers to a `user_id` field
    let derived = to_column_name(name);
    names
        .iter()
        .find(|n| **n == derived)
        .copied()
        .ok_or_else(|| RowBindError::Template(format!("unknown parameter {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct QueryParams {
        user_id: String,
        status: i32,
    }

    crate::params!(QueryParams { user_id, status });

    fn params() -> QueryParams {
        QueryParams {
            user_id: "123".to_string(),
            status: 1,
        }
    }

    #[test]
    fn test_render_positional_arguments() {
        let tmpl = Template::<QueryParams>::parse(&[
            "SELECT user_id, first_name FROM tbl_user",
            "WHERE user_id = {{ .user_id }} AND status = {{status}}",
        ])
        .unwrap();

        let (sql, args) = tmpl.render(&params()).unwrap();
        assert_eq!(
            sql,
            "SELECT user_id, first_name FROM tbl_user\nWHERE user_id = $1 AND status = $2"
        );
        assert_eq!(args, vec![SqlValue::Text("123".to_string()), SqlValue::Int32(1)]);
    }

    #[test]
    fn test_repeated_placeholder_gets_own_position() {
        let tmpl =
            Template::<QueryParams>::parse(&["{{ .status }} OR {{ .status }}"]).unwrap();
        assert_eq!(tmpl.placeholder_count(), 2);
        let (sql, args) = tmpl.render(&params()).unwrap();
        assert_eq!(sql, "$1 OR $2");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_mixed_case_names_resolve_to_fields() {
        let tmpl = Template::<QueryParams>::parse(&["id = {{ .UserId }}"]).unwrap();
        let (sql, args) = tmpl.render(&params()).unwrap();
        assert_eq!(sql, "id = $1");
        assert_eq!(args, vec![SqlValue::Text("123".to_string())]);
    }

    #[test]
    fn test_parse_errors() {
        let unclosed = Template::<QueryParams>::parse(&["WHERE id = {{ .user_id"]);
        assert!(matches!(unclosed, Err(RowBindError::Template(_))));

        let unknown = Template::<QueryParams>::parse(&["WHERE id = {{ .missing }}"]);
        assert!(matches!(unknown, Err(RowBindError::Template(_))));

        let empty = Template::<QueryParams>::parse(&["{{ . }}"]);
        assert!(matches!(empty, Err(RowBindError::Template(_))));

        let invalid = Template::<QueryParams>::parse(&["{{ .user_id | upper }}"]);
        assert!(matches!(invalid, Err(RowBindError::Template(_))));
    }

    #[test]
    fn test_no_placeholders() {
        let tmpl = Template::<()>::parse(&["SELECT 1"]).unwrap();
        assert_eq!(tmpl.render(&()).unwrap(), ("SELECT 1".to_string(), vec![]));
    }
}

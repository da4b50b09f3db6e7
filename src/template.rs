//! Response templates compiled ahead of time.
//!
//! Templates address the rendering context through `${dot.path}`
//! placeholders, resolved with [`path::get`](crate::path::get). Compiling
//! splits the source into literal and placeholder segments once; rendering
//! never parses. A placeholder that resolves to nothing renders as the
//! empty string.

use serde_json::Value;
use thiserror::Error;

use crate::path;

/// Errors raised while compiling a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A `${` opener with no closing `}`.
    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A template compiled into literal and placeholder segments.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Compiles `source`, splitting out `${...}` placeholders.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut cursor = 0;
        while let Some(found) = source[cursor..].find("${") {
            let start = cursor + found;
            literal.push_str(&source[cursor..start]);
            let len = source[start + 2..]
                .find('}')
                .ok_or(TemplateError::Unterminated(start))?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(
                source[start + 2..start + 2 + len].to_string(),
            ));
            cursor = start + 2 + len + 1;
        }
        literal.push_str(&source[cursor..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Template { segments })
    }

    /// Renders against `context`; unresolved placeholders render empty.
    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(path) => {
                    if let Some(value) = path::get(context, path) {
                        out.push_str(&value_text(value));
                    }
                }
            }
        }
        out
    }
}

/// Textual form of a value: strings unquoted, everything else as JSON text.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

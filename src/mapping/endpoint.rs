//! Endpoint template rendering.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// Render an endpoint template by substituting `{name}` tokens with
/// top-level parameter values. Strings substitute verbatim, numbers and
/// booleans in canonical form; a token naming anything else (missing,
/// null, object, array) stays in the output unchanged.
pub fn render_endpoint(template: &str, params: &Value) -> String {
    TOKEN_REGEX
        .replace_all(template, |captures: &Captures<'_>| {
            match params.get(&captures[1]) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Number(number)) => number.to_string(),
                Some(Value::Bool(flag)) => flag.to_string(),
                _ => captures[0].to_string(),
            }
        })
        .to_string()
}

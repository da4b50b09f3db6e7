//! Global field-level transform rules.

use crate::config::TransformRule;
use crate::engine::CompileError;
use crate::path;
use crate::template::value_text;
use regex::Regex;
use serde_json::Value;

/// One transform rule compiled for application.
#[derive(Debug)]
pub struct CompiledRule {
    config: TransformRule,
    regex: Option<Regex>,
}

impl CompiledRule {
    /// Compile a rule from configuration. An empty regex disables the
    /// capture step.
    pub fn compile(config: &TransformRule) -> Result<Self, CompileError> {
        let regex = if config.regex.is_empty() {
            None
        } else {
            Some(
                Regex::new(&config.regex).map_err(|source| CompileError::RuleRegex {
                    pattern: config.regex.clone(),
                    source,
                })?,
            )
        };
        Ok(Self {
            config: config.clone(),
            regex,
        })
    }

    /// Apply this rule: read `source` from the original source document,
    /// optionally narrow it to the regex's first capture group (strings
    /// only), optionally splice it into the template's `{value}`
    /// placeholder, then write the result at `target`. Rules always read
    /// the fixed source document, never another rule's output.
    pub fn apply(&self, source_doc: &Value, target_doc: &mut Value) {
        let Some(found) = path::get(source_doc, &self.config.source).filter(|v| !v.is_null())
        else {
            return;
        };
        let mut value = found.clone();

        if let (Some(regex), Value::String(text)) = (self.regex.as_ref(), &value) {
            if let Some(capture) = regex.captures(text).and_then(|c| c.get(1)) {
                value = Value::String(capture.as_str().to_string());
            }
        }

        if !self.config.template.is_empty() {
            value = Value::String(self.config.template.replace("{value}", &value_text(&value)));
        }

        path::set(target_doc, &self.config.target, value);
    }
}

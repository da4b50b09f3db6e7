//! Parameter extraction from tasks.

use crate::config::ParameterMapping;
use crate::engine::CompileError;
use crate::path;
use regex::Regex;
use serde_json::Value;

/// One parameter mapping compiled for extraction.
#[derive(Debug)]
pub struct CompiledParameter {
    config: ParameterMapping,
    pattern: Option<Regex>,
}

impl CompiledParameter {
    /// Compile a parameter mapping from configuration. An empty pattern
    /// compiles to none at all, so a text-sourced parameter without a
    /// pattern never captures.
    pub fn compile(config: &ParameterMapping) -> Result<Self, CompileError> {
        let pattern = if config.pattern.is_empty() {
            None
        } else {
            Some(
                Regex::new(&config.pattern).map_err(|source| CompileError::ParameterPattern {
                    pattern: config.pattern.clone(),
                    source,
                })?,
            )
        };
        Ok(Self {
            config: config.clone(),
            pattern,
        })
    }

    /// Extract this parameter into `params`. The literal source `text`
    /// captures from the message text; any other source is a dot-path into
    /// the task document. When neither yields a value, a non-empty default
    /// is written instead; otherwise the parameter is omitted entirely.
    pub fn extract(&self, task: &Value, text: &str, params: &mut Value) {
        let value = if self.config.source == "text" {
            self.capture(text).map(Value::String)
        } else {
            // An explicit null behaves like an absent value.
            path::get(task, &self.config.source)
                .filter(|value| !value.is_null())
                .cloned()
        };
        match value {
            Some(value) => path::set(params, &self.config.target, value),
            None if !self.config.default.is_empty() => path::set(
                params,
                &self.config.target,
                Value::String(self.config.default.clone()),
            ),
            None => {}
        }
    }

    fn capture(&self, text: &str) -> Option<String> {
        let pattern = self.pattern.as_ref()?;
        let captures = pattern.captures(text)?;
        Some(captures.get(1)?.as_str().to_string())
    }
}

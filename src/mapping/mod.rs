//! Compiled intent mappings.
//!
//! A [`CompiledMapping`] bundles everything one mapping needs at request
//! time: the lower-cased intent regex, the compiled parameter extractors
//! and the optional response template. Compilation happens once at
//! startup; matching and extraction never recompile anything.

mod endpoint;
mod params;

pub use endpoint::render_endpoint;
pub use params::CompiledParameter;

use crate::config::MappingConfig;
use crate::engine::CompileError;
use crate::template::Template;
use regex::Regex;
use serde_json::{Map, Value};

/// One mapping compiled for matching and extraction.
#[derive(Debug)]
pub struct CompiledMapping {
    config: MappingConfig,
    intent: Regex,
    parameters: Vec<CompiledParameter>,
    response_template: Option<Template>,
}

impl CompiledMapping {
    /// Compile a mapping from configuration. The intent pattern is
    /// lower-cased as a whole before compilation, so literal fragments
    /// match the lower-cased task text. Any invalid pattern or template
    /// is a fatal startup error.
    pub fn compile(config: &MappingConfig) -> Result<Self, CompileError> {
        let intent = Regex::new(&config.intent_pattern.to_lowercase()).map_err(|source| {
            CompileError::IntentPattern {
                pattern: config.intent_pattern.clone(),
                source,
            }
        })?;

        let parameters = config
            .parameter_mappings
            .iter()
            .map(CompiledParameter::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let response_template = match &config.response_transform {
            Some(transform) if !transform.template.is_empty() => Some(
                Template::compile(&transform.template).map_err(|source| {
                    CompileError::ResponseTemplate {
                        template: transform.template.clone(),
                        source,
                    }
                })?,
            ),
            _ => None,
        };

        Ok(Self {
            config: config.clone(),
            intent,
            parameters,
            response_template,
        })
    }

    /// The mapping configuration this was compiled from.
    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Identifier carried in request metadata for correlation. The
    /// original intent pattern doubles as the identifier.
    pub fn id(&self) -> &str {
        &self.config.intent_pattern
    }

    /// Check the intent pattern against task text. The caller lower-cases
    /// the text once per request.
    pub fn matches(&self, lowered_text: &str) -> bool {
        self.intent.is_match(lowered_text)
    }

    /// Extract all configured parameters into a fresh params object.
    /// `task` is the raw task document; `text` the joined message text.
    pub fn extract_parameters(&self, task: &Value, text: &str) -> Value {
        let mut params = Value::Object(Map::new());
        for parameter in &self.parameters {
            parameter.extract(task, text, &mut params);
        }
        params
    }

    /// Render the endpoint template with the extracted parameters.
    pub fn render_endpoint(&self, params: &Value) -> String {
        render_endpoint(&self.config.endpoint, params)
    }

    /// The compiled response template, when one is configured.
    pub fn response_template(&self) -> Option<&Template> {
        self.response_template.as_ref()
    }
}

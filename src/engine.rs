//! Startup compilation of configuration into runtime artifacts.
//!
//! [`TransformEngine::compile`] turns a validated [`BridgeConfig`] into
//! compiled mappings and transform rules. Any invalid regex or template
//! anywhere in the configuration aborts startup; nothing compiles lazily
//! on the request path.

use crate::config::BridgeConfig;
use crate::mapping::CompiledMapping;
use crate::template::TemplateError;
use crate::transform::rules::CompiledRule;
use thiserror::Error;
use tracing::info;

/// Errors raised while compiling configuration artifacts.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid intent pattern {pattern:?}: {source}")]
    IntentPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid parameter pattern {pattern:?}: {source}")]
    ParameterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid transform rule regex {pattern:?}: {source}")]
    RuleRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid response template {template:?}: {source}")]
    ResponseTemplate {
        template: String,
        #[source]
        source: TemplateError,
    },
}

/// Compiled mappings and rules, shared read-only across requests.
#[derive(Debug)]
pub struct TransformEngine {
    mappings: Vec<CompiledMapping>,
    request_rules: Vec<CompiledRule>,
    response_rules: Vec<CompiledRule>,
}

impl TransformEngine {
    /// Compile every mapping and rule in the configuration, preserving
    /// declaration order.
    pub fn compile(config: &BridgeConfig) -> Result<Self, CompileError> {
        let mappings = config
            .mappings
            .iter()
            .map(CompiledMapping::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let request_rules = config
            .transforms
            .a2a_to_legacy
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let response_rules = config
            .transforms
            .legacy_to_a2a
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            mappings = mappings.len(),
            request_rules = request_rules.len(),
            response_rules = response_rules.len(),
            "compiled transform engine"
        );

        Ok(Self {
            mappings,
            request_rules,
            response_rules,
        })
    }

    /// Find the first mapping whose intent pattern matches the text.
    /// Matching is case-insensitive; declaration order breaks ties.
    pub fn find_mapping(&self, text: &str) -> Option<&CompiledMapping> {
        let lowered = text.to_lowercase();
        self.mappings.iter().find(|mapping| mapping.matches(&lowered))
    }

    /// Look a mapping up by the identifier echoed in legacy metadata.
    pub fn mapping_by_id(&self, id: &str) -> Option<&CompiledMapping> {
        self.mappings.iter().find(|mapping| mapping.id() == id)
    }

    /// Compiled mappings in declaration order.
    pub fn mappings(&self) -> &[CompiledMapping] {
        &self.mappings
    }

    /// Rules applied after task-to-legacy transformation.
    pub fn request_rules(&self) -> &[CompiledRule] {
        &self.request_rules
    }

    /// Rules applied after legacy-to-task transformation.
    pub fn response_rules(&self) -> &[CompiledRule] {
        &self.response_rules
    }
}

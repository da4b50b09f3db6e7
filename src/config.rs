//! Configuration types for the bridge.
//!
//! Configuration is declarative and immutable after load: it describes the
//! legacy adapter, the ordered intent mappings and the field-level
//! transform rules. `${NAME}` placeholders in the adapter section are
//! resolved against the `variables` table, which is seeded from process
//! environment variables carrying the `A2A_` or `CONNECTOR_` prefix.
//! Nothing here holds compiled artifacts; the compile pass lives in
//! [`TransformEngine`](crate::engine::TransformEngine).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Environment prefixes recognized when seeding `variables`. The full
/// environment name, prefix included, becomes the variable name.
pub const ENV_PREFIXES: [&str; 2] = ["A2A_", "CONNECTOR_"];

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported config file format: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration for the bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// Legacy system connection settings
    pub adapter: AdapterConfig,
    /// Intent mappings (evaluated in declaration order)
    pub mappings: Vec<MappingConfig>,
    /// Field-level transform rules for both directions
    pub transforms: TransformsConfig,
    /// Variables for `${NAME}` resolution
    pub variables: BTreeMap<String, String>,
}

/// Connection settings for the legacy system behind the bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdapterConfig {
    /// Adapter kind: rest, soap, db, file
    #[serde(rename = "type")]
    pub kind: String,
    /// Adapter name (for logging)
    pub name: String,
    /// Base URL of the legacy system
    pub base_url: String,
    /// Authentication settings
    pub auth: Option<AuthConfig>,
    /// Static headers injected on every intercepted request
    pub headers: BTreeMap<String, String>,
}

/// Authentication settings applied by adapters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Auth kind: basic, token, apikey
    #[serde(rename = "type")]
    pub kind: String,
    /// Username (basic)
    pub username: String,
    /// Password (basic)
    pub password: String,
    /// Token (token, apikey)
    pub token: String,
    /// Header name carrying the key (apikey)
    pub key_name: String,
}

/// One intent-to-endpoint translation unit. Mappings are evaluated in
/// declaration order; the first whose intent pattern matches wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappingConfig {
    /// Regex matched against the lower-cased task text
    pub intent_pattern: String,
    /// Endpoint template with `{name}` tokens
    pub endpoint: String,
    /// Legacy action, also the HTTP method for REST adapters
    pub method: String,
    /// How to pull values out of the task
    pub parameter_mappings: Vec<ParameterMapping>,
    /// How to build a task out of the legacy response
    pub response_transform: Option<ResponseTransform>,
}

/// How one value moves from the task into the legacy request params.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterMapping {
    /// The literal `text`, or a dot-path into the task payload
    pub source: String,
    /// Capture regex applied to the task text (first group wins)
    pub pattern: String,
    /// Dot-path into the legacy request params
    pub target: String,
    /// Fallback value; empty means no fallback
    pub default: String,
}

/// How a legacy response becomes a task message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseTransform {
    /// Text template rendered with the legacy response as context
    pub template: String,
    // The remaining fields are accepted for schema compatibility; the
    // response transform reads the top-level status/error/result keys.
    pub mappings: BTreeMap<String, String>,
    pub status_path: String,
    pub error_path: String,
}

/// One field-level copy/rewrite between documents. An empty `regex` or
/// `template` disables that step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformRule {
    /// Dot-path read from the source document
    pub source: String,
    /// Dot-path written in the target document
    pub target: String,
    /// Rewrite regex; first capture group replaces the value
    pub regex: String,
    /// Template with a literal `{value}` placeholder
    pub template: String,
}

/// Ordered rule lists for both transform directions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformsConfig {
    /// Rules applied after task-to-legacy transformation
    pub a2a_to_legacy: Vec<TransformRule>,
    /// Rules applied after legacy-to-task transformation
    pub legacy_to_a2a: Vec<TransformRule>,
}

impl BridgeConfig {
    /// Parses YAML configuration.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parses JSON configuration.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads configuration from a file, dispatching on the extension, then
    /// seeds variables from the environment, resolves `${NAME}`
    /// placeholders and validates.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let mut config = match extension {
            "yaml" | "yml" => Self::from_yaml(&raw)?,
            "json" => Self::from_json(&raw)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.seed_variables_from_env(std::env::vars());
        config.resolve_variables();
        config.validate()?;
        Ok(config)
    }

    /// Seeds `variables` from environment entries under the recognized
    /// prefixes. Environment entries win over file-declared variables of
    /// the same name.
    pub fn seed_variables_from_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if ENV_PREFIXES.iter().any(|prefix| key.starts_with(prefix)) {
                self.variables.insert(key, value);
            }
        }
    }

    /// Resolves `${NAME}` placeholders in the adapter section against
    /// `variables`. Variables iterate in sorted key order, so resolution
    /// is reproducible across runs.
    pub fn resolve_variables(&mut self) {
        let variables = self.variables.clone();
        self.adapter.base_url = resolve_placeholders(&self.adapter.base_url, &variables);
        if let Some(auth) = self.adapter.auth.as_mut() {
            auth.username = resolve_placeholders(&auth.username, &variables);
            auth.password = resolve_placeholders(&auth.password, &variables);
            auth.token = resolve_placeholders(&auth.token, &variables);
        }
        for value in self.adapter.headers.values_mut() {
            *value = resolve_placeholders(value, &variables);
        }
    }

    /// Validates required fields. Failures are fatal configuration errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adapter.kind.is_empty() {
            return Err(ConfigError::Invalid("adapter type is required".to_string()));
        }
        if self.adapter.base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "adapter baseUrl is required".to_string(),
            ));
        }
        if self.mappings.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one mapping is required".to_string(),
            ));
        }
        for (index, mapping) in self.mappings.iter().enumerate() {
            if mapping.intent_pattern.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "mapping {}: intentPattern is required",
                    index
                )));
            }
            if mapping.endpoint.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "mapping {}: endpoint is required",
                    index
                )));
            }
            if mapping.method.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "mapping {}: method is required",
                    index
                )));
            }
        }
        Ok(())
    }
}

fn resolve_placeholders(input: &str, variables: &BTreeMap<String, String>) -> String {
    let mut output = input.to_string();
    for (name, value) in variables {
        output = output.replace(&format!("${{{}}}", name), value);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_yaml() -> &'static str {
        r#"
adapter:
  type: rest
  name: crm-legacy
  baseUrl: "http://legacy:8080"
  auth:
    type: token
    token: "${A2A_LEGACY_TOKEN}"
  headers:
    X-Source: a2a-bridge
mappings:
  - intentPattern: "get customer data"
    endpoint: "/customers/{id}"
    method: GET
    parameterMappings:
      - source: text
        pattern: ":\\s*(\\w+)$"
        target: id
      - source: metadata.agent
        target: requestedBy
        default: unknown-agent
    responseTransform:
      template: "Customer ${result.name}"
transforms:
  a2aToLegacy:
    - source: metadata.priority
      target: meta.priority
  legacyToA2a:
    - source: meta.requestId
      target: metadata.requestId
      template: "legacy-{value}"
variables:
  REGION: emea
"#
    }

    #[test]
    fn test_full_yaml_config_parsing() {
        let config = BridgeConfig::from_yaml(valid_yaml()).unwrap();
        assert_eq!(config.adapter.kind, "rest");
        assert_eq!(config.adapter.base_url, "http://legacy:8080");
        assert_eq!(
            config.adapter.headers.get("X-Source"),
            Some(&"a2a-bridge".to_string())
        );
        assert_eq!(config.mappings.len(), 1);
        let mapping = &config.mappings[0];
        assert_eq!(mapping.intent_pattern, "get customer data");
        assert_eq!(mapping.method, "GET");
        assert_eq!(mapping.parameter_mappings.len(), 2);
        assert_eq!(mapping.parameter_mappings[0].source, "text");
        assert_eq!(mapping.parameter_mappings[1].default, "unknown-agent");
        assert_eq!(
            mapping.response_transform.as_ref().unwrap().template,
            "Customer ${result.name}"
        );
        assert_eq!(config.transforms.a2a_to_legacy.len(), 1);
        assert_eq!(
            config.transforms.legacy_to_a2a[0].template,
            "legacy-{value}"
        );
        assert_eq!(config.variables.get("REGION"), Some(&"emea".to_string()));
    }

    #[test]
    fn test_json_config_parsing() {
        let config = BridgeConfig::from_json(
            r#"{
                "adapter": {"type": "rest", "baseUrl": "http://legacy:8080"},
                "mappings": [
                    {"intentPattern": "ping", "endpoint": "/ping", "method": "GET"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.adapter.kind, "rest");
        assert!(config.mappings[0].parameter_mappings.is_empty());
        assert!(config.mappings[0].response_transform.is_none());
        assert!(config.transforms.a2a_to_legacy.is_empty());
    }

    #[test]
    fn test_missing_sections_default() {
        let config = BridgeConfig::from_yaml("adapter:\n  type: rest\n").unwrap();
        assert!(config.mappings.is_empty());
        assert!(config.variables.is_empty());
        assert!(config.adapter.auth.is_none());
    }

    #[test]
    fn test_validation_requires_adapter_and_mappings() {
        let mut config = BridgeConfig::from_yaml(valid_yaml()).unwrap();
        assert!(config.validate().is_ok());

        config.adapter.kind.clear();
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("adapter type"));

        config.adapter.kind = "rest".to_string();
        config.mappings.clear();
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("at least one mapping"));
    }

    #[test]
    fn test_validation_requires_mapping_fields() {
        let mut config = BridgeConfig::from_yaml(valid_yaml()).unwrap();
        config.mappings[0].method.clear();
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("mapping 0: method"));
    }

    #[test]
    fn test_env_entries_seed_variables_and_win() {
        let mut config = BridgeConfig::default();
        config
            .variables
            .insert("A2A_LEGACY_TOKEN".to_string(), "from-file".to_string());
        config.seed_variables_from_env(vec![
            ("A2A_LEGACY_TOKEN".to_string(), "from-env".to_string()),
            ("CONNECTOR_REGION".to_string(), "emea".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);
        assert_eq!(
            config.variables.get("A2A_LEGACY_TOKEN"),
            Some(&"from-env".to_string())
        );
        assert_eq!(
            config.variables.get("CONNECTOR_REGION"),
            Some(&"emea".to_string())
        );
        assert!(!config.variables.contains_key("HOME"));
    }

    #[test]
    fn test_placeholder_resolution_in_adapter_section() {
        let mut config = BridgeConfig::from_yaml(valid_yaml()).unwrap();
        config.adapter.base_url = "${A2A_LEGACY_URL}/api".to_string();
        config
            .variables
            .insert("A2A_LEGACY_URL".to_string(), "http://crm:9090".to_string());
        config
            .variables
            .insert("A2A_LEGACY_TOKEN".to_string(), "sesame".to_string());
        config.resolve_variables();
        assert_eq!(config.adapter.base_url, "http://crm:9090/api");
        assert_eq!(config.adapter.auth.as_ref().unwrap().token, "sesame");
    }

    #[test]
    fn test_unresolved_placeholders_left_verbatim() {
        let mut config = BridgeConfig::default();
        config.adapter.base_url = "${MISSING}/api".to_string();
        config.resolve_variables();
        assert_eq!(config.adapter.base_url, "${MISSING}/api");
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("bridge.yaml");
        std::fs::write(&yaml_path, valid_yaml()).unwrap();
        let config = BridgeConfig::load_from_path(&yaml_path).unwrap();
        assert_eq!(config.adapter.kind, "rest");

        let txt_path = dir.path().join("bridge.txt");
        std::fs::write(&txt_path, "adapter: {}").unwrap();
        let error = BridgeConfig::load_from_path(&txt_path).unwrap_err();
        assert!(matches!(error, ConfigError::UnsupportedFormat(_)));
    }
}

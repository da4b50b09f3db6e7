//! Legacy system adapters.
//!
//! Adapters sit behind a uniform capability surface so the bridge core
//! never knows what kind of system answers a legacy request. Only the
//! REST adapter is built in; other kinds plug in through the
//! [`LegacyAdapter`] trait.

use crate::config::{AdapterConfig, AuthConfig};
use crate::transform::LegacyRequest;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by adapters.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },
    #[error("legacy request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Uniform surface for executing legacy work.
#[async_trait]
pub trait LegacyAdapter: Send + Sync {
    /// Set the adapter up before the first task.
    async fn initialize(&self) -> Result<(), AdapterError>;

    /// Describe what the adapted system can do.
    async fn capabilities(&self) -> Result<Value, AdapterError>;

    /// Execute one legacy request and return the raw response document.
    async fn execute_task(&self, request: &LegacyRequest) -> Result<Value, AdapterError>;

    /// Release any held resources.
    async fn close(&self) -> Result<(), AdapterError>;
}

/// Adapter for REST-shaped legacy systems.
#[derive(Debug)]
pub struct RestAdapter {
    name: String,
    base_url: String,
    client: Client,
}

impl RestAdapter {
    /// Build a REST adapter from configuration. Static headers and the
    /// configured auth scheme become default headers on every call.
    pub fn new(config: &AdapterConfig) -> Result<Self, AdapterError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            insert_header(&mut headers, name, value)?;
        }
        if let Some(auth) = &config.auth {
            if let Some((name, value)) = auth_header(auth) {
                insert_header(&mut headers, &name, &value)?;
            }
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            name: config.name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl LegacyAdapter for RestAdapter {
    async fn initialize(&self) -> Result<(), AdapterError> {
        info!(adapter = %self.name, base_url = %self.base_url, "initialized rest adapter");
        Ok(())
    }

    async fn capabilities(&self) -> Result<Value, AdapterError> {
        Ok(json!({
            "type": "rest",
            "baseUrl": self.base_url,
            "methods": ["GET", "POST", "PUT", "DELETE"],
        }))
    }

    async fn execute_task(&self, request: &LegacyRequest) -> Result<Value, AdapterError> {
        let method =
            Method::from_bytes(request.action.to_uppercase().as_bytes()).unwrap_or(Method::POST);
        let url = format!("{}{}", self.base_url, request.meta.endpoint);
        debug!(action = %request.action, %url, "executing legacy task");
        let response = self.client.request(method, &url).json(request).send().await?;
        // Error payloads still decode; status handling belongs to the
        // response transform.
        Ok(response.json().await?)
    }

    async fn close(&self) -> Result<(), AdapterError> {
        debug!(adapter = %self.name, "closed rest adapter");
        Ok(())
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), AdapterError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
        AdapterError::InvalidHeader {
            name: name.to_string(),
        }
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|_| AdapterError::InvalidHeader {
        name: name.to_string(),
    })?;
    headers.insert(header_name, header_value);
    Ok(())
}

fn auth_header(auth: &AuthConfig) -> Option<(String, String)> {
    match auth.kind.as_str() {
        "basic" => {
            let credentials = STANDARD.encode(format!("{}:{}", auth.username, auth.password));
            Some(("Authorization".to_string(), format!("Basic {}", credentials)))
        }
        "token" => Some((
            "Authorization".to_string(),
            format!("Bearer {}", auth.token),
        )),
        "apikey" => {
            let name = if auth.key_name.is_empty() {
                "X-Api-Key".to_string()
            } else {
                auth.key_name.clone()
            };
            Some((name, auth.token.clone()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(kind: &str) -> AuthConfig {
        AuthConfig {
            kind: kind.to_string(),
            username: "amy".to_string(),
            password: "s3cret".to_string(),
            token: "tok-123".to_string(),
            key_name: String::new(),
        }
    }

    #[test]
    fn test_basic_auth_header() {
        let (name, value) = auth_header(&auth("basic")).unwrap();
        assert_eq!(name, "Authorization");
        assert_eq!(value, format!("Basic {}", STANDARD.encode("amy:s3cret")));
    }

    #[test]
    fn test_token_auth_header() {
        let (name, value) = auth_header(&auth("token")).unwrap();
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Bearer tok-123");
    }

    #[test]
    fn test_apikey_auth_header_defaults_key_name() {
        let (name, value) = auth_header(&auth("apikey")).unwrap();
        assert_eq!(name, "X-Api-Key");
        assert_eq!(value, "tok-123");

        let mut custom = auth("apikey");
        custom.key_name = "X-Legacy-Key".to_string();
        let (name, _) = auth_header(&custom).unwrap();
        assert_eq!(name, "X-Legacy-Key");
    }

    #[test]
    fn test_unknown_auth_kind_is_ignored() {
        assert!(auth_header(&auth("kerberos")).is_none());
        assert!(auth_header(&auth("")).is_none());
    }

    #[test]
    fn test_invalid_header_name_fails_construction() {
        let config = AdapterConfig {
            kind: "rest".to_string(),
            base_url: "http://legacy:8080/".to_string(),
            headers: [("bad header".to_string(), "x".to_string())].into(),
            ..AdapterConfig::default()
        };
        let error = RestAdapter::new(&config).unwrap_err();
        assert!(matches!(error, AdapterError::InvalidHeader { .. }));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = AdapterConfig {
            kind: "rest".to_string(),
            base_url: "http://legacy:8080/".to_string(),
            ..AdapterConfig::default()
        };
        let adapter = RestAdapter::new(&config).unwrap();
        assert_eq!(adapter.base_url, "http://legacy:8080");
    }
}

//! Task-to-legacy request transformation.

use crate::engine::TransformEngine;
use crate::task::{now_rfc3339, Task};
use crate::transform::TransformError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Correlation metadata carried alongside every legacy request. The
/// legacy system is expected to echo it back unchanged in `meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMeta {
    pub task_id: String,
    pub timestamp: String,
    pub endpoint: String,
    pub mapping_id: String,
    /// Fields written by transform rules outside the fixed set.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The legacy request wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRequest {
    pub action: String,
    pub params: Value,
    pub meta: LegacyMeta,
    /// Fields written by transform rules outside the fixed set.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A rewritten request body plus the routing hints the transport needs.
#[derive(Debug, Clone)]
pub struct TransformedRequest {
    pub body: Vec<u8>,
    pub mapping_id: String,
    pub endpoint: String,
}

/// Transform an inbound task into a legacy request body.
///
/// The task text is matched against the mappings, parameters are
/// extracted, the endpoint template is rendered and the request-direction
/// rules run last over the assembled document. The raw task document is
/// kept alongside the typed form so dot-path sources can reach fields the
/// task schema does not model.
pub fn transform_request(
    engine: &TransformEngine,
    body: &[u8],
) -> Result<TransformedRequest, TransformError> {
    let raw: Value = serde_json::from_slice(body)?;
    let task: Task = serde_json::from_value(raw.clone())?;
    let message = task
        .status
        .message
        .as_ref()
        .ok_or(TransformError::MissingMessage)?;
    let text = message.joined_text();

    let mapping = engine
        .find_mapping(&text)
        .ok_or_else(|| TransformError::NoMatch { text: text.clone() })?;
    let params = mapping.extract_parameters(&raw, &text);
    let endpoint = mapping.render_endpoint(&params);

    let request = LegacyRequest {
        action: mapping.config().method.clone(),
        params,
        meta: LegacyMeta {
            task_id: task.id_or_placeholder(),
            timestamp: now_rfc3339(),
            endpoint: endpoint.clone(),
            mapping_id: mapping.id().to_string(),
            extra: Map::new(),
        },
        extra: Map::new(),
    };

    let mut target = serde_json::to_value(&request)?;
    for rule in engine.request_rules() {
        rule.apply(&raw, &mut target);
    }

    debug!(mapping = mapping.id(), %endpoint, "transformed request");

    Ok(TransformedRequest {
        body: serde_json::to_vec(&target)?,
        mapping_id: mapping.id().to_string(),
        endpoint,
    })
}

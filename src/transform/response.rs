//! Legacy-response-to-task transformation.

use crate::engine::TransformEngine;
use crate::task::{generated_task_id, now_rfc3339, Message, Part, Task, TaskState, TaskStatus};
use crate::transform::TransformError;
use serde_json::Value;
use tracing::debug;

/// Transform a legacy response body into a task.
///
/// The task id comes from the echoed `meta.taskId` (a generated
/// placeholder when the legacy system dropped it), the state from the
/// `status`/`error` conventions, and the message parts from the mapping's
/// response template or a synthesized summary. The whole legacy response
/// is the template context, so templates can reach any field the legacy
/// system returns.
pub fn transform_response(
    engine: &TransformEngine,
    body: &[u8],
) -> Result<Vec<u8>, TransformError> {
    let legacy: Value = serde_json::from_slice(body)?;
    let meta = legacy.get("meta");

    let task_id = meta
        .and_then(|m| m.get("taskId"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(generated_task_id);
    let mapping_id = meta
        .and_then(|m| m.get("mappingId"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let status = legacy.get("status").and_then(Value::as_str);
    let error = legacy
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let state = if status.is_some_and(|s| s != "success") || !error.is_empty() {
        TaskState::Failed
    } else {
        TaskState::Completed
    };

    let template = engine
        .mapping_by_id(mapping_id)
        .and_then(|mapping| mapping.response_template());

    let mut parts = Vec::new();
    match template {
        Some(template) => parts.push(Part::text(template.render(&legacy))),
        None => {
            let mut summary = String::new();
            if let Some(status) = status {
                summary.push_str(&format!("Status: {}\n", status));
            }
            if !error.is_empty() {
                summary.push_str(&format!("Error: {}\n", error));
            }
            if !summary.is_empty() {
                parts.push(Part::text(summary));
            }
        }
    }
    if let Some(Value::Object(result)) = legacy.get("result") {
        parts.push(Part::data(result.clone()));
    }

    let task = Task {
        id: task_id,
        status: TaskStatus {
            state,
            message: Some(Message::agent(parts)),
            timestamp: Some(now_rfc3339()),
        },
        metadata: meta.and_then(Value::as_object).cloned(),
    };

    let mut target = serde_json::to_value(&task)?;
    for rule in engine.response_rules() {
        rule.apply(&legacy, &mut target);
    }

    debug!(task_id = %task.id, mapping = mapping_id, ?state, "transformed response");

    Ok(serde_json::to_vec(&target)?)
}

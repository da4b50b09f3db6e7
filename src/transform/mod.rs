//! Bidirectional payload transformation.
//!
//! [`request`] turns an inbound task into a legacy request; [`response`]
//! turns a legacy response back into a task. Both legs share the
//! correlation contract: `meta.taskId` written on the way out is read
//! back on the way in, so one logical call stays one logical call.

pub mod request;
pub mod response;
pub mod rules;

pub use request::{transform_request, LegacyMeta, LegacyRequest, TransformedRequest};
pub use response::transform_response;
pub use rules::CompiledRule;

use thiserror::Error;

/// Errors raised while transforming a payload. On the request leg these
/// are recoverable per call; on the response leg they fail the exchange.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("no matching mapping found for text: {text}")]
    NoMatch { text: String },
    #[error("task has no message")]
    MissingMessage,
    #[error("invalid payload: {0}")]
    Marshal(#[from] serde_json::Error),
}

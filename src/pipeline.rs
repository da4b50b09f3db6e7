//! Request/response interception pipeline.
//!
//! The pipeline is the seam between the transport and the transform
//! engine. It is stateless per call: every interception re-runs matching
//! and extraction against the shared compiled engine, and the only
//! mutable state is a set of counters. The request leg never fails the
//! call; an untransformable body is forwarded unchanged with a reason.
//! The response leg returns an error that the transport must surface as
//! a failed exchange, since an untransformable legacy response has no
//! task-shaped rendition to fall back to.

use crate::config::AdapterConfig;
use crate::engine::TransformEngine;
use crate::transform::{self, TransformError, TransformedRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Why a request body was forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// No mapping matched the task text.
    NoMatch,
    /// The body did not decode into a matchable task.
    InvalidPayload,
}

/// Outcome of request interception.
#[derive(Debug)]
pub enum RequestOutcome {
    /// The body was rewritten into a legacy request.
    Rewritten(TransformedRequest),
    /// The original body should be forwarded unchanged.
    PassThrough { reason: PassReason },
}

/// What the transport should do with an inbound request.
#[derive(Debug)]
pub struct RequestDecision {
    /// Static headers to inject, whatever the outcome.
    pub headers: Vec<(String, String)>,
    pub outcome: RequestOutcome,
}

/// What the transport should do with a legacy response.
#[derive(Debug)]
pub struct ResponseDecision {
    /// Static headers to inject on the reply.
    pub headers: Vec<(String, String)>,
    /// The task-shaped reply body.
    pub body: Vec<u8>,
}

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    rewritten: AtomicU64,
    passed_through: AtomicU64,
    responses: AtomicU64,
    response_failures: AtomicU64,
}

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub rewritten: u64,
    pub passed_through: u64,
    pub responses: u64,
    pub response_failures: u64,
}

/// Interception layer wiring the transform engine to a transport.
pub struct TransformPipeline {
    engine: Arc<TransformEngine>,
    request_headers: Vec<(String, String)>,
    response_headers: Vec<(String, String)>,
    counters: Counters,
}

impl TransformPipeline {
    /// Build a pipeline over a compiled engine. The adapter's static
    /// headers are injected on every intercepted request.
    pub fn new(engine: Arc<TransformEngine>, adapter: &AdapterConfig) -> Self {
        let request_headers = adapter
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            engine,
            request_headers,
            response_headers: Vec::new(),
            counters: Counters::default(),
        }
    }

    /// Add a static header injected on every intercepted response.
    pub fn with_response_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.response_headers.push((name.into(), value.into()));
        self
    }

    /// Intercept an inbound request body. Never fails: a body that cannot
    /// be transformed is passed through with a reason, and the static
    /// headers are injected either way.
    pub fn intercept_request(&self, body: &[u8]) -> RequestDecision {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        let outcome = match transform::transform_request(&self.engine, body) {
            Ok(transformed) => {
                self.counters.rewritten.fetch_add(1, Ordering::Relaxed);
                RequestOutcome::Rewritten(transformed)
            }
            Err(error) => {
                self.counters.passed_through.fetch_add(1, Ordering::Relaxed);
                let reason = match error {
                    TransformError::NoMatch { .. } => PassReason::NoMatch,
                    _ => PassReason::InvalidPayload,
                };
                debug!(%error, ?reason, "request passed through untransformed");
                RequestOutcome::PassThrough { reason }
            }
        };
        RequestDecision {
            headers: self.request_headers.clone(),
            outcome,
        }
    }

    /// Intercept a legacy response body. A failure here must fail the
    /// exchange; the caller decides the transport-level rendition.
    pub fn intercept_response(&self, body: &[u8]) -> Result<ResponseDecision, TransformError> {
        self.counters.responses.fetch_add(1, Ordering::Relaxed);
        match transform::transform_response(&self.engine, body) {
            Ok(body) => Ok(ResponseDecision {
                headers: self.response_headers.clone(),
                body,
            }),
            Err(error) => {
                self.counters
                    .response_failures
                    .fetch_add(1, Ordering::Relaxed);
                warn!(%error, "response transform failed");
                Err(error)
            }
        }
    }

    /// Snapshot the pipeline counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.counters.requests.load(Ordering::Relaxed),
            rewritten: self.counters.rewritten.load(Ordering::Relaxed),
            passed_through: self.counters.passed_through.load(Ordering::Relaxed),
            responses: self.counters.responses.load(Ordering::Relaxed),
            response_failures: self.counters.response_failures.load(Ordering::Relaxed),
        }
    }
}

//! Task-protocol bridge for legacy systems.
//!
//! The bridge lets agents speak their structured task protocol to systems
//! that predate it. Everything is driven by declarative configuration:
//!
//! - Intent matching of free task text against ordered regex mappings
//! - Parameter extraction from text captures and dot-paths into the task
//! - Endpoint template rendering with `{name}` tokens
//! - Legacy-response-to-task reconstruction with templates and summaries
//! - Ordered field-level transform rules in both directions
//! - A request/response interception pipeline with static header injection
//!
//! ## Configuration Example
//!
//! ```yaml
//! adapter:
//!   type: rest
//!   baseUrl: "${A2A_LEGACY_URL}"
//! mappings:
//!   - intentPattern: "get customer data"
//!     endpoint: "/customers/{id}"
//!     method: GET
//!     parameterMappings:
//!       - source: text
//!         pattern: "ID:\\s*(\\w+)"
//!         target: id
//!     responseTransform:
//!       template: "Customer ${result.name}"
//! ```

pub mod adapter;
pub mod config;
pub mod engine;
pub mod mapping;
pub mod path;
pub mod pipeline;
pub mod task;
pub mod template;
pub mod transform;

pub use adapter::{AdapterError, LegacyAdapter, RestAdapter};
pub use config::{BridgeConfig, ConfigError};
pub use engine::{CompileError, TransformEngine};
pub use pipeline::{
    MetricsSnapshot, PassReason, RequestDecision, RequestOutcome, ResponseDecision,
    TransformPipeline,
};
pub use task::{Message, Part, Role, Task, TaskState, TaskStatus};
pub use transform::{LegacyMeta, LegacyRequest, TransformError, TransformedRequest};

//! LLM call tracing for the MiddleAI collector.
//!
//! [`MiddleAiTracer`] opens one OpenTelemetry span per model call, records the
//! model parameters as flat `model_params.*` attributes, closes the span with
//! the model output and posts end-user feedback.

pub mod config;
pub mod error;
pub mod feedback;
pub mod http_client;
pub mod params;
pub mod pipeline;
pub mod telemetry;
pub mod tracer;

pub use config::TracerConfig;
pub use error::{CoreResult, MiddleAiError};
pub use feedback::FeedbackType;
pub use telemetry::TraceRequest;
pub use tracer::{LlmSpan, MiddleAiTracer};

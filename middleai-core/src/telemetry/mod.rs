//! Telemetry vocabulary shared by the tracer and its callers: the attribute
//! keys the collector expects and the input record for one traced model call.

pub mod keys;
pub mod types;

pub use keys::*;
pub use types::*;

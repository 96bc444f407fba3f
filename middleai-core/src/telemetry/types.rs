use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Everything known about a model call when it starts.
/// Passed to `MiddleAiTracer::start_trace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRequest {
    /// Span name, e.g. "chat" or "summarize".
    pub name: String,

    /// Model identifier, e.g. "gpt-4o".
    pub model: String,

    /// Arbitrarily nested model parameters; flattened under `model_params`.
    #[serde(default)]
    pub model_params: JsonValue,

    /// End-user identifier.
    pub user: String,

    /// Prompt sent to the model for this call.
    pub prompt: String,

    /// Conversation thread the call belongs to.
    pub thread_id: String,

    /// First prompt of the thread, if the caller tracks it.
    #[serde(default)]
    pub initial_prompt: String,
}

impl TraceRequest {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            model_params: JsonValue::Object(Default::default()),
            user: String::new(),
            prompt: String::new(),
            thread_id: String::new(),
            initial_prompt: String::new(),
        }
    }

    pub fn model_params(mut self, params: JsonValue) -> Self {
        self.model_params = params;
        self
    }
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = thread_id.into();
        self
    }
    pub fn initial_prompt(mut self, initial_prompt: impl Into<String>) -> Self {
        self.initial_prompt = initial_prompt.into();
        self
    }
}

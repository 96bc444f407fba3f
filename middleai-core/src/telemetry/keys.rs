/// Span attribute keys for model calls.
/// Keep these stable; the collector indexes on them.
pub const KEY_LLM_MODEL: &str = "llm_model";
pub const KEY_ENDUSER_ID: &str = "enduser_id";
pub const KEY_USER_PROMPT: &str = "user_prompt";
pub const KEY_APPLICATION_REF: &str = "application_ref";
pub const KEY_THREAD_ID: &str = "thread_id";
pub const KEY_INITIAL_PROMPT: &str = "initialPrompt";

/// Set once when the span is closed.
pub const KEY_LLM_OUTPUT: &str = "llm_output";

/// Root segment of every flattened model parameter key.
pub const KEY_MODEL_PARAMS: &str = "model_params";

/// Attributes every trace span starts with, besides the flattened parameters.
pub const FIXED_START_KEYS: [&str; 6] = [
    KEY_LLM_MODEL,
    KEY_ENDUSER_ID,
    KEY_USER_PROMPT,
    KEY_APPLICATION_REF,
    KEY_THREAD_ID,
    KEY_INITIAL_PROMPT,
];

/// Header carrying the collector API key on both span export and feedback.
pub const API_KEY_HEADER: &str = "x-middle-ai-api-key";

/// Instrumentation scope name for spans produced by this crate.
pub const TRACER_NAME: &str = "MiddleAI";

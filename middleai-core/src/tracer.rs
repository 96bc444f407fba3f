//! The tracer facade: one span per model call, plus feedback submission.

use std::fmt;

use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::trace::{Span as _, SpanContext, Tracer as _, TracerProvider as _};
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider, Span};
use secrecy::ExposeSecret;
use tracing::{debug, info, info_span, warn};
use tracing_futures::Instrument;

use crate::config::TracerConfig;
use crate::error::{CoreResult, MiddleAiError};
use crate::feedback::{FeedbackRecord, FeedbackType};
use crate::http_client::HttpClient;
use crate::params::{flatten_params, to_key_values};
use crate::telemetry::{
    API_KEY_HEADER, FIXED_START_KEYS, KEY_APPLICATION_REF, KEY_ENDUSER_ID, KEY_INITIAL_PROMPT,
    KEY_LLM_MODEL, KEY_LLM_OUTPUT, KEY_THREAD_ID, KEY_USER_PROMPT, TRACER_NAME, TraceRequest,
};

/// An open span for one model call. Close it with [`MiddleAiTracer::end_trace`].
///
/// `end_trace` takes the span by value, so a span cannot be ended twice. A span
/// dropped without `end_trace` is still ended by the SDK, without `llm_output`.
pub struct LlmSpan {
    inner: Span,
}

impl LlmSpan {
    pub fn span_context(&self) -> &SpanContext {
        self.inner.span_context()
    }
}

impl fmt::Debug for LlmSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSpan")
            .field("span_context", self.inner.span_context())
            .finish()
    }
}

/// Traces model calls for one application and forwards end-user feedback.
pub struct MiddleAiTracer {
    name: String,
    config: TracerConfig,
    provider: SdkTracerProvider,
    tracer: SdkTracer,
    http: HttpClient,
}

impl fmt::Debug for MiddleAiTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddleAiTracer")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MiddleAiTracer {
    /// Build the export pipeline for `name` and wrap it. Nothing is registered
    /// globally; see [`MiddleAiTracer::install_global`].
    pub fn new(name: impl Into<String>, config: TracerConfig) -> CoreResult<Self> {
        let name = name.into();
        let provider = crate::pipeline::build_provider(&name, &config)?;
        Self::with_provider(name, config, provider)
    }

    /// Construct from `MIDDLE_AI_ENDPOINT` / `MIDDLE_AI_API_KEY`.
    pub fn from_env(name: impl Into<String>) -> CoreResult<Self> {
        Self::new(name, TracerConfig::from_env()?)
    }

    /// Wrap a caller-built provider. The caller keeps control of how spans are
    /// processed and exported; `config` is still used for feedback.
    pub fn with_provider(
        name: impl Into<String>,
        config: TracerConfig,
        provider: SdkTracerProvider,
    ) -> CoreResult<Self> {
        config.validate()?;
        let http = HttpClient::new(&config.http)?;
        let tracer = provider.tracer(TRACER_NAME);
        Ok(Self {
            name: name.into(),
            config,
            provider,
            tracer,
            http,
        })
    }

    /// Application name, reported as `application_ref` and `service.name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Open a span for a model call.
    ///
    /// The span starts with the six fixed attributes plus one
    /// `model_params.*` attribute per scalar leaf of `request.model_params`.
    pub fn start_trace(&self, request: TraceRequest) -> LlmSpan {
        let params = flatten_params(&request.model_params);
        let mut attributes = Vec::with_capacity(FIXED_START_KEYS.len() + params.len());
        attributes.push(KeyValue::new(KEY_LLM_MODEL, request.model));
        attributes.push(KeyValue::new(KEY_ENDUSER_ID, request.user));
        attributes.push(KeyValue::new(KEY_USER_PROMPT, request.prompt));
        attributes.push(KeyValue::new(KEY_APPLICATION_REF, self.name.clone()));
        attributes.push(KeyValue::new(KEY_THREAD_ID, request.thread_id));
        attributes.push(KeyValue::new(KEY_INITIAL_PROMPT, request.initial_prompt));
        attributes.extend(to_key_values(params));

        debug!(span = %request.name, attributes = attributes.len(), "starting trace");
        let inner = self
            .tracer
            .span_builder(request.name)
            .with_attributes(attributes)
            .start(&self.tracer);
        LlmSpan { inner }
    }

    /// Record the model output on `span` and end it.
    pub fn end_trace(&self, mut span: LlmSpan, output: impl Into<String>) {
        span.inner
            .set_attribute(KeyValue::new(KEY_LLM_OUTPUT, output.into()));
        span.inner.end();
        debug!(trace_id = %span.span_context().trace_id(), "trace ended");
    }

    /// Send one feedback record for `thread_id` to `{endpoint}/feedback`.
    ///
    /// `Ok(true)` on a 2xx response, `Ok(false)` on any other status, and
    /// `Err(Transport)` when no response was received. Never retried.
    pub async fn send_feedback(
        &self,
        thread_id: &str,
        user: &str,
        feedback_type: FeedbackType,
        feedback: &str,
    ) -> CoreResult<bool> {
        let record = FeedbackRecord {
            application_ref: &self.name,
            thread_id,
            enduser_id: user,
            feedback_type,
            feedback_value: feedback,
        };
        let url = self.config.feedback_url();
        let headers = [(API_KEY_HEADER, self.config.api_key.expose_secret())];

        let status = self
            .http
            .post_json_status(&url, &record, &headers)
            .instrument(info_span!("middleai.feedback", thread_id, kind = %feedback_type))
            .await?;

        if status.is_success() {
            info!(thread_id, %status, "feedback accepted");
            Ok(true)
        } else {
            warn!(thread_id, %status, "feedback rejected by collector");
            Ok(false)
        }
    }

    /// Export every finished span still buffered in the provider.
    pub fn force_flush(&self) -> CoreResult<()> {
        self.provider
            .force_flush()
            .map_err(|e| MiddleAiError::Exporter(format!("flush failed: {e}")))
    }

    /// Flush and stop the export pipeline. Spans started afterwards are dropped.
    pub fn shutdown(&self) -> CoreResult<()> {
        self.provider
            .shutdown()
            .map_err(|e| MiddleAiError::Exporter(format!("shutdown failed: {e}")))
    }

    /// Make this tracer's provider the process-wide `opentelemetry::global`
    /// provider. The last call wins if several tracers install themselves.
    pub fn install_global(&self) {
        global::set_tracer_provider(self.provider.clone());
    }
}

//! Export pipeline construction: OTLP/HTTP exporter, service resource and a
//! batching tracer provider, all pointed at the MiddleAI collector.

use std::collections::HashMap;
use std::time::Duration;

use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::config::TracerConfig;
use crate::error::{CoreResult, MiddleAiError};
use crate::telemetry::API_KEY_HEADER;

/// Build the OTLP exporter posting protobuf batches to `{endpoint}/v1/traces`.
pub fn build_exporter(cfg: &TracerConfig) -> CoreResult<SpanExporter> {
    let mut headers = HashMap::new();
    headers.insert(
        API_KEY_HEADER.to_string(),
        cfg.api_key.expose_secret().to_string(),
    );

    let endpoint = cfg.traces_url();
    debug!(endpoint = %endpoint, "building OTLP span exporter");

    SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_millis(cfg.http.request_timeout_ms))
        .with_headers(headers)
        .build()
        .map_err(|e| MiddleAiError::Exporter(format!("otlp exporter build failed: {e}")))
}

/// Resource describing the instrumented application.
pub fn service_resource(app_name: &str) -> Resource {
    Resource::builder()
        .with_service_name(app_name.to_string())
        .build()
}

/// Build a provider that batches spans for `app_name` into the collector.
///
/// The provider is returned to the caller, not registered globally.
pub fn build_provider(app_name: &str, cfg: &TracerConfig) -> CoreResult<SdkTracerProvider> {
    cfg.validate()?;
    let exporter = build_exporter(cfg)?;
    Ok(SdkTracerProvider::builder()
        .with_resource(service_resource(app_name))
        .with_batch_exporter(exporter)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::{Key, Value};

    #[test]
    fn resource_carries_service_name() {
        let resource = service_resource("support-bot");
        assert_eq!(
            resource.get(&Key::from_static_str("service.name")),
            Some(Value::from("support-bot"))
        );
    }

    #[test]
    fn builds_provider_for_valid_config() {
        let cfg = TracerConfig::new("http://127.0.0.1:9", "test-key");
        let provider = build_provider("support-bot", &cfg).expect("provider");
        // nothing was recorded, so shutting down does not touch the network
        let _ = provider.shutdown();
    }

    #[test]
    fn rejects_invalid_config_before_building() {
        let cfg = TracerConfig::new("", "test-key");
        let err = build_provider("support-bot", &cfg).unwrap_err();
        assert!(matches!(err, MiddleAiError::Config(_)));
    }
}

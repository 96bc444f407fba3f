use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::{CoreResult, MiddleAiError};

/// Environment variable holding the collector base URL.
pub const ENV_ENDPOINT: &str = "MIDDLE_AI_ENDPOINT";
/// Environment variable holding the collector API key.
pub const ENV_API_KEY: &str = "MIDDLE_AI_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpCfg {
    /// TCP connect timeout in milliseconds (default 5000ms)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Total request timeout in milliseconds (default 60000ms)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Optional per-host idle connection pool cap (None = reqwest default)
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            pool_max_idle_per_host: None,
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}
fn default_request_timeout_ms() -> u64 {
    60_000
}
fn default_api_key_env() -> String {
    ENV_API_KEY.to_string()
}

/// On-disk shape of the tracer configuration. The API key itself never lives
/// in the file; `api_key_env` names the environment variable that holds it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// Collector base URL. Falls back to `MIDDLE_AI_ENDPOINT` when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Name of the environment variable that contains the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// HTTP client configuration (timeouts, pooling). Missing → defaults.
    #[serde(default)]
    pub http: HttpCfg,
}

impl FileConfig {
    /// Parse a config file (JSON or TOML by extension). If the extension is
    /// missing or unrecognized, try JSON first, then TOML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(MiddleAiError::from)?;
        let s = std::str::from_utf8(&bytes).map_err(|e| MiddleAiError::Other(e.into()))?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                serde_json::from_str::<Self>(s).map_err(|e| MiddleAiError::Other(e.into()))?
            }
            Some("toml") => {
                toml::from_str::<Self>(s).map_err(|e| MiddleAiError::Other(e.into()))?
            }
            _ => serde_json::from_str::<Self>(s)
                .map_err(|e| MiddleAiError::Other(e.into()))
                .or_else(|_| toml::from_str::<Self>(s).map_err(|e| MiddleAiError::Other(e.into())))?,
        };
        Ok(cfg)
    }
}

/// Validated settings for one tracer: where the collector lives and how to
/// authenticate against it.
#[derive(Debug)]
pub struct TracerConfig {
    pub endpoint: String,
    pub api_key: SecretString,
    pub http: HttpCfg,
}

impl TracerConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: SecretString::from(api_key.into()),
            http: HttpCfg::default(),
        }
    }

    pub fn with_http(mut self, http: HttpCfg) -> Self {
        self.http = http;
        self
    }

    /// Read `MIDDLE_AI_ENDPOINT` and `MIDDLE_AI_API_KEY` and validate them.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load a config file, resolving the API key (and a missing endpoint)
    /// from the process environment.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let file = FileConfig::from_path(path)?;
        Self::from_file_config(file, |name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENV_ENDPOINT)
            .ok_or_else(|| MiddleAiError::Config(format!("{ENV_ENDPOINT} is not set")))?;
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| MiddleAiError::Config(format!("{ENV_API_KEY} is not set")))?;
        let cfg = Self::new(endpoint, api_key);
        cfg.validate()?;
        Ok(cfg)
    }

    pub(crate) fn from_file_config<F>(file: FileConfig, lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = file
            .endpoint
            .or_else(|| lookup(ENV_ENDPOINT))
            .ok_or_else(|| {
                MiddleAiError::Config(format!("no endpoint in config file and {ENV_ENDPOINT} is not set"))
            })?;
        let api_key = lookup(&file.api_key_env)
            .ok_or_else(|| MiddleAiError::Config(format!("{} is not set", file.api_key_env)))?;
        let cfg = Self::new(endpoint, api_key).with_http(file.http);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fail fast on settings that would otherwise only surface as malformed
    /// requests at the collector.
    pub fn validate(&self) -> CoreResult<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(MiddleAiError::Config("endpoint is empty".into()));
        }
        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| MiddleAiError::Config(format!("endpoint {endpoint:?} is not a URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MiddleAiError::Config(format!(
                "endpoint scheme must be http or https, got {:?}",
                url.scheme()
            )));
        }

        let key = self.api_key.expose_secret();
        if key.trim().is_empty() {
            return Err(MiddleAiError::Config("api key is empty".into()));
        }
        http::HeaderValue::from_str(key)
            .map_err(|_| MiddleAiError::Config("api key is not a valid header value".into()))?;
        Ok(())
    }

    /// OTLP span export target.
    pub fn traces_url(&self) -> String {
        format!("{}/v1/traces", self.base())
    }

    /// Feedback submission target.
    pub fn feedback_url(&self) -> String {
        format!("{}/feedback", self.base())
    }

    fn base(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn from_lookup_reads_both_vars() {
        let env = vars(&[
            (ENV_ENDPOINT, "https://collector.example.com/"),
            (ENV_API_KEY, "mai-123"),
        ]);
        let cfg = TracerConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.api_key.expose_secret(), "mai-123");
        assert_eq!(cfg.traces_url(), "https://collector.example.com/v1/traces");
        assert_eq!(cfg.feedback_url(), "https://collector.example.com/feedback");
        assert_eq!(cfg.http, HttpCfg::default());
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let env = vars(&[(ENV_API_KEY, "mai-123")]);
        let err = TracerConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        match err {
            MiddleAiError::Config(msg) => assert!(msg.contains(ENV_ENDPOINT)),
            other => panic!("expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let env = vars(&[(ENV_ENDPOINT, "http://localhost:4318")]);
        let err = TracerConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, MiddleAiError::Config(_)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(TracerConfig::new("", "k").validate().is_err());
        assert!(TracerConfig::new("not a url", "k").validate().is_err());
        assert!(TracerConfig::new("ftp://collector", "k").validate().is_err());
        assert!(TracerConfig::new("http://collector", "  ").validate().is_err());
        assert!(TracerConfig::new("http://collector", "bad\nkey").validate().is_err());
        assert!(TracerConfig::new("http://collector", "good-key").validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let cfg = TracerConfig::new("http://collector", "super-secret");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
    }

    #[test]
    fn load_from_json() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("middleai.json");
        let json = r#"{
          "endpoint": "https://collector.example.com",
          "api_key_env": "MY_COLLECTOR_KEY",
          "http": {"connect_timeout_ms": 1000}
        }"#;
        fs::write(&file, json).unwrap();
        let parsed = FileConfig::from_path(&file).unwrap();
        assert_eq!(parsed.api_key_env, "MY_COLLECTOR_KEY");
        assert_eq!(parsed.http.connect_timeout_ms, 1_000);
        assert_eq!(parsed.http.request_timeout_ms, 60_000);

        let env = vars(&[("MY_COLLECTOR_KEY", "from-file-env")]);
        let cfg = TracerConfig::from_file_config(parsed, |k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.endpoint, "https://collector.example.com");
        assert_eq!(cfg.api_key.expose_secret(), "from-file-env");
    }

    #[test]
    fn load_from_toml_with_env_endpoint_fallback() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("middleai.toml");
        let toml = r#"
[http]
request_timeout_ms = 2500
pool_max_idle_per_host = 4
"#;
        fs::write(&file, toml).unwrap();
        let parsed = FileConfig::from_path(&file).unwrap();
        assert_eq!(parsed.endpoint, None);
        assert_eq!(parsed.api_key_env, ENV_API_KEY);
        assert_eq!(parsed.http.pool_max_idle_per_host, Some(4));

        let env = vars(&[(ENV_ENDPOINT, "http://localhost:4318"), (ENV_API_KEY, "k")]);
        let cfg = TracerConfig::from_file_config(parsed, |k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.endpoint, "http://localhost:4318");
        assert_eq!(cfg.http.request_timeout_ms, 2_500);
    }

    #[test]
    fn unknown_extension_falls_back_to_json_then_toml() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("middleai.conf");
        fs::write(&json_path, r#"{"endpoint":"http://a"}"#).unwrap();
        assert_eq!(
            FileConfig::from_path(&json_path).unwrap().endpoint.as_deref(),
            Some("http://a")
        );

        let toml_path = dir.path().join("middleai2.conf");
        fs::write(&toml_path, "endpoint = \"http://b\"\n").unwrap();
        assert_eq!(
            FileConfig::from_path(&toml_path).unwrap().endpoint.as_deref(),
            Some("http://b")
        );
    }

    #[test]
    fn missing_file_returns_io_error() {
        let missing = std::path::PathBuf::from("/definitely/not/here/middleai-missing.json");
        let err = FileConfig::from_path(&missing).unwrap_err();
        match err {
            MiddleAiError::Io(_) => {}
            other => panic!("expected Io error, got: {:?}", other),
        }
    }

    #[test]
    fn bad_json_returns_other_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.json");
        fs::write(&file, r#"{ "endpoint": 123 "#).unwrap();
        let err = FileConfig::from_path(&file).unwrap_err();
        assert!(matches!(err, MiddleAiError::Other(_)));
    }

    #[test]
    fn file_without_key_in_env_is_rejected() {
        let file = FileConfig {
            endpoint: Some("http://collector".into()),
            api_key_env: "UNSET_KEY_VAR".into(),
            http: HttpCfg::default(),
        };
        let err = TracerConfig::from_file_config(file, |_| None).unwrap_err();
        match err {
            MiddleAiError::Config(msg) => assert!(msg.contains("UNSET_KEY_VAR")),
            other => panic!("expected Config error, got: {:?}", other),
        }
    }
}

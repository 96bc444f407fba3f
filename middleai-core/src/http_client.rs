use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::config::HttpCfg;
use crate::error::{CoreResult, MiddleAiError};

/// Thin wrapper around reqwest::Client with defaults and helpers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(cfg: &HttpCfg) -> CoreResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .timeout(Duration::from_millis(cfg.request_timeout_ms));
        if let Some(max_idle) = cfg.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max_idle);
        }
        let inner = builder
            .build()
            .map_err(|e| MiddleAiError::Other(anyhow::anyhow!("http client build failed: {e}")))?;
        Ok(Self {
            inner,
            user_agent: concat!("middleai/", env!("CARGO_PKG_VERSION")).to_string(),
        })
    }

    /// POST a JSON body and hand back the response status. Only a failure to
    /// get any response at all is an error; status interpretation is left to
    /// the caller.
    pub async fn post_json_status<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> CoreResult<StatusCode> {
        let start = Instant::now();
        let mut req = self
            .inner
            .post(url)
            .json(body)
            .header("User-Agent", &self.user_agent);

        // custom headers
        for (k, v) in headers {
            req = req.header(*k, *v);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| MiddleAiError::Transport(format!("POST {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            debug!(%status, body = %truncate(&text, 300), "non-success response");
        }
        debug!(%status, latency_ms = start.elapsed().as_millis() as u64, url, "POST completed");
        Ok(status)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut t = s[..end].to_string();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}

//! Aggregator HTTP client with timeout and error mapping.
//!
//! # Responsibilities
//! - Build quote, swap and token-list URLs from the configured base
//! - Bound every outbound call by the configured timeout
//! - Parse bodies as JSON regardless of status (falling back to `{}`)
//! - Map non-2xx responses to [`UpstreamError::Status`]

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use crate::aggregator::types::{CallOutcome, UpstreamError, UpstreamResult};
use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::quoting::{QuoteRequest, SwapRequest};

/// Client for the upstream swap aggregator.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct AggregatorClient {
    http: reqwest::Client,
    base_url: String,
    tokens_url: String,
    timeout: Duration,
}

impl AggregatorClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("swap-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens_url: config.tokens_url(),
            timeout: config.timeout(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET {base}/quote?...` — the upstream payload is returned untouched.
    pub async fn quote(&self, request: &QuoteRequest) -> UpstreamResult<Value> {
        let url = self.quote_url(request)?;
        self.get_json("quote", url).await
    }

    /// `POST {base}/swap` with the validated swap body.
    pub async fn swap(&self, request: &SwapRequest) -> UpstreamResult<Value> {
        let url = Url::parse(&format!("{}/swap", self.base_url))?;
        let body = serde_json::to_value(request).unwrap_or_else(|_| json!({}));
        self.post_json("swap", url, &body).await
    }

    /// Full upstream token list, unprojected.
    pub async fn tokens(&self) -> UpstreamResult<Value> {
        let url = Url::parse(&self.tokens_url)?;
        self.get_json("tokens", url).await
    }

    pub fn quote_url(&self, request: &QuoteRequest) -> UpstreamResult<Url> {
        let mut url = Url::parse(&format!("{}/quote", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("inputMint", &request.input_mint)
            .append_pair("outputMint", &request.output_mint)
            .append_pair("amount", &request.amount)
            .append_pair("slippageBps", &request.slippage_bps.to_string())
            .append_pair("onlyDirectRoutes", if request.only_direct_routes { "true" } else { "false" });
        Ok(url)
    }

    pub async fn get_json(&self, endpoint: &'static str, url: Url) -> UpstreamResult<Value> {
        self.execute(endpoint, Method::GET, url, None).await
    }

    pub async fn post_json(
        &self,
        endpoint: &'static str,
        url: Url,
        body: &Value,
    ) -> UpstreamResult<Value> {
        self.execute(endpoint, Method::POST, url, Some(body)).await
    }

    async fn execute(
        &self,
        endpoint: &'static str,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> UpstreamResult<Value> {
        let start = Instant::now();
        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        // Dropping the future on deadline cancels the in-flight request.
        let call = async {
            let response = builder.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes))
        };

        let result = match timeout(self.timeout, call).await {
            Err(_) => Err(UpstreamError::Timeout(self.timeout.as_millis() as u64)),
            Ok(Err(e)) => Err(UpstreamError::Network(e.to_string())),
            Ok(Ok((status, bytes))) => {
                let payload = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| json!({}));
                classify(status, payload)
            }
        };

        let outcome = match &result {
            Ok(_) => CallOutcome::CompletedOk,
            Err(e) => e.outcome(),
        };
        metrics::record_upstream_call(endpoint, outcome, start);

        match &result {
            Ok(_) => tracing::debug!(
                endpoint,
                method = %method,
                path = url.path(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Upstream call completed"
            ),
            Err(e) => tracing::warn!(
                endpoint,
                method = %method,
                path = url.path(),
                outcome = outcome.as_str(),
                error = %e,
                "Upstream call failed"
            ),
        }

        result
    }
}

/// Map a received response to success or a status error.
fn classify(status: StatusCode, payload: Value) -> UpstreamResult<Value> {
    if status.is_success() {
        return Ok(payload);
    }
    let message = payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("fetch failed: {}", status.as_u16()));
    Err(UpstreamError::Status {
        status: status.as_u16(),
        message,
    })
}

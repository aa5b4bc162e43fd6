use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered `{ok: false, error}`.
    #[error("gateway returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_direct_routes: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapParams {
    pub user_public_key: String,
    pub quote_response: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_and_unwrap_sol: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_shared_accounts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_compute_unit_limit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritization_fee_lamports: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub address: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub service: String,
    pub time: String,
}

#[derive(Deserialize)]
struct QuoteEnvelope {
    quote: Value,
}

#[derive(Deserialize)]
struct SwapEnvelope {
    #[serde(rename = "swapTransaction")]
    swap_transaction: Option<String>,
}

#[derive(Deserialize)]
struct TokensEnvelope {
    tokens: Vec<Token>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

pub struct GatewayClient {
    client: Client,
    base_url: String,
    origin: Option<String>,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            origin: None,
        }
    }

    /// Send an `Origin` header with every request, as a browser would.
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        self.send(self.request(reqwest::Method::GET, "/health")).await
    }

    pub async fn tokens(&self) -> Result<Vec<Token>, ClientError> {
        let envelope: TokensEnvelope = self
            .send(self.request(reqwest::Method::GET, "/api/tokens"))
            .await?;
        Ok(envelope.tokens)
    }

    /// Request a quote; the upstream quote is returned as opaque JSON.
    pub async fn quote(&self, params: &QuoteParams) -> Result<Value, ClientError> {
        let envelope: QuoteEnvelope = self
            .send(self.request(reqwest::Method::POST, "/api/quote").json(params))
            .await?;
        Ok(envelope.quote)
    }

    /// Build a swap transaction from a previously fetched quote.
    pub async fn swap(&self, params: &SwapParams) -> Result<Option<String>, ClientError> {
        let envelope: SwapEnvelope = self
            .send(self.request(reqwest::Method::POST, "/api/swap").json(params))
            .await?;
        Ok(envelope.swap_transaction)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.origin {
            Some(origin) => builder.header(reqwest::header::ORIGIN, origin),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Api { status, message });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

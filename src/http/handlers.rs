//! Route handlers.
//!
//! Each handler runs validator → aggregator client → shaper and renders
//! either a success envelope or an [`ApiError`].

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::aggregator::shaper;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::quoting::types::{QuoteEnvelope, SwapEnvelope, TokensEnvelope};
use crate::quoting::{parse_body, validate_quote, validate_swap, ValidationError};

/// Upper bound for `GET /api/tokens?limit=`.
pub const MAX_TOKEN_LIMIT: usize = 5000;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub time: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub limit: Option<usize>,
    pub tag: Option<String>,
}

/// `GET /` — plain-text banner.
pub async fn banner(State(state): State<AppState>) -> String {
    format!("{} is running", state.config.server.service_name)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: state.config.server.service_name.clone(),
        time: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}

/// `GET /api/tokens` — upstream failures are reported as 500.
pub async fn list_tokens(
    State(state): State<AppState>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> Result<Json<TokensEnvelope>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| ValidationError::InvalidQuery(rejection.body_text()))?;

    if let Some(limit) = query.limit {
        if !(1..=MAX_TOKEN_LIMIT).contains(&limit) {
            return Err(ValidationError::OutOfRange {
                field: "limit",
                min: 1,
                max: MAX_TOKEN_LIMIT as u64,
            }
            .into());
        }
    }

    let body = state
        .aggregator
        .tokens()
        .await
        .map_err(ApiError::UpstreamUnavailable)?;

    let tokens = shaper::filter_tokens(
        shaper::project_tokens(&body),
        query.tag.as_deref().filter(|t| !t.is_empty()),
        query.limit,
    );
    tracing::debug!(count = tokens.len(), "Token list served");

    Ok(Json(TokensEnvelope { ok: true, tokens }))
}

/// `POST /api/quote` — upstream quote returned verbatim.
pub async fn create_quote(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QuoteEnvelope>, ApiError> {
    let request = validate_quote(&parse_body(&body)?)?;

    tracing::info!(
        input_mint = %request.input_mint,
        output_mint = %request.output_mint,
        amount = %request.amount,
        slippage_bps = request.slippage_bps,
        "Fetching quote"
    );

    let quote = state.aggregator.quote(&request).await?;
    Ok(Json(QuoteEnvelope { ok: true, quote }))
}

/// `POST /api/swap` — only the serialized transaction is returned.
pub async fn create_swap(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SwapEnvelope>, ApiError> {
    let request = validate_swap(&parse_body(&body)?)?;

    tracing::info!(user = %request.user_public_key, "Building swap transaction");

    let response = state.aggregator.swap(&request).await?;
    let swap_transaction = shaper::extract_swap_transaction(&response);
    if swap_transaction.is_none() {
        tracing::warn!(user = %request.user_public_key, "Upstream swap response had no swapTransaction");
    }

    Ok(Json(SwapEnvelope {
        ok: true,
        swap_transaction,
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

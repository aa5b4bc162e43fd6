//! Request and response shapes exchanged with callers and the aggregator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default slippage tolerance in basis points.
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;
/// Inclusive slippage bounds in basis points.
pub const MIN_SLIPPAGE_BPS: u16 = 1;
pub const MAX_SLIPPAGE_BPS: u16 = 1000;

/// Validated payload for `POST /api/quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Mint of the asset being sold.
    pub input_mint: String,
    /// Mint of the asset being bought.
    pub output_mint: String,
    /// Amount in the input asset's smallest denomination, as a digit string.
    pub amount: String,
    /// Slippage tolerance in basis points.
    pub slippage_bps: u16,
    /// Restrict routing to single-hop routes.
    pub only_direct_routes: bool,
}

/// Validated payload for `POST /api/swap`.
///
/// Serializes to the exact body the aggregator's swap endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Wallet that will sign the transaction.
    pub user_public_key: String,
    /// Quote returned by a prior quote call, forwarded unmodified.
    pub quote_response: Map<String, Value>,
    pub wrap_and_unwrap_sol: bool,
    pub use_shared_accounts: bool,
    pub dynamic_compute_unit_limit: bool,
    /// Priority fee in lamports.
    pub prioritization_fee_lamports: u64,
}

/// Filtered projection of an upstream token record.
///
/// Fields missing upstream are omitted from the output rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TokenDescriptor {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// `{ok: true, quote}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteEnvelope {
    pub ok: bool,
    pub quote: Value,
}

/// `{ok: true, swapTransaction}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct SwapEnvelope {
    pub ok: bool,
    #[serde(rename = "swapTransaction", skip_serializing_if = "Option::is_none")]
    pub swap_transaction: Option<String>,
}

/// `{ok: true, tokens}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct TokensEnvelope {
    pub ok: bool,
    pub tokens: Vec<TokenDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_swap_request_wire_names() {
        let request = SwapRequest {
            user_public_key: "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".to_string(),
            quote_response: Map::new(),
            wrap_and_unwrap_sol: true,
            use_shared_accounts: false,
            dynamic_compute_unit_limit: true,
            prioritization_fee_lamports: 5000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["userPublicKey"], "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
        assert_eq!(value["quoteResponse"], json!({}));
        assert_eq!(value["useSharedAccounts"], false);
        assert_eq!(value["prioritizationFeeLamports"], 5000);
    }

    #[test]
    fn test_token_descriptor_omits_missing_fields() {
        let token = TokenDescriptor {
            address: Some("So11111111111111111111111111111111111111112".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(
            value,
            json!({"address": "So11111111111111111111111111111111111111112", "tags": []})
        );
    }

    #[test]
    fn test_swap_envelope_without_transaction() {
        let envelope = SwapEnvelope { ok: true, swap_transaction: None };
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({"ok": true}));
    }
}

//! Per-route input schemas.
//!
//! Pure and synchronous: raw body in, typed request or [`ValidationError`] out.
//! Nothing here touches the network, so a rejected request never reaches
//! the aggregator.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::quoting::types::{
    QuoteRequest, SwapRequest, DEFAULT_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS, MIN_SLIPPAGE_BPS,
};

/// Accepted length range for base58 addresses (mints and wallets).
const MIN_ADDRESS_LEN: usize = 32;
const MAX_ADDRESS_LEN: usize = 44;

/// Human-readable input violation, surfaced to callers as HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid JSON body: {0}")]
    MalformedJson(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
    },
}

/// Parse a raw request body. An empty body is treated as `{}`.
pub fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::NotAnObject),
        Err(e) => Err(ValidationError::MalformedJson(e.to_string())),
    }
}

/// Validate a quote body and apply defaults.
pub fn validate_quote(body: &Map<String, Value>) -> Result<QuoteRequest, ValidationError> {
    let input_mint = address(body, "inputMint")?;
    let output_mint = address(body, "outputMint")?;

    let amount = required_str(body, "amount")?;
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "amount",
            reason: "must be a string of digits".to_string(),
        });
    }

    let slippage_bps = match optional_u64(body, "slippageBps")? {
        Some(bps) if (u64::from(MIN_SLIPPAGE_BPS)..=u64::from(MAX_SLIPPAGE_BPS)).contains(&bps) => {
            bps as u16
        }
        Some(_) => {
            return Err(ValidationError::OutOfRange {
                field: "slippageBps",
                min: u64::from(MIN_SLIPPAGE_BPS),
                max: u64::from(MAX_SLIPPAGE_BPS),
            })
        }
        None => DEFAULT_SLIPPAGE_BPS,
    };

    let only_direct_routes = optional_bool(body, "onlyDirectRoutes")?.unwrap_or(false);

    Ok(QuoteRequest {
        input_mint,
        output_mint,
        amount: amount.to_string(),
        slippage_bps,
        only_direct_routes,
    })
}

/// Validate a swap body and apply defaults.
pub fn validate_swap(body: &Map<String, Value>) -> Result<SwapRequest, ValidationError> {
    let user_public_key = address(body, "userPublicKey")?;

    let quote_response = match body.get("quoteResponse") {
        None | Some(Value::Null) => return Err(ValidationError::Missing("quoteResponse")),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(ValidationError::InvalidType {
                field: "quoteResponse",
                expected: "an object",
            })
        }
    };

    Ok(SwapRequest {
        user_public_key,
        quote_response,
        wrap_and_unwrap_sol: optional_bool(body, "wrapAndUnwrapSol")?.unwrap_or(true),
        use_shared_accounts: optional_bool(body, "useSharedAccounts")?.unwrap_or(true),
        dynamic_compute_unit_limit: optional_bool(body, "dynamicComputeUnitLimit")?
            .unwrap_or(true),
        prioritization_fee_lamports: optional_u64(body, "prioritizationFeeLamports")?.unwrap_or(0),
    })
}

fn required_str<'a>(
    body: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ValidationError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn address(body: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    let value = required_str(body, field)?.trim();
    let len = value.chars().count();
    if len < MIN_ADDRESS_LEN {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: format!("must be at least {} characters", MIN_ADDRESS_LEN),
        });
    }
    if len > MAX_ADDRESS_LEN {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: format!("must be at most {} characters", MAX_ADDRESS_LEN),
        });
    }
    Ok(value.to_string())
}

fn optional_bool(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<bool>, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::InvalidType {
            field,
            expected: "a boolean",
        }),
    }
}

/// Non-negative integer. Integral floats such as `50.0` are accepted;
/// fractional and negative numbers are rejected.
fn optional_u64(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<u64>, ValidationError> {
    let not_integer = ValidationError::InvalidType {
        field,
        expected: "an integer",
    };
    let negative = ValidationError::InvalidFormat {
        field,
        reason: "must not be negative".to_string(),
    };

    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                return Ok(Some(v));
            }
            if n.as_i64().is_some() {
                return Err(negative);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => {
                    if f < 0.0 {
                        Err(negative)
                    } else if f <= u64::MAX as f64 {
                        Ok(Some(f as u64))
                    } else {
                        Err(not_integer)
                    }
                }
                _ => Err(not_integer),
            }
        }
        Some(_) => Err(ValidationError::InvalidType {
            field,
            expected: "an integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SOL: &str = "So11111111111111111111111111111111111111112";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_quote_defaults_applied() {
        let quote = validate_quote(&obj(json!({
            "inputMint": SOL,
            "outputMint": USDC,
            "amount": "1000000"
        })))
        .unwrap();
        assert_eq!(quote.slippage_bps, 50);
        assert!(!quote.only_direct_routes);
        assert_eq!(quote.amount, "1000000");
    }

    #[test]
    fn test_quote_amount_must_be_digits() {
        for amount in [json!("1e6"), json!("-5"), json!(""), json!("12.5"), json!(" 100")] {
            let err = validate_quote(&obj(json!({
                "inputMint": SOL,
                "outputMint": USDC,
                "amount": amount
            })))
            .unwrap_err();
            assert!(matches!(err, ValidationError::InvalidFormat { field: "amount", .. }));
        }

        let err = validate_quote(&obj(json!({
            "inputMint": SOL,
            "outputMint": USDC,
            "amount": 1000000
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "amount must be a string");
    }

    #[test]
    fn test_quote_slippage_bounds() {
        for bps in [json!(0), json!(1001), json!(-1), json!(2.5)] {
            let result = validate_quote(&obj(json!({
                "inputMint": SOL,
                "outputMint": USDC,
                "amount": "1",
                "slippageBps": bps
            })));
            assert!(result.is_err(), "slippageBps {} should be rejected", bps);
        }

        for bps in [1u64, 1000] {
            let quote = validate_quote(&obj(json!({
                "inputMint": SOL,
                "outputMint": USDC,
                "amount": "1",
                "slippageBps": bps
            })))
            .unwrap();
            assert_eq!(quote.slippage_bps as u64, bps);
        }
    }

    #[test]
    fn test_integral_floats_accepted() {
        let quote = validate_quote(&obj(json!({
            "inputMint": SOL,
            "outputMint": USDC,
            "amount": "1",
            "slippageBps": 50.0
        })))
        .unwrap();
        assert_eq!(quote.slippage_bps, 50);

        let swap = validate_swap(&obj(json!({
            "userPublicKey": USDC,
            "quoteResponse": {},
            "prioritizationFeeLamports": 1000.0
        })))
        .unwrap();
        assert_eq!(swap.prioritization_fee_lamports, 1000);

        let err = validate_quote(&obj(json!({
            "inputMint": SOL,
            "outputMint": USDC,
            "amount": "1",
            "slippageBps": 2.5
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "slippageBps must be an integer");

        let err = validate_swap(&obj(json!({
            "userPublicKey": USDC,
            "quoteResponse": {},
            "prioritizationFeeLamports": -3.0
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "prioritizationFeeLamports must not be negative");
    }

    #[test]
    fn test_quote_missing_mint() {
        let err = validate_quote(&obj(json!({"outputMint": USDC, "amount": "1"}))).unwrap_err();
        assert_eq!(err, ValidationError::Missing("inputMint"));
        assert_eq!(err.to_string(), "inputMint is required");
    }

    #[test]
    fn test_swap_short_public_key() {
        let err = validate_swap(&obj(json!({
            "userPublicKey": "short",
            "quoteResponse": {"inAmount": "1"}
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "userPublicKey must be at least 32 characters");
    }

    #[test]
    fn test_swap_defaults_and_passthrough() {
        let quote = json!({"inputMint": SOL, "routePlan": [{"percent": 100}]});
        let swap = validate_swap(&obj(json!({
            "userPublicKey": USDC,
            "quoteResponse": quote.clone()
        })))
        .unwrap();
        assert!(swap.wrap_and_unwrap_sol);
        assert!(swap.use_shared_accounts);
        assert!(swap.dynamic_compute_unit_limit);
        assert_eq!(swap.prioritization_fee_lamports, 0);
        assert_eq!(Value::Object(swap.quote_response), quote);
    }

    #[test]
    fn test_swap_rejects_bad_fields() {
        let err = validate_swap(&obj(json!({
            "userPublicKey": USDC,
            "quoteResponse": "not-an-object"
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "quoteResponse must be an object");

        let err = validate_swap(&obj(json!({
            "userPublicKey": USDC,
            "quoteResponse": {},
            "prioritizationFeeLamports": -1
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "prioritizationFeeLamports must not be negative");

        let err = validate_swap(&obj(json!({
            "userPublicKey": USDC,
            "quoteResponse": {},
            "wrapAndUnwrapSol": "yes"
        })))
        .unwrap_err();
        assert_eq!(err.to_string(), "wrapAndUnwrapSol must be a boolean");
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(b"").unwrap().is_empty());
        assert_eq!(parse_body(b"[1,2]").unwrap_err(), ValidationError::NotAnObject);
        assert!(matches!(parse_body(b"{nope"), Err(ValidationError::MalformedJson(_))));
    }
}

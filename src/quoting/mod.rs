//! Swap quoting request model and input schemas.

pub mod types;
pub mod validation;

pub use types::{QuoteRequest, SwapRequest, TokenDescriptor};
pub use validation::{parse_body, validate_quote, validate_swap, ValidationError};

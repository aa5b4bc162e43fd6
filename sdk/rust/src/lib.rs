//! Typed client for the swap gateway's HTTP API.

pub mod client;

pub use client::{ClientError, GatewayClient, Health, QuoteParams, SwapParams, Token};

//! Parse errors for the fundamental types.

use thiserror::Error;

/// Errors raised while parsing ledger identifiers, amounts and events.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address or object id: {0}")]
    InvalidId(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid struct tag: {0}")]
    InvalidStructTag(String),

    #[error("malformed token event: {0}")]
    MalformedEvent(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}

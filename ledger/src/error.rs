use seeds_types::ObjectId;
use thiserror::Error;

/// Errors raised by ledger clients.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger endpoint could not be reached or returned a non-2xx status.
    #[error("ledger transport error: {0}")]
    Transport(String),

    /// The ledger answered with a JSON-RPC error object.
    #[error("ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The ledger's answer could not be decoded.
    #[error("unexpected ledger response: {0}")]
    Decode(String),

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// The sender has no gas coin large enough for the budget.
    #[error("no gas coin covering budget {budget} owned by the sender")]
    NoGasCoin { budget: u64 },

    /// A transaction referenced an object by id only and it was never resolved.
    #[error("object input {0} was not resolved to a reference")]
    UnresolvedObject(ObjectId),

    /// A programmable transaction was rejected before submission.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            Self::Transport(format!("connection failed: {e}"))
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

use seeds_ledger::LedgerError;
use seeds_types::{TokenAmount, TransactionDigest};
use thiserror::Error;

use crate::coin_selection::SelectionError;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("administrative signer unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),

    #[error("transaction {digest} failed: {detail}")]
    TransactionFailed {
        digest: TransactionDigest,
        detail: String,
    },
}

impl From<SelectionError> for TokenError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::ZeroAmount => Self::InvalidInput("amount must be positive".into()),
            SelectionError::Insufficient { needed, available } => {
                Self::InsufficientBalance { needed, available }
            }
        }
    }
}

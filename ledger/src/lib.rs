//! Ledger access for the SEEDS API.
//!
//! Programmable transactions are assembled with
//! [`ProgrammableTransactionBuilder`], encoded to BCS, signed and submitted
//! through a [`LedgerClient`]. [`JsonRpcLedger`] is the production client.

pub mod bcs;
pub mod client;
pub mod error;
pub mod rpc;
pub mod transaction;
pub mod types;

pub use bcs::{GasData, TransactionData};
pub use client::LedgerClient;
pub use error::LedgerError;
pub use rpc::{JsonRpcLedger, DEFAULT_CONNECT_TIMEOUT, DEFAULT_GAS_BUDGET};
pub use transaction::{
    Argument, CallArg, Command, MoveCall, ObjectInput, ProgrammableTransaction,
    ProgrammableTransactionBuilder,
};
pub use types::{
    BalanceChange, EventId, EventQuery, ExecutionResult, ExecutionStatus, GasCostSummary,
    LedgerEvent, LedgerObject, ObjectOwner, Page, TransactionFilter, TransactionQuery,
    TransactionRecord,
};

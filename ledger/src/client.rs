//! The seam between token logic and the ledger.
//!
//! Production code talks to a full node through [`crate::JsonRpcLedger`];
//! tests and simulate mode use the in-memory ledger from `seeds-nullables`.

use async_trait::async_trait;

use seeds_crypto::AdminSigner;
use seeds_types::{Address, CoinObject, CoinType, ObjectId};

use crate::error::LedgerError;
use crate::transaction::ProgrammableTransaction;
use crate::types::{
    EventId, EventQuery, ExecutionResult, LedgerEvent, LedgerObject, Page, TransactionQuery,
    TransactionRecord,
};

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// One page of `owner`'s coins of `coin_type`, in ledger order.
    async fn get_coins(
        &self,
        owner: &Address,
        coin_type: &CoinType,
        cursor: Option<String>,
    ) -> Result<Page<CoinObject>, LedgerError>;

    async fn get_object(&self, id: &ObjectId) -> Result<LedgerObject, LedgerError>;

    /// Sign and submit `tx` once, waiting for its effects.
    ///
    /// A transaction that executed but aborted is returned as `Ok` with a
    /// failure status; `Err` means the outcome is unknown or it never ran.
    async fn execute(
        &self,
        tx: ProgrammableTransaction,
        signer: &AdminSigner,
    ) -> Result<ExecutionResult, LedgerError>;

    async fn query_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Page<TransactionRecord>, LedgerError>;

    async fn query_events(
        &self,
        query: &EventQuery,
    ) -> Result<Page<LedgerEvent, EventId>, LedgerError>;
}

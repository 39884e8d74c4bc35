//! Mint, transfer and burn.
//!
//! Every request is validated before the ledger is contacted. Transfers and
//! burns then read the owner's coins, select, assemble one transaction and
//! submit it once.

use std::sync::Arc;

use seeds_crypto::AdminSigner;
use seeds_ledger::LedgerClient;
use seeds_types::{Address, TokenAmount};

use crate::coin_selection::select_coins;
use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::inventory::fetch_all_coins;
use crate::transaction_builder::{
    amount_u64, assemble, assemble_mint, submit, FinalOperation, TransactionResult,
};

/// The operation a caller asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Mint { recipient: Address },
    Transfer { destination: Address },
    Burn,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::Burn => "burn",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub operation: Operation,
    pub amount: TokenAmount,
    /// Whose coins are spent; the administrative address when absent.
    pub owner: Option<Address>,
}

/// Token operations over a ledger, signed by the administrative key.
pub struct TokenService {
    ledger: Arc<dyn LedgerClient>,
    config: Arc<TokenConfig>,
    signer: Option<Arc<AdminSigner>>,
}

impl TokenService {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        config: Arc<TokenConfig>,
        signer: Option<Arc<AdminSigner>>,
    ) -> Self {
        Self {
            ledger,
            config,
            signer,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn ledger(&self) -> &dyn LedgerClient {
        self.ledger.as_ref()
    }

    pub fn signer(&self) -> Option<&AdminSigner> {
        self.signer.as_deref()
    }

    pub async fn mint(
        &self,
        amount: TokenAmount,
        recipient: Address,
    ) -> Result<TransactionResult, TokenError> {
        self.execute(TransactionRequest {
            operation: Operation::Mint { recipient },
            amount,
            owner: None,
        })
        .await
    }

    pub async fn transfer(
        &self,
        amount: TokenAmount,
        destination: Address,
        owner: Option<Address>,
    ) -> Result<TransactionResult, TokenError> {
        self.execute(TransactionRequest {
            operation: Operation::Transfer { destination },
            amount,
            owner,
        })
        .await
    }

    pub async fn burn(
        &self,
        amount: TokenAmount,
        owner: Option<Address>,
    ) -> Result<TransactionResult, TokenError> {
        self.execute(TransactionRequest {
            operation: Operation::Burn,
            amount,
            owner,
        })
        .await
    }

    /// Validate, plan and submit one request.
    pub async fn execute(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionResult, TokenError> {
        let owner = request.owner.unwrap_or(self.config.admin_address);
        self.validate(&request, owner)?;
        let signer = self.authorize(&request.operation, owner)?;

        tracing::info!(
            operation = request.operation.name(),
            amount = %request.amount.to_human(),
            %owner,
            "token operation requested"
        );

        let final_op = match request.operation {
            Operation::Mint { recipient } => {
                let tx = assemble_mint(request.amount, recipient, &self.config)?;
                return submit(
                    self.ledger(),
                    signer,
                    tx,
                    request.amount,
                    None,
                    Some(recipient),
                )
                .await;
            }
            Operation::Transfer { destination } => FinalOperation::Transfer { destination },
            Operation::Burn => FinalOperation::Burn,
        };

        let coins = fetch_all_coins(self.ledger(), &owner, &self.config.coin_type()).await?;
        let plan = select_coins(&coins, request.amount)?;
        tracing::debug!(
            primary = %plan.primary.object_id,
            merged = plan.to_merge.len(),
            split = plan.split_needed(),
            "coins selected"
        );

        let tx = assemble(&plan, final_op, &self.config)?;
        let recipient = match final_op {
            FinalOperation::Transfer { destination } => Some(destination),
            FinalOperation::Burn => None,
        };
        submit(self.ledger(), signer, tx, request.amount, Some(owner), recipient).await
    }

    fn validate(&self, request: &TransactionRequest, owner: Address) -> Result<(), TokenError> {
        if request.amount.is_zero() {
            return Err(TokenError::InvalidInput("amount must be positive".into()));
        }
        amount_u64(request.amount)?;
        if let Operation::Transfer { destination } = request.operation {
            if destination == owner {
                return Err(TokenError::InvalidInput(
                    "recipient must differ from the sending address".into(),
                ));
            }
        }
        Ok(())
    }

    /// The signer, provided it can act for `owner`.
    fn authorize(&self, operation: &Operation, owner: Address) -> Result<&AdminSigner, TokenError> {
        let signer = self.signer().ok_or_else(|| {
            TokenError::CapabilityUnavailable("no administrative key configured".into())
        })?;
        // Mints spend no coins; everything else spends the owner's.
        if !matches!(operation, Operation::Mint { .. }) && signer.address() != owner {
            return Err(TokenError::CapabilityUnavailable(format!(
                "administrative key controls {}, not {owner}",
                signer.address()
            )));
        }
        Ok(signer)
    }
}

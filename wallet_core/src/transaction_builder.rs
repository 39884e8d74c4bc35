//! Turns spend plans into programmable transactions and submits them.
//!
//! Transfer and burn share one assembly path: reconcile the plan's coins into
//! a single unit of exactly the requested amount, then apply the
//! [`FinalOperation`]. Everything goes into one transaction, so the ledger
//! commits all of it or none of it.

use serde::Serialize;
use serde_json::Value;

use seeds_crypto::AdminSigner;
use seeds_ledger::{
    Argument, ExecutionStatus, GasCostSummary, LedgerClient, LedgerEvent, ObjectInput,
    ProgrammableTransaction, ProgrammableTransactionBuilder,
};
use seeds_types::{Address, TokenAmount, TransactionDigest};

use crate::coin_selection::SpendPlan;
use crate::config::TokenConfig;
use crate::error::TokenError;

/// What happens to the reconciled coin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalOperation {
    /// Send it to another address.
    Transfer { destination: Address },
    /// Destroy it through the treasury cap.
    Burn,
}

/// A committed transaction, normalized for callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub digest: TransactionDigest,
    pub status: ExecutionStatus,
    pub amount: TokenAmount,
    pub gas_used: GasCostSummary,
    pub events: Vec<LedgerEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_changes: Option<Value>,
    /// Whose coins were spent; absent for mints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    /// Who received the tokens; absent for burns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
}

pub(crate) fn amount_u64(amount: TokenAmount) -> Result<u64, TokenError> {
    amount.to_u64().ok_or_else(|| {
        TokenError::InvalidInput(format!("amount {amount} exceeds the ledger's range"))
    })
}

/// Build the transaction for a spend.
///
/// Commands, in order: merge the extra coins into the primary (if any), split
/// the requested amount off it (if it holds more), then transfer or burn the
/// resulting unit.
pub fn assemble(
    plan: &SpendPlan,
    operation: FinalOperation,
    config: &TokenConfig,
) -> Result<ProgrammableTransaction, TokenError> {
    if plan.final_unit_estimated_balance() < plan.requested {
        return Err(TokenError::InsufficientBalance {
            needed: plan.requested,
            available: plan.final_unit_estimated_balance(),
        });
    }

    let mut ptb = ProgrammableTransactionBuilder::new();
    let primary = ptb.object(ObjectInput::Owned(plan.primary.object_ref()));

    if plan.merge_needed() {
        let sources: Vec<Argument> = plan
            .to_merge
            .iter()
            .map(|c| ptb.object(ObjectInput::Owned(c.object_ref())))
            .collect();
        ptb.merge_coins(primary, sources);
    }

    let unit = if plan.split_needed() {
        let amount = ptb.pure_u64(amount_u64(plan.requested)?);
        ptb.split_coins(primary, vec![amount])[0]
    } else {
        primary
    };

    match operation {
        FinalOperation::Transfer { destination } => {
            let recipient = ptb.pure_address(destination);
            ptb.transfer_objects(vec![unit], recipient);
        }
        FinalOperation::Burn => {
            let cap = ptb.object(ObjectInput::ById(config.treasury_cap_id));
            ptb.move_call(
                config.package_id,
                config.module.clone(),
                "burn_coin",
                vec![cap, unit],
            );
        }
    }
    Ok(ptb.finish())
}

/// Build `seeds_coin::mint(treasury_cap, amount, recipient)`.
pub fn assemble_mint(
    amount: TokenAmount,
    recipient: Address,
    config: &TokenConfig,
) -> Result<ProgrammableTransaction, TokenError> {
    let mut ptb = ProgrammableTransactionBuilder::new();
    let cap = ptb.object(ObjectInput::ById(config.treasury_cap_id));
    let amount = ptb.pure_u64(amount_u64(amount)?);
    let recipient = ptb.pure_address(recipient);
    ptb.move_call(
        config.package_id,
        config.module.clone(),
        "mint",
        vec![cap, amount, recipient],
    );
    Ok(ptb.finish())
}

/// Sign and submit `tx` exactly once.
///
/// A ledger error means the outcome is unknown and is returned as
/// [`TokenError::LedgerUnavailable`]; callers must not resubmit blindly. An
/// executed-but-failed transaction becomes [`TokenError::TransactionFailed`].
pub async fn submit(
    ledger: &dyn LedgerClient,
    signer: &AdminSigner,
    tx: ProgrammableTransaction,
    amount: TokenAmount,
    owner: Option<Address>,
    recipient: Option<Address>,
) -> Result<TransactionResult, TokenError> {
    let commands = tx.commands.len();
    let result = ledger.execute(tx, signer).await?;

    if let ExecutionStatus::Failure { error } = &result.status {
        tracing::warn!(digest = %result.digest, %error, "transaction failed on ledger");
        return Err(TokenError::TransactionFailed {
            digest: result.digest,
            detail: error.clone(),
        });
    }

    tracing::info!(
        digest = %result.digest,
        commands,
        amount = %amount.to_human(),
        computation_cost = result.gas_used.computation_cost,
        "transaction committed"
    );
    Ok(TransactionResult {
        digest: result.digest,
        status: result.status,
        amount,
        gas_used: result.gas_used,
        events: result.events,
        object_changes: result.object_changes,
        owner,
        recipient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin_selection::select_coins;
    use seeds_ledger::{CallArg, Command};
    use seeds_types::{CoinObject, ObjectDigest, ObjectId};

    fn config() -> TokenConfig {
        TokenConfig::new(
            "0xabc".parse().unwrap(),
            ObjectId::new([0xCA; 32]),
            Address::new([1; 32]),
        )
    }

    fn coin(tag: u8, balance: u128) -> CoinObject {
        CoinObject {
            object_id: ObjectId::new([tag; 32]),
            version: tag as u64,
            digest: ObjectDigest::new([tag; 32]),
            balance: TokenAmount::new(balance),
            owner: Address::new([1; 32]),
        }
    }

    fn dest() -> Address {
        Address::new([0xD0; 32])
    }

    #[test]
    fn exact_coin_is_transferred_as_is() {
        let plan = select_coins(&[coin(1, 1_000_000)], TokenAmount::new(1_000_000)).unwrap();
        let transfer = FinalOperation::Transfer {
            destination: dest(),
        };
        let tx = assemble(&plan, transfer, &config()).unwrap();
        assert_eq!(tx.commands.len(), 1);
        assert_eq!(
            tx.commands[0],
            Command::TransferObjects(vec![Argument::Input(0)], Argument::Input(1))
        );
        assert_eq!(tx.inputs[1], CallArg::Pure(dest().as_bytes().to_vec()));
    }

    #[test]
    fn split_then_burn_uses_split_result() {
        let plan = select_coins(&[coin(1, 5_000_000)], TokenAmount::new(2_000_000)).unwrap();
        let tx = assemble(&plan, FinalOperation::Burn, &config()).unwrap();
        assert_eq!(
            tx.commands[0],
            Command::SplitCoins(Argument::Input(0), vec![Argument::Input(1)])
        );
        assert_eq!(tx.inputs[1], CallArg::Pure(2_000_000u64.to_le_bytes().to_vec()));
        let Command::MoveCall(call) = &tx.commands[1] else {
            panic!("expected a move call");
        };
        assert_eq!(call.function, "burn_coin");
        assert_eq!(call.module, "seeds_coin");
        assert_eq!(
            call.arguments,
            vec![Argument::Input(2), Argument::NestedResult(0, 0)]
        );
        assert_eq!(
            tx.inputs[2],
            CallArg::Object(ObjectInput::ById(ObjectId::new([0xCA; 32])))
        );
    }

    #[test]
    fn merge_precedes_split_precedes_transfer() {
        let coins = [coin(3, 3_000_000), coin(2, 2_000_000), coin(4, 1_000_000)];
        let plan = select_coins(&coins, TokenAmount::new(4_500_000)).unwrap();
        let transfer = FinalOperation::Transfer {
            destination: dest(),
        };
        let tx = assemble(&plan, transfer, &config()).unwrap();
        assert_eq!(tx.commands.len(), 3);
        assert_eq!(
            tx.commands[0],
            Command::MergeCoins(Argument::Input(0), vec![Argument::Input(1)])
        );
        assert!(matches!(tx.commands[1], Command::SplitCoins(Argument::Input(0), _)));
        assert_eq!(
            tx.commands[2],
            Command::TransferObjects(vec![Argument::NestedResult(1, 0)], Argument::Input(3))
        );
        // The unused 1_000_000 coin is not an input.
        assert_eq!(tx.object_ids().len(), 2);
    }

    #[test]
    fn mint_calls_module_with_cap_amount_recipient() {
        let tx = assemble_mint(TokenAmount::new(7), dest(), &config()).unwrap();
        let Command::MoveCall(call) = &tx.commands[0] else {
            panic!("expected a move call");
        };
        assert_eq!(call.function, "mint");
        assert_eq!(call.package, config().package_id);
        assert_eq!(
            call.arguments,
            vec![Argument::Input(0), Argument::Input(1), Argument::Input(2)]
        );
    }

    #[test]
    fn amounts_beyond_u64_are_rejected() {
        let huge = TokenAmount::new(u64::MAX as u128 + 1);
        assert!(matches!(
            assemble_mint(huge, dest(), &config()),
            Err(TokenError::InvalidInput(_))
        ));
    }

    #[test]
    fn underfunded_plan_is_not_built() {
        let plan = SpendPlan {
            primary: coin(1, 10),
            to_merge: Vec::new(),
            requested: TokenAmount::new(11),
            accumulated: TokenAmount::new(10),
        };
        assert!(matches!(
            assemble(&plan, FinalOperation::Burn, &config()),
            Err(TokenError::InsufficientBalance { .. })
        ));
    }
}

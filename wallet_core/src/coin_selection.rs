//! Coin selection for exact-amount spends.
//!
//! Value sits in discrete coin objects, so spending an exact amount may need
//! the owner's coins reconciled first: several merged into one, then the
//! result split so a coin of exactly the requested balance exists. Selection
//! is greedy and largest-first, which merges as few coins as possible.

use seeds_types::{CoinObject, TokenAmount};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("requested amount is zero")]
    ZeroAmount,

    #[error("insufficient balance: need {needed}, have {available}")]
    Insufficient {
        needed: TokenAmount,
        available: TokenAmount,
    },
}

/// Which coins to consume and how to reshape them into one coin of exactly
/// `requested`.
///
/// Built by [`select_coins`] and consumed right away by the transaction
/// builder; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendPlan {
    /// Largest coin; merges land here and the split is taken from it.
    pub primary: CoinObject,
    /// Further coins merged into `primary`, largest first.
    pub to_merge: Vec<CoinObject>,
    pub requested: TokenAmount,
    /// Balance of `primary` once everything is merged.
    pub accumulated: TokenAmount,
}

impl SpendPlan {
    pub fn merge_needed(&self) -> bool {
        !self.to_merge.is_empty()
    }

    pub fn split_needed(&self) -> bool {
        self.accumulated > self.requested
    }

    /// Every coin the plan consumes: the primary first, then the merge inputs.
    pub fn source_objects(&self) -> impl Iterator<Item = &CoinObject> {
        std::iter::once(&self.primary).chain(self.to_merge.iter())
    }

    /// Balance of the reconciled coin before any split.
    pub fn final_unit_estimated_balance(&self) -> TokenAmount {
        self.accumulated
    }

    /// What stays with the owner after the split.
    pub fn change(&self) -> TokenAmount {
        self.accumulated.saturating_sub(self.requested)
    }
}

/// Choose coins to cover exactly `requested`.
///
/// Coins are ordered by balance, largest first; equal balances keep their
/// input order so the same inventory always yields the same plan. The largest
/// coin is the primary, and following coins are added for merging until the
/// running total covers the request.
pub fn select_coins(
    coins: &[CoinObject],
    requested: TokenAmount,
) -> Result<SpendPlan, SelectionError> {
    if requested.is_zero() {
        return Err(SelectionError::ZeroAmount);
    }

    let mut sorted: Vec<&CoinObject> = coins.iter().collect();
    // `sort_by` is stable.
    sorted.sort_by(|a, b| b.balance.cmp(&a.balance));

    let Some((primary, rest)) = sorted.split_first() else {
        return Err(SelectionError::Insufficient {
            needed: requested,
            available: TokenAmount::ZERO,
        });
    };

    let mut accumulated = primary.balance;
    let mut to_merge = Vec::new();
    for coin in rest {
        if accumulated >= requested {
            break;
        }
        accumulated = accumulated.saturating_add(coin.balance);
        to_merge.push((*coin).clone());
    }

    if accumulated < requested {
        return Err(SelectionError::Insufficient {
            needed: requested,
            available: accumulated,
        });
    }

    Ok(SpendPlan {
        primary: (*primary).clone(),
        to_merge,
        requested,
        accumulated,
    })
}

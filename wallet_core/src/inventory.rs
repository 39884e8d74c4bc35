//! Coin inventory: every coin object an owner holds of one coin type.

use seeds_ledger::{LedgerClient, LedgerError};
use seeds_types::{Address, CoinObject, CoinType};

/// Upper bound on pages followed for one owner, so a node that keeps
/// returning `hasNextPage` cannot stall a request forever.
pub const MAX_COIN_PAGES: usize = 1_000;

/// List all of `owner`'s coins of `coin_type`, following every page, in
/// ledger order.
///
/// An empty list means the owner holds nothing; a ledger failure is returned
/// as an error and must not be read as a zero balance.
pub async fn fetch_all_coins(
    ledger: &dyn LedgerClient,
    owner: &Address,
    coin_type: &CoinType,
) -> Result<Vec<CoinObject>, LedgerError> {
    let mut coins = Vec::new();
    let mut cursor = None;
    for _ in 0..MAX_COIN_PAGES {
        let page = ledger.get_coins(owner, coin_type, cursor).await?;
        coins.extend(page.data);
        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => return Ok(coins),
        }
    }
    tracing::warn!(%owner, pages = MAX_COIN_PAGES, "coin listing truncated");
    Ok(coins)
}

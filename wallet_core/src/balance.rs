//! Balance of one address.

use seeds_ledger::LedgerClient;
use seeds_types::{Address, CoinObject, TokenAmount, DECIMALS};

use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::inventory::fetch_all_coins;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceSummary {
    pub address: Address,
    pub total: TokenAmount,
    pub decimals: u32,
    pub coins: Vec<CoinObject>,
}

impl BalanceSummary {
    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }
}

/// Sum `address`'s coins, defaulting to the administrative address.
pub async fn fetch_balance(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    address: Option<Address>,
) -> Result<BalanceSummary, TokenError> {
    let address = address.unwrap_or(config.admin_address);
    let coins = fetch_all_coins(ledger, &address, &config.coin_type()).await?;
    Ok(BalanceSummary {
        address,
        total: coins.iter().map(|c| c.balance).sum(),
        decimals: DECIMALS,
        coins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeds_nullables::{NullLedger, NullLedgerConfig};
    use seeds_types::ObjectId;

    fn setup() -> (NullLedger, TokenConfig) {
        let admin = Address::new([1; 32]);
        let package: ObjectId = "0xabc".parse().unwrap();
        let cap = ObjectId::new([0xCA; 32]);
        let ledger = NullLedger::new(NullLedgerConfig {
            package,
            module: "seeds_coin".into(),
            coin_name: "SEEDS_COIN".into(),
            treasury_cap: cap,
            admin,
            config_object: None,
            max_supply: u64::MAX,
        });
        (ledger, TokenConfig::new(package, cap, admin))
    }

    #[tokio::test]
    async fn defaults_to_admin_and_sums_coins() {
        let (ledger, config) = setup();
        ledger.seed_coin(config.admin_address, TokenAmount::new(1_500_000));
        ledger.seed_coin(config.admin_address, TokenAmount::new(250));
        let summary = fetch_balance(&ledger, &config, None).await.unwrap();
        assert_eq!(summary.address, config.admin_address);
        assert_eq!(summary.total.to_human(), "1.500250");
        assert_eq!(summary.coin_count(), 2);
        assert_eq!(summary.decimals, 6);
    }

    #[tokio::test]
    async fn other_coin_types_are_ignored() {
        let (ledger, config) = setup();
        let other = Address::new([5; 32]);
        ledger.seed_coin_of(other, seeds_types::CoinType::gas(), TokenAmount::new(99));
        let summary = fetch_balance(&ledger, &config, Some(other)).await.unwrap();
        assert_eq!(summary.total, TokenAmount::ZERO);
        assert!(summary.coins.is_empty());
    }
}

//! Supply, holder distribution and transaction statistics.
//!
//! The three sections are computed concurrently and independently. A section
//! whose ledger reads fail falls back to its default, logs a warning and is
//! named in [`AnalyticsReport::partial_failures`]; the others are unaffected.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use futures_util::future::try_join_all;
use serde_json::Value;

use seeds_ledger::{
    EventQuery, LedgerClient, LedgerError, LedgerEvent, TransactionFilter, TransactionQuery,
};
use seeds_types::{
    Address, CoinObject, CoinType, TokenAmount, TokenEvent, TokenEventKind, TypesError,
};

use crate::config::{TokenConfig, DEFAULT_MAX_SUPPLY};
use crate::error::TokenError;
use crate::inventory::fetch_all_coins;

/// Ledger page size used while scanning.
const SCAN_PAGE_SIZE: usize = 50;

/// Holders listed in the distribution.
pub const TOP_HOLDERS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsOptions {
    /// Pages of token events read to discover holders.
    pub holder_scan_pages: usize,
    /// Most recent token-module transactions counted in the statistics.
    pub stats_window: usize,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            holder_scan_pages: 20,
            stats_window: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SupplyStats {
    /// Minted so far, as tracked on chain.
    pub total_supply: TokenAmount,
    pub max_supply: TokenAmount,
    /// Sum of every coin balance.
    pub circulating_supply: TokenAmount,
    pub burned: TokenAmount,
    /// `total_supply / max_supply` in percent, two decimals.
    pub utilization_pct: f64,
}

impl Default for SupplyStats {
    fn default() -> Self {
        Self {
            total_supply: TokenAmount::ZERO,
            max_supply: TokenAmount::from(DEFAULT_MAX_SUPPLY),
            circulating_supply: TokenAmount::ZERO,
            burned: TokenAmount::ZERO,
            utilization_pct: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HolderShare {
    pub address: Address,
    pub balance: TokenAmount,
    pub percentage: f64,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistributionStats {
    /// Largest holders first, at most [`TOP_HOLDERS`].
    pub holders: Vec<HolderShare>,
    pub total_holders: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindStats {
    pub count: u64,
    pub volume: TokenAmount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub mints: KindStats,
    pub transfers: KindStats,
    pub burns: KindStats,
    pub total_volume: TokenAmount,
}

impl TransactionStats {
    fn record(&mut self, event: &TokenEvent) {
        let slot = match event.kind() {
            TokenEventKind::Mint => &mut self.mints,
            TokenEventKind::Transfer => &mut self.transfers,
            TokenEventKind::Burn => &mut self.burns,
        };
        slot.count += 1;
        slot.volume = slot.volume.saturating_add(event.amount());
        self.total_volume = self.total_volume.saturating_add(event.amount());
    }
}

/// A section that fell back to its default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalyticsSection {
    Supply,
    Distribution,
    Transactions,
}

impl AnalyticsSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Distribution => "distribution",
            Self::Transactions => "transactions",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalyticsReport {
    pub supply: SupplyStats,
    pub distribution: DistributionStats,
    pub transactions: TransactionStats,
    pub partial_failures: Vec<AnalyticsSection>,
}

/// Run all three sections concurrently. Never fails as a whole.
///
/// Holders and their coins are read once and shared by the supply and
/// distribution sections.
pub async fn fetch_analytics(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    options: &AnalyticsOptions,
) -> AnalyticsReport {
    let (counters, holdings, transactions) = tokio::join!(
        supply_counters(ledger, config),
        token_holdings(ledger, config, options),
        transaction_stats(ledger, config, options),
    );

    let (supply, distribution) = match holdings {
        Ok(coins) => (
            counters
                .map(|counters| supply_from(counters, &coins))
                .map_err(|e| e.to_string()),
            Ok(distribution_from_coins(&coins, &config.admin_address)),
        ),
        Err(err) => {
            let reason = format!("token holdings: {err}");
            (Err(reason.clone()), Err(reason))
        }
    };

    let mut partial_failures = Vec::new();
    AnalyticsReport {
        supply: settle(supply, AnalyticsSection::Supply, &mut partial_failures),
        distribution: settle(
            distribution,
            AnalyticsSection::Distribution,
            &mut partial_failures,
        ),
        transactions: settle(
            transactions,
            AnalyticsSection::Transactions,
            &mut partial_failures,
        ),
        partial_failures,
    }
}

fn settle<T: Default, E: fmt::Display>(
    result: Result<T, E>,
    section: AnalyticsSection,
    failures: &mut Vec<AnalyticsSection>,
) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(section = section.as_str(), %err, "analytics section unavailable");
        failures.push(section);
        T::default()
    })
}

/// Supply counters tracked on chain: minted so far and the cap.
async fn supply_counters(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
) -> Result<(u64, u64), TokenError> {
    match config.config_object_id {
        Some(id) => {
            let obj = ledger.get_object(&id).await?;
            Ok((
                obj.u64_field("current_supply").unwrap_or(0),
                obj.u64_field("max_supply").unwrap_or(DEFAULT_MAX_SUPPLY),
            ))
        }
        // Without a config object the treasury cap still tracks supply.
        None => {
            let cap = ledger.get_object(&config.treasury_cap_id).await?;
            Ok((treasury_supply(&cap.fields).unwrap_or(0), DEFAULT_MAX_SUPPLY))
        }
    }
}

/// Combine the on-chain counters with the coins actually held.
pub fn supply_from((minted, max): (u64, u64), coins: &[CoinObject]) -> SupplyStats {
    let total_supply = TokenAmount::from(minted);
    let circulating_supply: TokenAmount = coins.iter().map(|c| c.balance).sum();
    let utilization_pct = if max == 0 {
        0.0
    } else {
        round2(minted as f64 / max as f64 * 100.0)
    };

    SupplyStats {
        total_supply,
        max_supply: TokenAmount::from(max),
        circulating_supply,
        burned: total_supply.saturating_sub(circulating_supply),
        utilization_pct,
    }
}

/// `total_supply.value` of a treasury cap, nested or flattened.
fn treasury_supply(fields: &Value) -> Option<u64> {
    let supply = fields.get("total_supply")?;
    let value = supply
        .get("fields")
        .and_then(|f| f.get("value"))
        .or_else(|| supply.get("value"))?;
    match value {
        Value::String(s) => s.parse().ok(),
        other => other.as_u64(),
    }
}

/// Group coins by owner and rank the holders.
pub fn distribution_from_coins(coins: &[CoinObject], admin: &Address) -> DistributionStats {
    let mut by_owner: HashMap<Address, TokenAmount> = HashMap::new();
    for coin in coins {
        let entry = by_owner.entry(coin.owner).or_default();
        *entry = entry.saturating_add(coin.balance);
    }

    let mut holders: Vec<(Address, TokenAmount)> = by_owner
        .into_iter()
        .filter(|(_, balance)| !balance.is_zero())
        .collect();
    holders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total: TokenAmount = holders.iter().map(|(_, b)| *b).sum();
    let total_holders = holders.len();
    let holders = holders
        .into_iter()
        .take(TOP_HOLDERS)
        .enumerate()
        .map(|(rank, (address, balance))| HolderShare {
            address,
            balance,
            percentage: if total.is_zero() {
                0.0
            } else {
                round2(balance.raw() as f64 / total.raw() as f64 * 100.0)
            },
            label: holder_label(rank, &address, admin),
        })
        .collect();

    DistributionStats {
        holders,
        total_holders,
    }
}

fn holder_label(rank: usize, address: &Address, admin: &Address) -> String {
    if address == admin {
        "Admin Wallet".to_string()
    } else if rank == 0 {
        "Top Holder".to_string()
    } else if rank < 5 {
        format!("Holder #{}", rank + 1)
    } else {
        "Other".to_string()
    }
}

/// Count every token event in the most recent token-module transactions.
pub async fn transaction_stats(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    options: &AnalyticsOptions,
) -> Result<TransactionStats, TokenError> {
    let mut stats = TransactionStats::default();
    let mut seen = 0;
    let mut cursor = None;

    while seen < options.stats_window {
        let page = ledger
            .query_transactions(&TransactionQuery {
                filter: TransactionFilter::module(config.package_id, config.module.clone()),
                cursor,
                limit: (options.stats_window - seen).min(SCAN_PAGE_SIZE),
                descending: true,
            })
            .await?;
        seen += page.data.len();

        for event in page.data.iter().flat_map(|r| r.events.iter()) {
            match token_event(event, config) {
                Ok(Some(ev)) => stats.record(&ev),
                Ok(None) => {}
                Err(err) => tracing::debug!(%err, "skipping malformed event"),
            }
        }

        match page.next_cursor {
            Some(next) if page.has_next_page && !page.data.is_empty() => cursor = Some(next),
            _ => break,
        }
    }
    Ok(stats)
}

fn token_event(
    event: &LedgerEvent,
    config: &TokenConfig,
) -> Result<Option<TokenEvent>, TypesError> {
    TokenEvent::parse(
        &event.event_type,
        &event.parsed_json,
        &config.package_id,
        &config.module,
    )
}

/// Every address that may hold the token.
///
/// The ledger keeps no index of holders by coin type. Holders are the
/// administrative address, everyone the token module's events name, and
/// every owner whose token balance grew in a transaction the administrative
/// address signed. Transfers emit no token event, so their recipients are
/// only found the last way.
pub async fn discover_holders(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    options: &AnalyticsOptions,
) -> Result<Vec<Address>, LedgerError> {
    let (named, credited) = tokio::try_join!(
        event_participants(ledger, config, options),
        credited_by_admin(ledger, config, options),
    )?;
    let mut holders = BTreeSet::from([config.admin_address]);
    holders.extend(named);
    holders.extend(credited);
    Ok(holders.into_iter().collect())
}

async fn event_participants(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    options: &AnalyticsOptions,
) -> Result<BTreeSet<Address>, LedgerError> {
    let mut named = BTreeSet::new();
    let mut cursor = None;

    for _ in 0..options.holder_scan_pages {
        let page = ledger
            .query_events(&EventQuery {
                package: config.package_id,
                module: config.module.clone(),
                cursor,
                limit: SCAN_PAGE_SIZE,
                descending: false,
            })
            .await?;

        for event in &page.data {
            if let Ok(Some(ev)) = token_event(event, config) {
                named.extend(ev.from());
                named.extend(ev.to());
            }
        }

        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => break,
        }
    }
    Ok(named)
}

async fn credited_by_admin(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    options: &AnalyticsOptions,
) -> Result<BTreeSet<Address>, LedgerError> {
    let coin_type = config.coin_type();
    let mut credited = BTreeSet::new();
    let mut cursor = None;

    for _ in 0..options.holder_scan_pages {
        let page = ledger
            .query_transactions(&TransactionQuery {
                filter: TransactionFilter::FromAddress(config.admin_address),
                cursor,
                limit: SCAN_PAGE_SIZE,
                descending: false,
            })
            .await?;

        for change in page.data.iter().flat_map(|r| r.balance_changes.iter()) {
            let is_token = change
                .coin_type
                .parse::<CoinType>()
                .is_ok_and(|t| t == coin_type);
            if is_token && change.amount > 0 {
                credited.extend(change.address());
            }
        }

        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => break,
        }
    }
    Ok(credited)
}

/// Every token coin held by a discovered holder.
async fn token_holdings(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    options: &AnalyticsOptions,
) -> Result<Vec<CoinObject>, LedgerError> {
    let holders = discover_holders(ledger, config, options).await?;
    let coin_type = config.coin_type();
    let per_holder = try_join_all(
        holders
            .iter()
            .map(|owner| fetch_all_coins(ledger, owner, &coin_type)),
    )
    .await?;
    Ok(per_holder.into_iter().flatten().collect())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeds_types::{ObjectDigest, ObjectId};
    use serde_json::json;

    fn coin(owner: u8, tag: u8, balance: u128) -> CoinObject {
        CoinObject {
            object_id: ObjectId::new([tag; 32]),
            version: 1,
            digest: ObjectDigest::new([tag; 32]),
            balance: TokenAmount::new(balance),
            owner: Address::new([owner; 32]),
        }
    }

    #[test]
    fn distribution_groups_ranks_and_labels() {
        let admin = Address::new([1; 32]);
        let coins = vec![
            coin(2, 10, 500),
            coin(1, 11, 300),
            coin(2, 12, 100),
            coin(3, 13, 50),
            coin(4, 14, 50),
        ];
        let dist = distribution_from_coins(&coins, &admin);
        assert_eq!(dist.total_holders, 4);
        let labels: Vec<&str> = dist.holders.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Top Holder", "Admin Wallet", "Holder #3", "Holder #4"]);
        assert_eq!(dist.holders[0].balance, TokenAmount::new(600));
        assert_eq!(dist.holders[0].percentage, 60.0);
        assert_eq!(dist.holders[2].percentage, 5.0);
        // Ties break on address.
        assert_eq!(dist.holders[2].address, Address::new([3; 32]));
    }

    #[test]
    fn distribution_keeps_top_ten() {
        let coins: Vec<CoinObject> = (1..=12u8).map(|i| coin(i, i, i as u128 * 10)).collect();
        let dist = distribution_from_coins(&coins, &Address::ZERO);
        assert_eq!(dist.total_holders, 12);
        assert_eq!(dist.holders.len(), TOP_HOLDERS);
        assert_eq!(dist.holders[5].label, "Other");
        assert_eq!(dist.holders[4].label, "Holder #5");
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let coins = vec![coin(1, 1, 1), coin(2, 2, 2)];
        let dist = distribution_from_coins(&coins, &Address::ZERO);
        assert_eq!(dist.holders[0].percentage, 66.67);
        assert_eq!(dist.holders[1].percentage, 33.33);
    }

    #[test]
    fn empty_distribution_is_default() {
        assert_eq!(
            distribution_from_coins(&[], &Address::ZERO),
            DistributionStats::default()
        );
    }

    #[test]
    fn treasury_supply_reads_both_shapes() {
        assert_eq!(
            treasury_supply(&json!({"total_supply": {"fields": {"value": "12"}}})),
            Some(12)
        );
        assert_eq!(treasury_supply(&json!({"total_supply": {"value": 7}})), Some(7));
        assert_eq!(treasury_supply(&json!({})), None);
    }

    #[test]
    fn default_supply_uses_default_max() {
        let s = SupplyStats::default();
        assert_eq!(s.max_supply.to_human(), "5000000000.000000");
        assert_eq!(s.utilization_pct, 0.0);
    }
}

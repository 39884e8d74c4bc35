//! Token transaction history.
//!
//! Lists transactions that called the token module, keeps the first token
//! event of each and applies the caller's filters. Records without a token
//! event, or whose event payload does not decode, are skipped.

use chrono::{DateTime, NaiveDate};

use seeds_ledger::{
    ExecutionStatus, LedgerClient, TransactionFilter, TransactionQuery, TransactionRecord,
};
use seeds_types::{Address, TimestampMs, TokenAmount, TokenEvent, TokenEventKind, TransactionDigest};

use crate::config::TokenConfig;
use crate::error::TokenError;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 50;

/// Parse a filter date: RFC 3339, `YYYY-MM-DD` (midnight UTC) or epoch
/// milliseconds.
pub fn parse_date(input: &str) -> Result<TimestampMs, TokenError> {
    let s = input.trim();
    let invalid = || TokenError::InvalidInput(format!("invalid date: {input}"));

    let millis = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.timestamp_millis()
    } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        date.and_hms_opt(0, 0, 0)
            .ok_or_else(invalid)?
            .and_utc()
            .timestamp_millis()
    } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<u64>().map(TimestampMs::new).map_err(|_| invalid());
    } else {
        return Err(invalid());
    };

    u64::try_from(millis).map(TimestampMs::new).map_err(|_| invalid())
}

/// Conditions an entry must meet; unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub kind: Option<TokenEventKind>,
    pub from_date: Option<TimestampMs>,
    pub to_date: Option<TimestampMs>,
    pub min_amount: Option<TokenAmount>,
    pub max_amount: Option<TokenAmount>,
    /// Case-insensitive fragment of the sending or receiving address.
    pub address: Option<String>,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        if self.kind.is_some_and(|k| k != entry.kind) {
            return false;
        }
        if self.from_date.is_some_and(|d| entry.timestamp < d)
            || self.to_date.is_some_and(|d| entry.timestamp > d)
        {
            return false;
        }
        if self.min_amount.is_some_and(|m| entry.amount < m)
            || self.max_amount.is_some_and(|m| entry.amount > m)
        {
            return false;
        }
        match &self.address {
            Some(needle) => entry.involves(needle),
            None => true,
        }
    }
}

/// One row of history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: TokenEventKind,
    pub amount: TokenAmount,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub timestamp: TimestampMs,
    pub tx_digest: TransactionDigest,
    /// Computation cost of the transaction.
    pub gas_used: u64,
    pub status: ExecutionStatus,
}

impl HistoryEntry {
    /// Build an entry from the record's first token event.
    ///
    /// `None` if the record carries no token event or its first one is
    /// malformed. A record without a timestamp is stamped `now`.
    pub fn from_record(
        record: &TransactionRecord,
        config: &TokenConfig,
        now: TimestampMs,
    ) -> Option<Self> {
        let event = record.events.iter().find_map(|e| {
            TokenEvent::parse(
                &e.event_type,
                &e.parsed_json,
                &config.package_id,
                &config.module,
            )
            .map_err(|err| {
                tracing::debug!(digest = %record.digest, %err, "skipping malformed event")
            })
            .transpose()
        })?;
        let event = event.ok()?;

        Some(Self {
            kind: event.kind(),
            amount: event.amount(),
            from: event.from(),
            to: event.to(),
            timestamp: record.timestamp_ms.unwrap_or(now),
            tx_digest: record.digest,
            gas_used: record.gas_used.computation_cost,
            status: record.status.clone(),
        })
    }

    fn involves(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        let parsed: Option<Address> = needle.parse().ok();
        [self.from, self.to].into_iter().flatten().any(|a| {
            Some(a) == parsed || a.to_hex().to_lowercase().contains(&needle)
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryRequest {
    pub filter: HistoryFilter,
    pub limit: usize,
    pub cursor: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryPage {
    /// Newest first.
    pub entries: Vec<HistoryEntry>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Fetch one page of token-module transactions and filter it.
///
/// Filters apply within the page, so a page may hold fewer than `limit`
/// entries while more remain on the ledger.
pub async fn fetch_history(
    ledger: &dyn LedgerClient,
    config: &TokenConfig,
    request: &HistoryRequest,
    now: TimestampMs,
) -> Result<HistoryPage, TokenError> {
    let page = ledger
        .query_transactions(&TransactionQuery {
            filter: TransactionFilter::module(config.package_id, config.module.clone()),
            cursor: request.cursor.clone(),
            limit: request.limit.clamp(1, MAX_HISTORY_LIMIT),
            descending: true,
        })
        .await?;

    let mut entries: Vec<HistoryEntry> = page
        .data
        .iter()
        .filter_map(|r| HistoryEntry::from_record(r, config, now))
        .filter(|e| request.filter.matches(e))
        .collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(HistoryPage {
        entries,
        next_cursor: page.next_cursor,
        has_next_page: page.has_next_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeds_ledger::{EventId, GasCostSummary, LedgerEvent};
    use seeds_nullables::{NullLedger, NullLedgerConfig};
    use seeds_types::ObjectId;
    use serde_json::{json, Value};

    fn config() -> TokenConfig {
        TokenConfig::new(
            "0xabc".parse().unwrap(),
            ObjectId::new([0xCA; 32]),
            Address::new([1; 32]),
        )
    }

    fn event(name: &str, payload: Value) -> LedgerEvent {
        LedgerEvent {
            id: EventId {
                tx_digest: TransactionDigest::ZERO,
                event_seq: 0,
            },
            event_type: format!("{}::seeds_coin::{name}", config().package_id),
            sender: Address::new([1; 32]),
            parsed_json: payload,
            timestamp_ms: None,
        }
    }

    fn record(tag: u8, ts: Option<u64>, events: Vec<LedgerEvent>) -> TransactionRecord {
        TransactionRecord {
            digest: TransactionDigest::new([tag; 32]),
            timestamp_ms: ts.map(TimestampMs::new),
            status: ExecutionStatus::Success,
            gas_used: GasCostSummary {
                computation_cost: 750,
                ..Default::default()
            },
            events,
            balance_changes: Vec::new(),
        }
    }

    fn mint(amount: u64, to: &str) -> LedgerEvent {
        event("MintEvent", json!({"amount": amount.to_string(), "recipient": to}))
    }

    #[test]
    fn parses_dates_in_every_accepted_form() {
        assert_eq!(parse_date("1970-01-02").unwrap().as_millis(), 86_400_000);
        assert_eq!(
            parse_date("2023-11-14T22:13:20Z").unwrap().as_millis(),
            1_700_000_000_000
        );
        assert_eq!(
            parse_date("2023-11-15T00:13:20+02:00").unwrap().as_millis(),
            1_700_000_000_000
        );
        assert_eq!(parse_date("1700000000000").unwrap().as_millis(), 1_700_000_000_000);
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("1969-12-31").is_err());
    }

    #[test]
    fn entry_uses_first_token_event() {
        let foreign = LedgerEvent {
            event_type: "0x2::coin::CoinCreated".into(),
            ..mint(1, "0x2")
        };
        let r = record(1, Some(5), vec![foreign, mint(10, "0x5"), mint(99, "0x6")]);
        let entry = HistoryEntry::from_record(&r, &config(), TimestampMs::new(0)).unwrap();
        assert_eq!(entry.kind, TokenEventKind::Mint);
        assert_eq!(entry.amount.raw(), 10);
        assert_eq!(entry.to, Some("0x5".parse().unwrap()));
        assert_eq!(entry.gas_used, 750);
    }

    #[test]
    fn missing_timestamp_falls_back_to_now() {
        let r = record(1, None, vec![mint(10, "0x5")]);
        let entry = HistoryEntry::from_record(&r, &config(), TimestampMs::new(42)).unwrap();
        assert_eq!(entry.timestamp.as_millis(), 42);
    }

    #[test]
    fn malformed_or_absent_events_are_skipped() {
        let bad = record(1, Some(1), vec![event("MintEvent", json!({"amount": "x"}))]);
        assert!(HistoryEntry::from_record(&bad, &config(), TimestampMs::EPOCH).is_none());
        let empty = record(2, Some(1), Vec::new());
        assert!(HistoryEntry::from_record(&empty, &config(), TimestampMs::EPOCH).is_none());
    }

    #[test]
    fn filters_combine() {
        let r = record(
            1,
            Some(1_000),
            vec![event(
                "TransferEvent",
                json!({"amount": "2500000", "from": "0xAa01", "to": "0xbb"}),
            )],
        );
        let entry = HistoryEntry::from_record(&r, &config(), TimestampMs::EPOCH).unwrap();

        assert!(HistoryFilter::default().matches(&entry));
        let by_kind = HistoryFilter {
            kind: Some(TokenEventKind::Burn),
            ..Default::default()
        };
        assert!(!by_kind.matches(&entry));

        let by_amount = HistoryFilter {
            min_amount: Some(TokenAmount::from_human("2").unwrap()),
            max_amount: Some(TokenAmount::from_human("2.5").unwrap()),
            ..Default::default()
        };
        assert!(by_amount.matches(&entry));
        let too_small = HistoryFilter {
            max_amount: Some(TokenAmount::from_human("2.4").unwrap()),
            ..Default::default()
        };
        assert!(!too_small.matches(&entry));

        let by_date = HistoryFilter {
            from_date: Some(TimestampMs::new(1_000)),
            to_date: Some(TimestampMs::new(1_000)),
            ..Default::default()
        };
        assert!(by_date.matches(&entry));
        let later = HistoryFilter {
            from_date: Some(TimestampMs::new(1_001)),
            ..Default::default()
        };
        assert!(!later.matches(&entry));

        let by_fragment = HistoryFilter {
            address: Some("AA01".into()),
            ..Default::default()
        };
        assert!(by_fragment.matches(&entry));
        let by_short_form = HistoryFilter {
            address: Some("0xbb".into()),
            ..Default::default()
        };
        assert!(by_short_form.matches(&entry));
        let unrelated = HistoryFilter {
            address: Some("0xcc".into()),
            ..Default::default()
        };
        assert!(!unrelated.matches(&entry));
    }

    #[tokio::test]
    async fn page_is_sorted_newest_first_and_filtered() {
        let cfg = config();
        let ledger = NullLedger::new(NullLedgerConfig {
            package: cfg.package_id,
            module: cfg.module.clone(),
            coin_name: cfg.coin_name.clone(),
            treasury_cap: cfg.treasury_cap_id,
            admin: cfg.admin_address,
            config_object: None,
            max_supply: u64::MAX,
        });
        ledger.record_transaction(record(1, Some(300), vec![mint(1, "0x5")]), true);
        ledger.record_transaction(record(2, Some(100), vec![mint(2, "0x5")]), true);
        ledger.record_transaction(record(3, Some(200), Vec::new()), true);
        ledger.record_transaction(
            record(4, Some(400), vec![event("BurnEvent", json!({"amount": "3", "burner": "0x1"}))]),
            true,
        );
        // Did not call the token module.
        ledger.record_transaction(record(5, Some(500), vec![mint(9, "0x5")]), false);

        let page = fetch_history(
            &ledger,
            &cfg,
            &HistoryRequest {
                filter: HistoryFilter {
                    kind: Some(TokenEventKind::Mint),
                    ..Default::default()
                },
                limit: 50,
                cursor: None,
            },
            TimestampMs::EPOCH,
        )
        .await
        .unwrap();

        let stamps: Vec<u64> = page.entries.iter().map(|e| e.timestamp.as_millis()).collect();
        assert_eq!(stamps, vec![300, 100]);
        assert!(!page.has_next_page);
    }
}

//! JSON-RPC 2.0 client for a ledger full node.
//!
//! Wraps `reqwest::Client` with the node URL and provides one typed method per
//! ledger call. Only a connect timeout is set: a submission the node has not
//! answered stays outstanding instead of being reported as failed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use seeds_crypto::AdminSigner;
use seeds_types::{
    Address, CoinObject, CoinType, ObjectDigest, ObjectId, ObjectRef, TimestampMs, TokenAmount,
    TransactionDigest,
};

use crate::bcs::{GasData, TransactionData};
use crate::client::LedgerClient;
use crate::error::LedgerError;
use crate::transaction::{CallArg, ObjectInput, ProgrammableTransaction};
use crate::types::{
    u64_string, EventId, EventQuery, ExecutionResult, ExecutionStatus, GasCostSummary,
    LedgerEvent, LedgerObject, ObjectOwner, Page, TransactionFilter, TransactionQuery,
    TransactionRecord,
};

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default gas budget per transaction, in the gas coin's smallest unit.
pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPage<T, C = String> {
    data: Vec<T>,
    next_cursor: Option<C>,
    #[serde(default)]
    has_next_page: bool,
}

impl<T, C> RawPage<T, C> {
    fn map<U>(
        self,
        f: impl FnMut(T) -> Result<U, LedgerError>,
    ) -> Result<Page<U, C>, LedgerError> {
        Ok(Page {
            data: self.data.into_iter().map(f).collect::<Result<_, _>>()?,
            next_cursor: self.next_cursor,
            has_next_page: self.has_next_page,
        })
    }

    /// Like [`Self::map`], but entries `f` rejects are logged and dropped.
    fn map_lenient<U>(
        self,
        what: &'static str,
        mut f: impl FnMut(T) -> Result<U, LedgerError>,
    ) -> Page<U, C> {
        let data = self
            .data
            .into_iter()
            .filter_map(|item| match f(item) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    tracing::debug!(what, %err, "skipping malformed record");
                    None
                }
            })
            .collect();
        Page {
            data,
            next_cursor: self.next_cursor,
            has_next_page: self.has_next_page,
        }
    }
}

/// Decode every value that fits `T`; the rest are logged and dropped.
fn decode_each<T: DeserializeOwned>(values: Vec<Value>, what: &'static str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::debug!(what, %err, "skipping malformed entry");
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoin {
    coin_object_id: ObjectId,
    #[serde(with = "u64_string")]
    version: u64,
    digest: ObjectDigest,
    balance: String,
}

#[derive(Debug, Deserialize)]
struct RawObjectResponse {
    #[serde(default)]
    data: Option<RawObject>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
    object_id: ObjectId,
    #[serde(with = "u64_string")]
    version: u64,
    digest: ObjectDigest,
    #[serde(rename = "type", default)]
    object_type: Option<String>,
    owner: ObjectOwner,
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEffects {
    status: ExecutionStatus,
    gas_used: GasCostSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransactionBlock {
    digest: TransactionDigest,
    #[serde(default)]
    timestamp_ms: Option<String>,
    effects: Option<RawEffects>,
    #[serde(default)]
    events: Vec<Value>,
    #[serde(default)]
    balance_changes: Vec<Value>,
    #[serde(default)]
    object_changes: Option<Value>,
}

impl RawTransactionBlock {
    fn effects(&mut self) -> Result<RawEffects, LedgerError> {
        self.effects.take().ok_or_else(|| {
            LedgerError::Decode(format!("transaction {} has no effects", self.digest))
        })
    }

    fn into_record(mut self) -> Result<TransactionRecord, LedgerError> {
        let effects = self.effects()?;
        Ok(TransactionRecord {
            timestamp_ms: timestamp(&self.timestamp_ms),
            digest: self.digest,
            status: effects.status,
            gas_used: effects.gas_used,
            events: decode_each(self.events, "event"),
            balance_changes: decode_each(self.balance_changes, "balance change"),
        })
    }
}

fn filter_json(filter: &TransactionFilter) -> Value {
    match filter {
        TransactionFilter::MoveModule { package, module } => json!({"MoveFunction": {
            "package": package,
            "module": module,
            "function": Value::Null,
        }}),
        TransactionFilter::FromAddress(address) => json!({ "FromAddress": address }),
    }
}

/// Ledger client speaking the full node's JSON-RPC API.
pub struct JsonRpcLedger {
    http: reqwest::Client,
    url: String,
    gas_budget: u64,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create a client targeting the given full-node URL.
    pub fn new(url: impl Into<String>, gas_budget: u64) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            gas_budget,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a JSON-RPC request and decode its `result`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!(method, id, "ledger request");
        let response = self.http.post(&self.url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "{method}: node returned HTTP {}",
                response.status()
            )));
        }

        let rpc: RpcResponse = response.json().await?;
        if let Some(err) = rpc.error {
            return Err(LedgerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let result = rpc
            .result
            .ok_or_else(|| LedgerError::Decode(format!("{method}: response has no result")))?;
        serde_json::from_value(result)
            .map_err(|e| LedgerError::Decode(format!("{method}: {e}")))
    }

    async fn reference_gas_price(&self) -> Result<u64, LedgerError> {
        #[derive(Deserialize)]
        struct Price(#[serde(with = "u64_string")] u64);
        let price: Price = self.call("suix_getReferenceGasPrice", json!([])).await?;
        Ok(price.0)
    }

    /// Largest gas coin of `owner` that covers the budget on its own.
    async fn select_gas(&self, owner: &Address) -> Result<ObjectRef, LedgerError> {
        let gas_type = CoinType::gas();
        let mut best: Option<CoinObject> = None;
        let mut cursor = None;
        loop {
            let page = self.get_coins(owner, &gas_type, cursor).await?;
            for coin in page.data {
                if best.as_ref().map_or(true, |b| coin.balance > b.balance) {
                    best = Some(coin);
                }
            }
            if !page.has_next_page || page.next_cursor.is_none() {
                break;
            }
            cursor = page.next_cursor;
        }
        best.filter(|c| c.balance >= TokenAmount::from(self.gas_budget))
            .map(|c| c.object_ref())
            .ok_or(LedgerError::NoGasCoin {
                budget: self.gas_budget,
            })
    }

    /// Replace every by-id object input with its current reference.
    async fn resolve_inputs(
        &self,
        mut tx: ProgrammableTransaction,
    ) -> Result<ProgrammableTransaction, LedgerError> {
        let pending: Vec<(usize, ObjectId)> = tx
            .inputs
            .iter()
            .enumerate()
            .filter_map(|(i, arg)| match arg {
                CallArg::Object(ObjectInput::ById(id)) => Some((i, *id)),
                _ => None,
            })
            .collect();

        let objects = try_join_all(pending.iter().map(|(_, id)| self.get_object(id))).await?;
        for ((idx, _), object) in pending.into_iter().zip(objects) {
            tx.inputs[idx] = CallArg::Object(object.as_input());
        }
        Ok(tx)
    }
}

fn coin_from_raw(raw: RawCoin, owner: Address) -> Result<CoinObject, LedgerError> {
    let balance = raw
        .balance
        .parse::<u128>()
        .map_err(|_| LedgerError::Decode(format!("coin balance {:?}", raw.balance)))?;
    Ok(CoinObject {
        object_id: raw.coin_object_id,
        version: raw.version,
        digest: raw.digest,
        balance: TokenAmount::new(balance),
        owner,
    })
}

fn timestamp(raw: &Option<String>) -> Option<TimestampMs> {
    raw.as_deref()
        .and_then(|s| s.parse().ok())
        .map(TimestampMs::new)
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    async fn get_coins(
        &self,
        owner: &Address,
        coin_type: &CoinType,
        cursor: Option<String>,
    ) -> Result<Page<CoinObject>, LedgerError> {
        let page: RawPage<RawCoin> = self
            .call(
                "suix_getCoins",
                json!([owner, coin_type.to_string(), cursor, Value::Null]),
            )
            .await?;
        page.map(|raw| coin_from_raw(raw, *owner))
    }

    async fn get_object(&self, id: &ObjectId) -> Result<LedgerObject, LedgerError> {
        let resp: RawObjectResponse = self
            .call(
                "sui_getObject",
                json!([id, {"showContent": true, "showOwner": true, "showType": true}]),
            )
            .await?;
        let Some(raw) = resp.data else {
            if let Some(err) = resp.error {
                tracing::debug!(object = %id, error = %err, "object lookup failed");
            }
            return Err(LedgerError::ObjectNotFound(*id));
        };
        let fields = raw
            .content
            .as_ref()
            .and_then(|c| c.get("fields"))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(LedgerObject {
            object_ref: ObjectRef {
                object_id: raw.object_id,
                version: raw.version,
                digest: raw.digest,
            },
            owner: raw.owner,
            object_type: raw.object_type,
            fields,
        })
    }

    async fn execute(
        &self,
        tx: ProgrammableTransaction,
        signer: &AdminSigner,
    ) -> Result<ExecutionResult, LedgerError> {
        let sender = signer.address();
        let (kind, gas_price, gas_coin) = tokio::try_join!(
            self.resolve_inputs(tx),
            self.reference_gas_price(),
            self.select_gas(&sender),
        )?;

        let data = TransactionData {
            kind,
            sender,
            gas: GasData {
                payment: vec![gas_coin],
                owner: sender,
                price: gas_price,
                budget: self.gas_budget,
            },
        };
        let tx_bytes = data.to_bcs()?;
        let signature = signer.sign_transaction(&tx_bytes);

        let mut block: RawTransactionBlock = self
            .call(
                "sui_executeTransactionBlock",
                json!([
                    STANDARD.encode(&tx_bytes),
                    [signature],
                    {"showEffects": true, "showEvents": true, "showObjectChanges": true},
                    "WaitForLocalExecution",
                ]),
            )
            .await?;
        let effects = block.effects()?;

        tracing::info!(
            digest = %block.digest,
            success = effects.status.is_success(),
            "transaction executed"
        );
        Ok(ExecutionResult {
            digest: block.digest,
            status: effects.status,
            gas_used: effects.gas_used,
            events: decode_each(block.events, "event"),
            object_changes: block.object_changes,
        })
    }

    async fn query_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Page<TransactionRecord>, LedgerError> {
        let page: RawPage<Value> = self
            .call(
                "suix_queryTransactionBlocks",
                json!([
                    {
                        "filter": filter_json(&query.filter),
                        "options": {
                            "showEffects": true,
                            "showEvents": true,
                            "showBalanceChanges": true,
                        },
                    },
                    query.cursor,
                    query.limit,
                    query.descending,
                ]),
            )
            .await?;
        Ok(page.map_lenient("transaction", |value| {
            serde_json::from_value::<RawTransactionBlock>(value)
                .map_err(|e| LedgerError::Decode(e.to_string()))?
                .into_record()
        }))
    }

    async fn query_events(
        &self,
        query: &EventQuery,
    ) -> Result<Page<LedgerEvent, EventId>, LedgerError> {
        let page: RawPage<LedgerEvent, EventId> = self
            .call(
                "suix_queryEvents",
                json!([
                    {"MoveEventModule": {"package": query.package, "module": query.module}},
                    query.cursor,
                    query.limit,
                    query.descending,
                ]),
            )
            .await?;
        page.map(Ok)
    }
}

//! Nullable ledger: an in-memory object ledger that executes programmable
//! transactions.
//!
//! Commands run against a copy of the state and are committed only if every
//! command succeeds, so a failed transaction leaves no trace besides its
//! record. Inputs are checked before execution the way a full node checks
//! them: unknown objects, foreign coins and stale versions are rejected with
//! an RPC error and nothing is recorded.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use seeds_crypto::{blake2b_256_multi, AdminSigner};
use seeds_ledger::{
    Argument, BalanceChange, CallArg, Command, EventId, EventQuery, ExecutionResult,
    ExecutionStatus, GasCostSummary, LedgerClient, LedgerError, LedgerEvent, LedgerObject,
    MoveCall, ObjectInput, ObjectOwner, Page, ProgrammableTransaction, TransactionFilter,
    TransactionQuery, TransactionRecord,
};
use seeds_types::{
    Address, CoinObject, CoinType, ObjectDigest, ObjectId, ObjectRef, TokenAmount,
    TransactionDigest,
};

use crate::clock::NullClock;

/// Default number of items per page for listings.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Identity of the token program the nullable ledger emulates.
#[derive(Clone, Debug)]
pub struct NullLedgerConfig {
    pub package: ObjectId,
    pub module: String,
    pub coin_name: String,
    pub treasury_cap: ObjectId,
    /// Owner of the treasury cap; only this address may mint or burn.
    pub admin: Address,
    /// Shared config object tracking `max_supply` / `current_supply`.
    pub config_object: Option<ObjectId>,
    pub max_supply: u64,
}

impl NullLedgerConfig {
    pub fn coin_type(&self) -> CoinType {
        CoinType::new(self.package, self.module.clone(), self.coin_name.clone())
    }

    fn event_type(&self, name: &str) -> String {
        format!("{}::{}::{}", self.package, self.module, name)
    }
}

#[derive(Clone, Debug)]
struct StoredCoin {
    coin: CoinObject,
    coin_type: CoinType,
}

#[derive(Clone, Debug)]
struct StoredTransaction {
    record: TransactionRecord,
    sender: Address,
    calls_token_module: bool,
}

#[derive(Clone, Debug, Default)]
struct State {
    /// Coins in creation order, which is the order listings return.
    coins: Vec<StoredCoin>,
    current_supply: u64,
    /// Version stamped onto every object a transaction touches.
    lamport: u64,
    /// Transactions, oldest first.
    transactions: Vec<StoredTransaction>,
}

impl State {
    fn coin(&self, id: &ObjectId) -> Option<&StoredCoin> {
        self.coins.iter().find(|c| c.coin.object_id == *id)
    }

    fn coin_mut(&mut self, id: &ObjectId) -> Option<&mut StoredCoin> {
        self.coins.iter_mut().find(|c| c.coin.object_id == *id)
    }

    fn remove_coin(&mut self, id: &ObjectId) -> Option<StoredCoin> {
        let pos = self.coins.iter().position(|c| c.coin.object_id == *id)?;
        Some(self.coins.remove(pos))
    }

    fn balances(&self) -> BTreeMap<(Address, String), i128> {
        let mut totals = BTreeMap::new();
        for stored in &self.coins {
            let key = (stored.coin.owner, stored.coin_type.to_string());
            *totals.entry(key).or_insert(0i128) += stored.coin.balance.raw() as i128;
        }
        totals
    }
}

/// Per owner and coin type, how `after` differs from `before`.
fn balance_changes(before: &State, after: &State) -> Vec<BalanceChange> {
    let mut net = after.balances();
    for (key, amount) in before.balances() {
        *net.entry(key).or_insert(0) -= amount;
    }
    net.into_iter()
        .filter(|(_, amount)| *amount != 0)
        .map(|((owner, coin_type), amount)| BalanceChange {
            owner: ObjectOwner::AddressOwner(owner),
            coin_type,
            amount,
        })
        .collect()
}

/// A value produced by an input or command.
#[derive(Clone, Debug)]
enum Slot {
    Coin(ObjectId),
    Treasury,
    Config,
    Pure(Vec<u8>),
}

type Abort = String;

/// Objects a transaction created, mutated or deleted.
#[derive(Default)]
struct Changes {
    created: Vec<ObjectId>,
    mutated: Vec<ObjectId>,
    deleted: Vec<ObjectId>,
    events: Vec<(String, Value)>,
}

impl Changes {
    fn touch(&mut self, id: ObjectId) {
        if !self.created.contains(&id) && !self.mutated.contains(&id) {
            self.mutated.push(id);
        }
    }
}

/// An in-memory ledger for testing and simulate mode.
///
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    config: NullLedgerConfig,
    state: Mutex<State>,
    clock: NullClock,
    page_size: usize,
    object_counter: AtomicU64,
    tx_counter: AtomicU64,
    coin_queries: AtomicU64,
    unavailable: AtomicBool,
    fail_next: Mutex<Option<String>>,
    submitted: Mutex<Vec<ProgrammableTransaction>>,
}

impl NullLedger {
    pub fn new(config: NullLedgerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State::default()),
            clock: NullClock::default(),
            page_size: DEFAULT_PAGE_SIZE,
            object_counter: AtomicU64::new(0),
            tx_counter: AtomicU64::new(0),
            coin_queries: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
            fail_next: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Use a smaller page size so tests exercise pagination.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn config(&self) -> &NullLedgerConfig {
        &self.config
    }

    pub fn clock(&self) -> &NullClock {
        &self.clock
    }

    fn fresh_id(&self) -> [u8; 32] {
        let n = self.object_counter.fetch_add(1, Ordering::SeqCst);
        blake2b_256_multi(&[b"null-object", &n.to_le_bytes()])
    }

    fn fresh_digest(&self) -> TransactionDigest {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        TransactionDigest::new(blake2b_256_multi(&[b"null-tx", &n.to_le_bytes()]))
    }

    fn new_coin(
        &self,
        owner: Address,
        coin_type: CoinType,
        amount: TokenAmount,
        version: u64,
    ) -> StoredCoin {
        let id = self.fresh_id();
        StoredCoin {
            coin: CoinObject {
                object_id: ObjectId::new(id),
                version,
                digest: ObjectDigest::new(id),
                balance: amount,
                owner,
            },
            coin_type,
        }
    }

    /// Create a token coin for `owner` outside of any transaction.
    pub fn seed_coin(&self, owner: Address, amount: TokenAmount) -> CoinObject {
        self.seed_coin_of(owner, self.config.coin_type(), amount)
    }

    /// Create a coin of any type for `owner` outside of any transaction.
    pub fn seed_coin_of(
        &self,
        owner: Address,
        coin_type: CoinType,
        amount: TokenAmount,
    ) -> CoinObject {
        let mut state = self.state.lock().unwrap();
        state.lamport += 1;
        let stored = self.new_coin(owner, coin_type, amount, state.lamport);
        let coin = stored.coin.clone();
        state.coins.push(stored);
        coin
    }

    /// Set the supply the config object reports.
    pub fn set_current_supply(&self, supply: u64) {
        self.state.lock().unwrap().current_supply = supply;
    }

    /// Append a transaction record, signed by the admin, to history as-is.
    pub fn record_transaction(&self, record: TransactionRecord, calls_token_module: bool) {
        let sender = self.config.admin;
        self.state.lock().unwrap().transactions.push(StoredTransaction {
            record,
            sender,
            calls_token_module,
        });
    }

    /// Make the next submission execute with a failure status.
    pub fn fail_next_execution(&self, reason: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(reason.into());
    }

    /// Make every call fail with a transport error, as if the node were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Every transaction submitted so far, including rejected ones.
    pub fn submitted(&self) -> Vec<ProgrammableTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    /// Number of coin listing pages served so far.
    pub fn coin_queries(&self) -> u64 {
        self.coin_queries.load(Ordering::SeqCst)
    }

    /// Current coins of `owner` of the token type.
    pub fn coins_of(&self, owner: &Address) -> Vec<CoinObject> {
        let coin_type = self.config.coin_type();
        self.state
            .lock()
            .unwrap()
            .coins
            .iter()
            .filter(|c| c.coin.owner == *owner && c.coin_type == coin_type)
            .map(|c| c.coin.clone())
            .collect()
    }

    pub fn balance_of(&self, owner: &Address) -> TokenAmount {
        self.coins_of(owner).iter().map(|c| c.balance).sum()
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("connection failed: node unavailable".into()));
        }
        Ok(())
    }

    fn rejected(message: impl Into<String>) -> LedgerError {
        LedgerError::Rpc {
            code: -32002,
            message: message.into(),
        }
    }

    /// Resolve inputs to slots, rejecting what a node would refuse to sign for.
    fn resolve_inputs(
        &self,
        state: &State,
        tx: &ProgrammableTransaction,
        sender: Address,
    ) -> Result<Vec<Slot>, LedgerError> {
        let mut seen = HashSet::new();
        let mut slots = Vec::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            let object = match input {
                CallArg::Pure(bytes) => {
                    slots.push(Slot::Pure(bytes.clone()));
                    continue;
                }
                CallArg::Object(object) => object,
            };
            let id = object.id();
            if !seen.insert(id) {
                return Err(Self::rejected(format!("object {id} used twice as input")));
            }

            if id == self.config.treasury_cap {
                if sender != self.config.admin {
                    return Err(Self::rejected(format!(
                        "object {id} is not owned by {sender}"
                    )));
                }
                slots.push(Slot::Treasury);
                continue;
            }
            if Some(id) == self.config.config_object {
                slots.push(Slot::Config);
                continue;
            }

            let stored = state
                .coin(&id)
                .ok_or_else(|| Self::rejected(format!("object {id} does not exist")))?;
            if stored.coin.owner != sender {
                return Err(Self::rejected(format!(
                    "object {id} is not owned by {sender}"
                )));
            }
            if let ObjectInput::Owned(r) = object {
                if r.version != stored.coin.version || r.digest != stored.coin.digest {
                    return Err(Self::rejected(format!(
                        "object {id} version {} is not the latest ({})",
                        r.version, stored.coin.version
                    )));
                }
            }
            slots.push(Slot::Coin(id));
        }
        Ok(slots)
    }

    fn run(
        &self,
        state: &mut State,
        tx: &ProgrammableTransaction,
        inputs: Vec<Slot>,
        sender: Address,
    ) -> Result<Changes, Abort> {
        let mut changes = Changes::default();
        let mut results: Vec<Vec<Slot>> = Vec::with_capacity(tx.commands.len());
        let version = state.lamport + 1;

        for (idx, command) in tx.commands.iter().enumerate() {
            let arg = |a: &Argument, results: &[Vec<Slot>]| resolve_arg(a, results, &inputs, idx);

            let produced = match command {
                Command::SplitCoins(coin, amounts) => {
                    let coin_id = expect_coin(arg(coin, &results)?, idx)?;
                    let mut total = 0u64;
                    let mut values = Vec::with_capacity(amounts.len());
                    for a in amounts {
                        let v = expect_u64(arg(a, &results)?, idx)?;
                        total = total
                            .checked_add(v)
                            .ok_or_else(|| format!("command {idx}: split amount overflow"))?;
                        values.push(v);
                    }
                    let source = state
                        .coin_mut(&coin_id)
                        .ok_or_else(|| format!("command {idx}: coin {coin_id} is gone"))?;
                    let remaining = source
                        .coin
                        .balance
                        .checked_sub(TokenAmount::from(total))
                        .ok_or_else(|| format!("command {idx}: InsufficientCoinBalance"))?;
                    source.coin.balance = remaining;
                    let coin_type = source.coin_type.clone();
                    changes.touch(coin_id);

                    let mut new_coins = Vec::with_capacity(values.len());
                    for v in values {
                        let stored =
                            self.new_coin(sender, coin_type.clone(), TokenAmount::from(v), version);
                        let id = stored.coin.object_id;
                        state.coins.push(stored);
                        changes.created.push(id);
                        new_coins.push(Slot::Coin(id));
                    }
                    new_coins
                }
                Command::MergeCoins(target, sources) => {
                    let target_id = expect_coin(arg(target, &results)?, idx)?;
                    let target_type = state
                        .coin(&target_id)
                        .map(|c| c.coin_type.clone())
                        .ok_or_else(|| format!("command {idx}: coin {target_id} is gone"))?;
                    let mut added = TokenAmount::ZERO;
                    for s in sources {
                        let source_id = expect_coin(arg(s, &results)?, idx)?;
                        if source_id == target_id {
                            return Err(format!("command {idx}: cannot merge a coin into itself"));
                        }
                        let source = state
                            .remove_coin(&source_id)
                            .ok_or_else(|| format!("command {idx}: coin {source_id} is gone"))?;
                        if source.coin_type != target_type {
                            return Err(format!("command {idx}: coin types differ"));
                        }
                        added = added.saturating_add(source.coin.balance);
                        changes.created.retain(|c| *c != source_id);
                        changes.mutated.retain(|c| *c != source_id);
                        changes.deleted.push(source_id);
                    }
                    if let Some(target) = state.coin_mut(&target_id) {
                        target.coin.balance = target.coin.balance.saturating_add(added);
                    }
                    changes.touch(target_id);
                    Vec::new()
                }
                Command::TransferObjects(objects, recipient) => {
                    let recipient = expect_address(arg(recipient, &results)?, idx)?;
                    for o in objects {
                        let id = expect_coin(arg(o, &results)?, idx)?;
                        let coin = state
                            .coin_mut(&id)
                            .ok_or_else(|| format!("command {idx}: coin {id} is gone"))?;
                        coin.coin.owner = recipient;
                        changes.touch(id);
                    }
                    Vec::new()
                }
                Command::MoveCall(call) => {
                    let args = call
                        .arguments
                        .iter()
                        .map(|a| arg(a, &results))
                        .collect::<Result<Vec<_>, _>>()?;
                    self.move_call(state, call, args, sender, version, &mut changes, idx)?
                }
            };
            results.push(produced);
        }

        Ok(changes)
    }

    #[allow(clippy::too_many_arguments)]
    fn move_call(
        &self,
        state: &mut State,
        call: &MoveCall,
        args: Vec<Slot>,
        sender: Address,
        version: u64,
        changes: &mut Changes,
        idx: usize,
    ) -> Result<Vec<Slot>, Abort> {
        if call.package != self.config.package || call.module != self.config.module {
            return Err(format!(
                "command {idx}: function {}::{}::{} not found",
                call.package, call.module, call.function
            ));
        }
        let mut args = args.into_iter();
        if !matches!(args.next(), Some(Slot::Treasury)) {
            return Err(format!("command {idx}: first argument must be the treasury cap"));
        }

        match call.function.as_str() {
            "mint" => {
                let amount = expect_u64(args.next().ok_or("missing amount")?, idx)?;
                let recipient = expect_address(args.next().ok_or("missing recipient")?, idx)?;
                let supply = state
                    .current_supply
                    .checked_add(amount)
                    .filter(|s| *s <= self.config.max_supply)
                    .ok_or_else(|| format!("command {idx}: MoveAbort EExceedsMaxSupply"))?;
                state.current_supply = supply;

                let stored = self.new_coin(
                    recipient,
                    self.config.coin_type(),
                    TokenAmount::from(amount),
                    version,
                );
                changes.created.push(stored.coin.object_id);
                state.coins.push(stored);
                changes.events.push((
                    self.config.event_type("MintEvent"),
                    json!({"amount": amount.to_string(), "recipient": recipient}),
                ));
                Ok(Vec::new())
            }
            "burn_coin" => {
                let coin_id = expect_coin(args.next().ok_or("missing coin")?, idx)?;
                let stored = state
                    .remove_coin(&coin_id)
                    .ok_or_else(|| format!("command {idx}: coin {coin_id} is gone"))?;
                if stored.coin_type != self.config.coin_type() {
                    return Err(format!("command {idx}: coin is not a token coin"));
                }
                let amount = stored
                    .coin
                    .balance
                    .to_u64()
                    .ok_or_else(|| format!("command {idx}: coin balance overflow"))?;
                state.current_supply = state.current_supply.saturating_sub(amount);
                changes.created.retain(|c| *c != coin_id);
                changes.mutated.retain(|c| *c != coin_id);
                changes.deleted.push(coin_id);
                changes.events.push((
                    self.config.event_type("BurnEvent"),
                    json!({"amount": amount.to_string(), "burner": sender}),
                ));
                Ok(Vec::new())
            }
            other => Err(format!(
                "command {idx}: function {}::{}::{other} not found",
                call.package, call.module
            )),
        }
    }

    fn gas_summary() -> GasCostSummary {
        GasCostSummary {
            computation_cost: 1_000_000,
            storage_cost: 2_000_000,
            storage_rebate: 978_120,
            non_refundable_storage_fee: 9_880,
        }
    }

    fn config_ledger_object(&self, id: ObjectId, state: &State) -> LedgerObject {
        LedgerObject {
            object_ref: ObjectRef {
                object_id: id,
                version: 1,
                digest: ObjectDigest::new(*id.as_bytes()),
            },
            owner: ObjectOwner::Shared {
                initial_shared_version: 1,
            },
            object_type: Some(format!(
                "{}::{}::Config",
                self.config.package, self.config.module
            )),
            fields: json!({
                "max_supply": self.config.max_supply.to_string(),
                "current_supply": state.current_supply.to_string(),
            }),
        }
    }
}

fn resolve_arg(
    a: &Argument,
    results: &[Vec<Slot>],
    inputs: &[Slot],
    idx: usize,
) -> Result<Slot, Abort> {
    let slot = match *a {
        Argument::Input(i) => inputs.get(i as usize).cloned(),
        Argument::Result(i) => results
            .get(i as usize)
            .filter(|r| r.len() == 1)
            .map(|r| r[0].clone()),
        Argument::NestedResult(i, j) => results
            .get(i as usize)
            .and_then(|r| r.get(j as usize))
            .cloned(),
        Argument::GasCoin => None,
    };
    slot.ok_or_else(|| format!("command {idx}: invalid argument {a:?}"))
}

fn expect_coin(slot: Slot, idx: usize) -> Result<ObjectId, Abort> {
    match slot {
        Slot::Coin(id) => Ok(id),
        other => Err(format!("command {idx}: expected a coin, got {other:?}")),
    }
}

fn expect_u64(slot: Slot, idx: usize) -> Result<u64, Abort> {
    match slot {
        Slot::Pure(bytes) => bytes
            .try_into()
            .map(u64::from_le_bytes)
            .map_err(|_| format!("command {idx}: expected a u64")),
        other => Err(format!("command {idx}: expected a u64, got {other:?}")),
    }
}

fn expect_address(slot: Slot, idx: usize) -> Result<Address, Abort> {
    match slot {
        Slot::Pure(bytes) => <[u8; 32]>::try_from(bytes)
            .map(Address::new)
            .map_err(|_| format!("command {idx}: expected an address")),
        other => Err(format!("command {idx}: expected an address, got {other:?}")),
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn get_coins(
        &self,
        owner: &Address,
        coin_type: &CoinType,
        cursor: Option<String>,
    ) -> Result<Page<CoinObject>, LedgerError> {
        self.check_available()?;
        self.coin_queries.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let owned: Vec<&CoinObject> = state
            .coins
            .iter()
            .filter(|c| c.coin.owner == *owner && c.coin_type == *coin_type)
            .map(|c| &c.coin)
            .collect();

        let start = match cursor {
            Some(c) => {
                let after: ObjectId = c
                    .parse()
                    .map_err(|_| Self::rejected(format!("invalid cursor {c}")))?;
                owned
                    .iter()
                    .position(|coin| coin.object_id == after)
                    .map_or(owned.len(), |p| p + 1)
            }
            None => 0,
        };
        let end = (start + self.page_size).min(owned.len());
        let data: Vec<CoinObject> = owned[start..end].iter().map(|c| (*c).clone()).collect();
        let has_next_page = end < owned.len();
        Ok(Page {
            next_cursor: data.last().map(|c| c.object_id.to_hex()),
            data,
            has_next_page,
        })
    }

    async fn get_object(&self, id: &ObjectId) -> Result<LedgerObject, LedgerError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        if Some(*id) == self.config.config_object {
            return Ok(self.config_ledger_object(*id, &state));
        }
        if *id == self.config.treasury_cap {
            return Ok(LedgerObject {
                object_ref: ObjectRef {
                    object_id: *id,
                    version: 1,
                    digest: ObjectDigest::new(*id.as_bytes()),
                },
                owner: ObjectOwner::AddressOwner(self.config.admin),
                object_type: Some(format!("0x2::coin::TreasuryCap<{}>", self.config.coin_type())),
                fields: json!({"total_supply": {"value": state.current_supply.to_string()}}),
            });
        }
        let stored = state.coin(id).ok_or(LedgerError::ObjectNotFound(*id))?;
        Ok(LedgerObject {
            object_ref: stored.coin.object_ref(),
            owner: ObjectOwner::AddressOwner(stored.coin.owner),
            object_type: Some(format!("0x2::coin::Coin<{}>", stored.coin_type)),
            fields: json!({"balance": stored.coin.balance.raw().to_string()}),
        })
    }

    async fn execute(
        &self,
        tx: ProgrammableTransaction,
        signer: &AdminSigner,
    ) -> Result<ExecutionResult, LedgerError> {
        self.submitted.lock().unwrap().push(tx.clone());
        self.check_available()?;

        let sender = signer.address();
        let mut state = self.state.lock().unwrap();
        let inputs = self.resolve_inputs(&state, &tx, sender)?;

        let digest = self.fresh_digest();
        let injected = self.fail_next.lock().unwrap().take();
        let mut scratch = state.clone();
        let outcome = match injected {
            Some(reason) => Err(reason),
            None => self.run(&mut scratch, &tx, inputs, sender),
        };

        let timestamp = self.clock.now();
        self.clock.advance(1_000);
        let calls_module = tx.commands.iter().any(|c| {
            matches!(c, Command::MoveCall(call)
                if call.package == self.config.package && call.module == self.config.module)
        });

        let (status, events, object_changes, balance_changes) = match outcome {
            Ok(changes) => {
                scratch.lamport += 1;
                let version = scratch.lamport;
                for id in changes.created.iter().chain(&changes.mutated) {
                    if let Some(c) = scratch.coin_mut(id) {
                        c.coin.version = version;
                        c.coin.digest = ObjectDigest::new(blake2b_256_multi(&[
                            id.as_bytes(),
                            &version.to_le_bytes(),
                        ]));
                    }
                }
                let events: Vec<LedgerEvent> = changes
                    .events
                    .into_iter()
                    .enumerate()
                    .map(|(seq, (event_type, parsed_json))| LedgerEvent {
                        id: EventId {
                            tx_digest: digest,
                            event_seq: seq as u64,
                        },
                        event_type,
                        sender,
                        parsed_json,
                        timestamp_ms: Some(timestamp),
                    })
                    .collect();
                let change = |kind: &str, id: &ObjectId| {
                    json!({"type": kind, "objectId": id, "version": version.to_string()})
                };
                let object_changes: Vec<Value> = changes
                    .created
                    .iter()
                    .map(|id| change("created", id))
                    .chain(changes.mutated.iter().map(|id| change("mutated", id)))
                    .chain(
                        changes
                            .deleted
                            .iter()
                            .map(|id| json!({"type": "deleted", "objectId": id})),
                    )
                    .collect();
                let balance_changes = balance_changes(&state, &scratch);
                *state = scratch;
                (
                    ExecutionStatus::Success,
                    events,
                    Some(Value::Array(object_changes)),
                    balance_changes,
                )
            }
            Err(error) => (ExecutionStatus::Failure { error }, Vec::new(), None, Vec::new()),
        };

        state.transactions.push(StoredTransaction {
            record: TransactionRecord {
                digest,
                timestamp_ms: Some(timestamp),
                status: status.clone(),
                gas_used: Self::gas_summary(),
                events: events.clone(),
                balance_changes,
            },
            sender,
            calls_token_module: calls_module,
        });

        tracing::debug!(%digest, success = status.is_success(), "null ledger executed transaction");
        Ok(ExecutionResult {
            digest,
            status,
            gas_used: Self::gas_summary(),
            events,
            object_changes,
        })
    }

    async fn query_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Page<TransactionRecord>, LedgerError> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        let mut matching: Vec<&TransactionRecord> = state
            .transactions
            .iter()
            .filter(|tx| match &query.filter {
                TransactionFilter::MoveModule { package, module } => {
                    tx.calls_token_module
                        && *package == self.config.package
                        && *module == self.config.module
                }
                TransactionFilter::FromAddress(sender) => tx.sender == *sender,
            })
            .map(|tx| &tx.record)
            .collect();
        if query.descending {
            matching.reverse();
        }

        let start = match &query.cursor {
            Some(c) => {
                let after: TransactionDigest = c
                    .parse()
                    .map_err(|_| Self::rejected(format!("invalid cursor {c}")))?;
                matching
                    .iter()
                    .position(|r| r.digest == after)
                    .map_or(matching.len(), |p| p + 1)
            }
            None => 0,
        };
        let limit = query.limit.max(1);
        let end = (start + limit).min(matching.len());
        let data: Vec<TransactionRecord> =
            matching[start..end].iter().map(|r| (*r).clone()).collect();
        Ok(Page {
            next_cursor: data.last().map(|r| r.digest.to_string()),
            has_next_page: end < matching.len(),
            data,
        })
    }

    async fn query_events(
        &self,
        query: &EventQuery,
    ) -> Result<Page<LedgerEvent, EventId>, LedgerError> {
        self.check_available()?;
        let prefix = format!("{}::{}::", query.package, query.module);
        let state = self.state.lock().unwrap();
        let mut events: Vec<&LedgerEvent> = state
            .transactions
            .iter()
            .flat_map(|tx| tx.record.events.iter())
            .filter(|e| e.event_type.starts_with(&prefix))
            .collect();
        if query.descending {
            events.reverse();
        }

        let start = match &query.cursor {
            Some(c) => events
                .iter()
                .position(|e| e.id == *c)
                .map_or(events.len(), |p| p + 1),
            None => 0,
        };
        let limit = query.limit.max(1);
        let end = (start + limit).min(events.len());
        let data: Vec<LedgerEvent> = events[start..end].iter().map(|e| (*e).clone()).collect();
        Ok(Page {
            next_cursor: data.last().map(|e| e.id.clone()),
            has_next_page: end < events.len(),
            data,
        })
    }
}

//! Ledger responses, normalized into typed values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seeds_types::{Address, ObjectId, ObjectRef, TimestampMs, TransactionDigest};

use crate::transaction::ObjectInput;

/// `u64` values travel as decimal strings in ledger JSON; accept either form.
pub mod u64_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Num(u64),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => s.parse().map_err(de::Error::custom),
            Repr::Num(n) => Ok(n),
        }
    }
}

mod opt_timestamp {
    use seeds_types::TimestampMs;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<TimestampMs>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.as_millis().to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimestampMs>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::u64_string")] u64);
        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| TimestampMs::new(w.0)))
    }
}

/// One page of a paginated ledger listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T, C = String> {
    pub data: Vec<T>,
    pub next_cursor: Option<C>,
    pub has_next_page: bool,
}

/// Execution outcome as reported in transaction effects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Gas charged for a transaction, in the gas coin's smallest unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(with = "u64_string")]
    pub computation_cost: u64,
    #[serde(with = "u64_string")]
    pub storage_cost: u64,
    #[serde(with = "u64_string")]
    pub storage_rebate: u64,
    #[serde(with = "u64_string", default)]
    pub non_refundable_storage_fee: u64,
}

/// Identifier of an emitted event; also the cursor for event queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: TransactionDigest,
    #[serde(with = "u64_string")]
    pub event_seq: u64,
}

/// An event emitted during execution, payload left as the ledger's JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub sender: Address,
    #[serde(default)]
    pub parsed_json: Value,
    #[serde(default, with = "opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<TimestampMs>,
}

/// Normalized result of submitting a transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionResult {
    pub digest: TransactionDigest,
    pub status: ExecutionStatus,
    pub gas_used: GasCostSummary,
    pub events: Vec<LedgerEvent>,
    pub object_changes: Option<Value>,
}

/// Net change of one owner's balance of one coin type within a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    pub owner: ObjectOwner,
    pub coin_type: String,
    #[serde(with = "i128_string")]
    pub amount: i128,
}

impl BalanceChange {
    /// The owning address, unless the coin sits in a shared or wrapped object.
    pub fn address(&self) -> Option<Address> {
        match self.owner {
            ObjectOwner::AddressOwner(addr) => Some(addr),
            _ => None,
        }
    }
}

mod i128_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Num(i64),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => s.parse().map_err(de::Error::custom),
            Repr::Num(n) => Ok(n.into()),
        }
    }
}

/// An executed transaction as listed by history queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRecord {
    pub digest: TransactionDigest,
    pub timestamp_ms: Option<TimestampMs>,
    pub status: ExecutionStatus,
    pub gas_used: GasCostSummary,
    pub events: Vec<LedgerEvent>,
    pub balance_changes: Vec<BalanceChange>,
}

/// Who owns an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectOwner {
    AddressOwner(Address),
    ObjectOwner(Address),
    Shared { initial_shared_version: u64 },
    Immutable,
}

/// An object read back from the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerObject {
    pub object_ref: ObjectRef,
    pub owner: ObjectOwner,
    pub object_type: Option<String>,
    /// The Move struct's fields; `Null` if the object has no Move content.
    pub fields: Value,
}

impl LedgerObject {
    /// How to pass this object into a transaction. Shared objects are always
    /// requested mutably.
    pub fn as_input(&self) -> ObjectInput {
        match self.owner {
            ObjectOwner::Shared {
                initial_shared_version,
            } => ObjectInput::Shared {
                id: self.object_ref.object_id,
                initial_shared_version,
                mutable: true,
            },
            _ => ObjectInput::Owned(self.object_ref),
        }
    }

    /// A `u64` field, accepting string or number encodings.
    pub fn u64_field(&self, name: &str) -> Option<u64> {
        match self.fields.get(name)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }
}

/// Which transactions a query lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionFilter {
    /// Transactions that called any function of `package::module`.
    MoveModule { package: ObjectId, module: String },
    /// Transactions signed by this address.
    FromAddress(Address),
}

impl TransactionFilter {
    pub fn module(package: ObjectId, module: impl Into<String>) -> Self {
        Self::MoveModule {
            package,
            module: module.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionQuery {
    pub filter: TransactionFilter,
    pub cursor: Option<String>,
    pub limit: usize,
    pub descending: bool,
}

/// Events whose type is defined in `package::module`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventQuery {
    pub package: ObjectId,
    pub module: String,
    pub cursor: Option<EventId>,
    pub limit: usize,
    pub descending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_decodes_both_outcomes() {
        let ok: ExecutionStatus = serde_json::from_value(json!({"status": "success"})).unwrap();
        assert!(ok.is_success());
        let failed: ExecutionStatus =
            serde_json::from_value(json!({"status": "failure", "error": "InsufficientGas"}))
                .unwrap();
        assert_eq!(
            failed,
            ExecutionStatus::Failure {
                error: "InsufficientGas".into()
            }
        );
    }

    #[test]
    fn gas_summary_roundtrips_as_strings() {
        let gas: GasCostSummary = serde_json::from_value(json!({
            "computationCost": "1000",
            "storageCost": 2000,
            "storageRebate": "500",
            "nonRefundableStorageFee": "5"
        }))
        .unwrap();
        assert_eq!(gas.storage_cost, 2000);
        let back = serde_json::to_value(&gas).unwrap();
        assert_eq!(back["storageCost"], "2000");
    }

    #[test]
    fn event_decodes_ledger_shape() {
        let ev: LedgerEvent = serde_json::from_value(json!({
            "id": {"txDigest": TransactionDigest::new([1; 32]).to_string(), "eventSeq": "0"},
            "packageId": "0xabc",
            "transactionModule": "seeds_coin",
            "sender": "0x5",
            "type": "0xabc::seeds_coin::MintEvent",
            "parsedJson": {"amount": "10", "recipient": "0x6"},
            "bcs": "ignored",
            "timestampMs": "1700000000000"
        }))
        .unwrap();
        assert_eq!(ev.event_type, "0xabc::seeds_coin::MintEvent");
        assert_eq!(ev.timestamp_ms, Some(TimestampMs::new(1_700_000_000_000)));
        assert_eq!(ev.id.event_seq, 0);
    }

    #[test]
    fn balance_change_decodes_signed_amounts() {
        let change: BalanceChange = serde_json::from_value(json!({
            "owner": {"AddressOwner": "0x6"},
            "coinType": "0xabc::seeds_coin::SEEDS_COIN",
            "amount": "-4000000"
        }))
        .unwrap();
        assert_eq!(change.amount, -4_000_000);
        assert_eq!(change.address(), Some("0x6".parse().unwrap()));

        let shared = BalanceChange {
            owner: ObjectOwner::Shared {
                initial_shared_version: 1,
            },
            ..change
        };
        assert_eq!(shared.address(), None);
    }

    #[test]
    fn owner_forms() {
        let shared: ObjectOwner =
            serde_json::from_value(json!({"Shared": {"initial_shared_version": 4}})).unwrap();
        assert_eq!(
            shared,
            ObjectOwner::Shared {
                initial_shared_version: 4
            }
        );
        let owned: ObjectOwner = serde_json::from_value(json!({"AddressOwner": "0x1"})).unwrap();
        assert!(matches!(owned, ObjectOwner::AddressOwner(_)));
        let imm: ObjectOwner = serde_json::from_value(json!("Immutable")).unwrap();
        assert_eq!(imm, ObjectOwner::Immutable);
    }

    #[test]
    fn shared_objects_become_mutable_shared_inputs() {
        let obj = LedgerObject {
            object_ref: ObjectRef {
                object_id: ObjectId::new([2; 32]),
                version: 10,
                digest: seeds_types::ObjectDigest::new([2; 32]),
            },
            owner: ObjectOwner::Shared {
                initial_shared_version: 3,
            },
            object_type: None,
            fields: json!({"max_supply": "5", "current_supply": 7}),
        };
        assert_eq!(
            obj.as_input(),
            ObjectInput::Shared {
                id: ObjectId::new([2; 32]),
                initial_shared_version: 3,
                mutable: true
            }
        );
        assert_eq!(obj.u64_field("max_supply"), Some(5));
        assert_eq!(obj.u64_field("current_supply"), Some(7));
        assert_eq!(obj.u64_field("missing"), None);
    }
}

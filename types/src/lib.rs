//! Fundamental types for the SEEDS token API.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses and object ids, digests, token amounts, coin objects, token events
//! and network selection.

pub mod address;
pub mod amount;
pub mod coin;
pub mod error;
pub mod event;
pub mod hash;
pub mod keys;
pub mod network;
pub mod time;

pub use address::{Address, ObjectId};
pub use amount::{TokenAmount, DECIMALS, UNITS_PER_TOKEN};
pub use coin::{CoinObject, CoinType, ObjectRef};
pub use error::TypesError;
pub use event::{StructTag, TokenEvent, TokenEventKind};
pub use hash::{ObjectDigest, TransactionDigest};
pub use keys::{PrivateKey, PublicKey, Signature};
pub use network::Network;
pub use time::TimestampMs;

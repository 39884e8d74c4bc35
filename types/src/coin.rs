//! Coin objects and the coin type they belong to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::{Address, ObjectId};
use crate::amount::TokenAmount;
use crate::error::TypesError;
use crate::hash::ObjectDigest;

/// Reference to one exact version of an object, as transaction inputs need it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: ObjectDigest,
}

/// A discrete, owned unit of the token.
///
/// A coin's balance never changes in place: every operation that touches it
/// consumes this version and the ledger produces a new one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinObject {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: ObjectDigest,
    pub balance: TokenAmount,
    pub owner: Address,
}

impl CoinObject {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            object_id: self.object_id,
            version: self.version,
            digest: self.digest,
        }
    }
}

/// Fully qualified Move type of a coin: `package::module::Name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CoinType {
    pub package: ObjectId,
    pub module: String,
    pub name: String,
}

impl CoinType {
    pub fn new(package: ObjectId, module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package,
            module: module.into(),
            name: name.into(),
        }
    }

    /// The native gas coin, `0x2::sui::SUI`.
    pub fn gas() -> Self {
        let mut package = [0u8; 32];
        package[31] = 2;
        Self::new(ObjectId::new(package), "sui", "SUI")
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.name)
    }
}

impl FromStr for CoinType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = crate::event::StructTag::parse(s)?;
        Ok(Self::new(tag.address, tag.module, tag.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_type_display_uses_full_package_id() {
        let t = CoinType::new("0xabc".parse().unwrap(), "seeds_coin", "SEEDS_COIN");
        let s = t.to_string();
        assert!(s.starts_with("0x0000"));
        assert!(s.ends_with("0abc::seeds_coin::SEEDS_COIN"));
    }

    #[test]
    fn coin_type_parses_short_package() {
        let t: CoinType = "0x2::sui::SUI".parse().unwrap();
        assert_eq!(t, CoinType::gas());
    }

    #[test]
    fn object_ref_copies_identity() {
        let coin = CoinObject {
            object_id: "0x11".parse().unwrap(),
            version: 9,
            digest: ObjectDigest::new([3u8; 32]),
            balance: TokenAmount::new(5),
            owner: "0x22".parse().unwrap(),
        };
        let r = coin.object_ref();
        assert_eq!(r.object_id, coin.object_id);
        assert_eq!(r.version, 9);
        assert_eq!(r.digest, coin.digest);
    }
}

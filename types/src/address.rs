//! 32-byte ledger identifiers: account addresses and object ids.
//!
//! Both render as `0x` followed by 64 lowercase hex digits. Parsing accepts
//! the short forms the ledger prints for system objects (`0x2`) and left-pads
//! them with zeros.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Length in bytes of addresses and object ids.
pub const ID_LENGTH: usize = 32;

fn parse_hex_id(s: &str) -> Result<[u8; ID_LENGTH], TypesError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > ID_LENGTH * 2 {
        return Err(TypesError::InvalidId(s.to_string()));
    }

    let padded = format!("{:0>width$}", digits, width = ID_LENGTH * 2);
    let mut out = [0u8; ID_LENGTH];
    hex::decode_to_slice(&padded, &mut out).map_err(|_| TypesError::InvalidId(s.to_string()))?;
    Ok(out)
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; ID_LENGTH]);

        impl $name {
            pub const ZERO: Self = Self([0u8; ID_LENGTH]);

            pub fn new(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
                &self.0
            }

            /// Canonical `0x`-prefixed, zero-padded hex form.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_id(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}..)", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(
    /// An account address on the ledger.
    ///
    /// Derived from a public key by the crypto crate; this type only carries
    /// the bytes.
    Address
);

hex_id!(
    /// Identifier of an on-ledger object (coin, capability, config object, package).
    ObjectId
);

impl From<ObjectId> for Address {
    fn from(id: ObjectId) -> Self {
        Address(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_is_left_padded() {
        let id: ObjectId = "0x2".parse().unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 2;
        assert_eq!(id.as_bytes(), &expected);
        assert_eq!(
            id.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn uppercase_hex_normalises_to_lowercase() {
        let a: Address = "0xABCDEF".parse().unwrap();
        assert!(a.to_string().ends_with("abcdef"));
    }

    #[test]
    fn rejects_non_hex() {
        assert!("0xnothex".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
        assert!("0x".parse::<Address>().is_err());
    }

    #[test]
    fn rejects_too_long() {
        let s = format!("0x{}", "1".repeat(65));
        assert!(s.parse::<Address>().is_err());
    }

    #[test]
    fn equal_after_normalisation() {
        let long: Address = format!("0x{:0>64}", "7f").parse().unwrap();
        let short: Address = "0x7F".parse().unwrap();
        assert_eq!(long, short);
    }

    #[test]
    fn serde_uses_hex_string() {
        let a: Address = "0x1".parse().unwrap();
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}

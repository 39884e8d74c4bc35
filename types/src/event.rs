//! Token events emitted by the on-chain `seeds_coin` module.
//!
//! Event classification is done on the parsed struct tag of the event type,
//! matched exactly against the configured package and module, and the payload
//! is decoded into a closed set of variants.

use serde::Serialize;
use serde_json::Value;

use crate::address::{Address, ObjectId};
use crate::amount::TokenAmount;
use crate::error::TypesError;

/// A parsed Move struct tag: `address::module::Name<...>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructTag {
    pub address: ObjectId,
    pub module: String,
    pub name: String,
}

impl StructTag {
    /// Parse a struct tag. Type parameters, if any, are ignored.
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        let invalid = || TypesError::InvalidStructTag(s.to_string());
        let base = s.split('<').next().unwrap_or(s).trim();
        let mut parts = base.split("::");
        let address = parts.next().ok_or_else(invalid)?;
        let module = parts.next().ok_or_else(invalid)?;
        let name = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() || !is_identifier(module) || !is_identifier(name) {
            return Err(invalid());
        }
        Ok(Self {
            address: address.parse().map_err(|_| invalid())?,
            module: module.to_string(),
            name: name.to_string(),
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Which kind of token movement an event records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenEventKind {
    Mint,
    Transfer,
    Burn,
}

/// A token event decoded from the ledger's structured payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenEvent {
    Mint {
        amount: TokenAmount,
        recipient: Address,
    },
    Transfer {
        amount: TokenAmount,
        from: Address,
        to: Address,
    },
    Burn {
        amount: TokenAmount,
        burner: Address,
    },
}

impl TokenEvent {
    /// Classify and decode one ledger event.
    ///
    /// Returns `Ok(None)` for events that do not belong to `package::module`
    /// or that the module emits for other purposes, and an error when a token
    /// event's payload is malformed.
    pub fn parse(
        event_type: &str,
        payload: &Value,
        package: &ObjectId,
        module: &str,
    ) -> Result<Option<Self>, TypesError> {
        let Ok(tag) = StructTag::parse(event_type) else {
            return Ok(None);
        };
        if tag.address != *package || tag.module != module {
            return Ok(None);
        }

        let event = match tag.name.as_str() {
            "MintEvent" => Self::Mint {
                amount: amount_field(payload, "amount")?,
                recipient: address_field(payload, "recipient")?,
            },
            "TransferEvent" => Self::Transfer {
                amount: amount_field(payload, "amount")?,
                from: address_field(payload, "from")?,
                to: address_field(payload, "to")?,
            },
            "BurnEvent" => Self::Burn {
                amount: amount_field(payload, "amount")?,
                burner: address_field(payload, "burner")?,
            },
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn kind(&self) -> TokenEventKind {
        match self {
            Self::Mint { .. } => TokenEventKind::Mint,
            Self::Transfer { .. } => TokenEventKind::Transfer,
            Self::Burn { .. } => TokenEventKind::Burn,
        }
    }

    pub fn amount(&self) -> TokenAmount {
        match self {
            Self::Mint { amount, .. }
            | Self::Transfer { amount, .. }
            | Self::Burn { amount, .. } => *amount,
        }
    }

    /// Address the tokens moved away from, if any.
    pub fn from(&self) -> Option<Address> {
        match self {
            Self::Transfer { from, .. } => Some(*from),
            Self::Burn { burner, .. } => Some(*burner),
            Self::Mint { .. } => None,
        }
    }

    /// Address the tokens moved to, if any.
    pub fn to(&self) -> Option<Address> {
        match self {
            Self::Mint { recipient, .. } => Some(*recipient),
            Self::Transfer { to, .. } => Some(*to),
            Self::Burn { .. } => None,
        }
    }
}

fn amount_field(payload: &Value, field: &str) -> Result<TokenAmount, TypesError> {
    let malformed = |reason: &str| TypesError::MalformedEvent(format!("{field}: {reason}"));
    match payload.get(field) {
        // u64 values arrive as decimal strings in event JSON.
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map(TokenAmount::from)
            .map_err(|_| malformed("not an unsigned integer")),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(TokenAmount::from)
            .ok_or_else(|| malformed("not an unsigned integer")),
        Some(_) => Err(malformed("unexpected JSON type")),
        None => Err(malformed("missing")),
    }
}

fn address_field(payload: &Value, field: &str) -> Result<Address, TypesError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| TypesError::MalformedEvent(format!("{field}: missing")))?
        .parse()
        .map_err(|_| TypesError::MalformedEvent(format!("{field}: not an address")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn package() -> ObjectId {
        "0xabc".parse().unwrap()
    }

    fn ty(name: &str) -> String {
        format!("{}::seeds_coin::{name}", package())
    }

    #[test]
    fn parses_mint_event() {
        let ev = TokenEvent::parse(
            &ty("MintEvent"),
            &json!({"amount": "1500000", "recipient": "0x5"}),
            &package(),
            "seeds_coin",
        )
        .unwrap()
        .unwrap();
        assert_eq!(ev.kind(), TokenEventKind::Mint);
        assert_eq!(ev.amount().raw(), 1_500_000);
        assert_eq!(ev.to(), Some("0x5".parse().unwrap()));
        assert_eq!(ev.from(), None);
    }

    #[test]
    fn parses_transfer_and_burn() {
        let t = TokenEvent::parse(
            &ty("TransferEvent"),
            &json!({"amount": 7, "from": "0x1", "to": "0x2"}),
            &package(),
            "seeds_coin",
        )
        .unwrap()
        .unwrap();
        assert_eq!(t.kind(), TokenEventKind::Transfer);
        assert_eq!(t.from(), Some("0x1".parse().unwrap()));

        let b = TokenEvent::parse(
            &ty("BurnEvent"),
            &json!({"amount": "3", "burner": "0x9"}),
            &package(),
            "seeds_coin",
        )
        .unwrap()
        .unwrap();
        assert_eq!(b.kind(), TokenEventKind::Burn);
        assert_eq!(b.from(), Some("0x9".parse().unwrap()));
    }

    #[test]
    fn similar_names_are_not_misclassified() {
        // Substring matching would have taken this for a mint.
        let r = TokenEvent::parse(
            &ty("PreMintEventLog"),
            &json!({"amount": "1", "recipient": "0x5"}),
            &package(),
            "seeds_coin",
        )
        .unwrap();
        assert!(r.is_none());
    }

    #[test]
    fn other_package_or_module_is_ignored() {
        let other_pkg = "0xdef::seeds_coin::MintEvent";
        let other_mod = format!("{}::seeds_coin_v2::MintEvent", package());
        let payload = json!({"amount": "1", "recipient": "0x5"});
        assert!(TokenEvent::parse(other_pkg, &payload, &package(), "seeds_coin")
            .unwrap()
            .is_none());
        assert!(TokenEvent::parse(&other_mod, &payload, &package(), "seeds_coin")
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let r = TokenEvent::parse(
            &ty("MintEvent"),
            &json!({"amount": "-5", "recipient": "0x5"}),
            &package(),
            "seeds_coin",
        );
        assert!(matches!(r, Err(TypesError::MalformedEvent(_))));

        let r = TokenEvent::parse(
            &ty("BurnEvent"),
            &json!({"amount": "5"}),
            &package(),
            "seeds_coin",
        );
        assert!(r.is_err());
    }

    #[test]
    fn struct_tag_ignores_type_parameters() {
        let tag =
            StructTag::parse("0x2::coin::CoinMetadata<0xabc::seeds_coin::SEEDS_COIN>").unwrap();
        assert_eq!(tag.module, "coin");
        assert_eq!(tag.name, "CoinMetadata");
    }

    #[test]
    fn struct_tag_rejects_bad_shapes() {
        assert!(StructTag::parse("0x2::coin").is_err());
        assert!(StructTag::parse("0x2::coin::A::B").is_err());
        assert!(StructTag::parse("0x2::1bad::A").is_err());
        assert!(StructTag::parse("nothex::m::A").is_err());
    }
}

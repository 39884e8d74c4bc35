use proptest::prelude::*;

use seeds_types::{Address, ObjectDigest, ObjectId, TokenAmount, TransactionDigest};

proptest! {
    /// Formatting to six decimals and parsing back recovers the raw amount.
    #[test]
    fn amount_human_roundtrip(raw in 0u128..u64::MAX as u128 * 1_000) {
        let amount = TokenAmount::new(raw);
        let parsed = TokenAmount::from_human(&amount.to_human()).unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// Parsing never produces more than the input's exact value: digits past
    /// the sixth decimal only ever truncate.
    #[test]
    fn amount_parse_truncates(whole in 0u64..1_000_000, frac in 0u32..10_000_000) {
        let s = format!("{whole}.{frac:07}");
        let parsed = TokenAmount::from_human(&s).unwrap();
        let expected = whole as u128 * 1_000_000 + (frac / 10) as u128;
        prop_assert_eq!(parsed.raw(), expected);
    }

    /// checked_sub returns None exactly when the subtrahend is larger.
    #[test]
    fn amount_checked_sub(a in 0u128..1_000_000, b in 0u128..1_000_000) {
        let result = TokenAmount::new(a).checked_sub(TokenAmount::new(b));
        if b > a {
            prop_assert!(result.is_none());
        } else {
            prop_assert_eq!(result, Some(TokenAmount::new(a - b)));
        }
    }

    /// saturating_sub never panics and returns ZERO on underflow.
    #[test]
    fn amount_saturating_sub(a in 0u128..1_000_000, b in 0u128..1_000_000) {
        let result = TokenAmount::new(a).saturating_sub(TokenAmount::new(b));
        prop_assert_eq!(result.raw(), a.saturating_sub(b));
    }

    /// Address display and parse are inverses.
    #[test]
    fn address_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let address = Address::new(bytes);
        let parsed: Address = address.to_string().parse().unwrap();
        prop_assert_eq!(parsed, address);
    }

    /// Object ids survive a JSON roundtrip as hex strings.
    #[test]
    fn object_id_json_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = ObjectId::new(bytes);
        let json = serde_json::to_string(&id).unwrap();
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, id);
    }

    /// Digests roundtrip through base58.
    #[test]
    fn digest_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let tx = TransactionDigest::new(bytes);
        prop_assert_eq!(tx.to_string().parse::<TransactionDigest>().unwrap(), tx);
        let obj = ObjectDigest::new(bytes);
        prop_assert_eq!(obj.to_string().parse::<ObjectDigest>().unwrap(), obj);
    }
}

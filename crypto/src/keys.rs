//! Ed25519 key handling and the administrative key decoder.
//!
//! The administrative key is accepted in exactly these encodings:
//!
//! | Encoding | Shape |
//! |---|---|
//! | [`KeyEncoding::Hex`] | `0x` + 64 hex digits (raw 32-byte secret) |
//! | [`KeyEncoding::Bech32`] | `suiprivkey1…` Bech32 of flag byte + 32-byte secret |
//! | [`KeyEncoding::Base64Flagged`] | base64 of flag byte + 32-byte secret (keystore form) |
//! | [`KeyEncoding::Base64Raw`] | base64 of the raw 32-byte secret |
//! | [`KeyEncoding::Base64Expanded`] | base64 of secret (32) + public key (32) |
//!
//! Anything else is an error. The flag byte must be `0x00` (Ed25519);
//! other signature schemes are refused rather than reinterpreted.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bech32::FromBase32;
use ed25519_dalek::SigningKey;
use seeds_types::{PrivateKey, PublicKey};
use serde::Serialize;

use crate::error::KeyError;

/// Signature scheme flag for Ed25519.
pub const ED25519_FLAG: u8 = 0x00;

/// Human-readable part of Bech32-encoded private keys.
pub const PRIVATE_KEY_HRP: &str = "suiprivkey";

/// An Ed25519 key pair (public + private).
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Which recognised encoding an administrative key was supplied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEncoding {
    Hex,
    Bech32,
    Base64Flagged,
    Base64Raw,
    Base64Expanded,
}

impl KeyEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Bech32 => "bech32",
            Self::Base64Flagged => "base64_flagged",
            Self::Base64Raw => "base64_raw",
            Self::Base64Expanded => "base64_expanded",
        }
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let private = PrivateKey(*seed);
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// Decode an administrative private key, reporting which encoding matched.
pub fn decode_private_key(input: &str) -> Result<(PrivateKey, KeyEncoding), KeyError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(KeyError::Empty);
    }

    if let Some(digits) = input.strip_prefix("0x") {
        let mut secret = [0u8; 32];
        hex::decode_to_slice(digits, &mut secret).map_err(|_| KeyError::InvalidHex)?;
        return Ok((PrivateKey(secret), KeyEncoding::Hex));
    }

    if input.starts_with(PRIVATE_KEY_HRP) {
        return decode_bech32(input).map(|k| (k, KeyEncoding::Bech32));
    }

    let bytes = STANDARD.decode(input).map_err(|_| KeyError::InvalidBase64)?;
    match bytes.len() {
        33 => Ok((flagged_secret(&bytes)?, KeyEncoding::Base64Flagged)),
        32 => Ok((PrivateKey(to_array(&bytes)), KeyEncoding::Base64Raw)),
        64 => {
            let private = PrivateKey(to_array(&bytes[..32]));
            if public_from_private(&private).0[..] != bytes[32..] {
                return Err(KeyError::PublicKeyMismatch);
            }
            Ok((private, KeyEncoding::Base64Expanded))
        }
        n => Err(KeyError::UnsupportedLength(n)),
    }
}

fn decode_bech32(input: &str) -> Result<PrivateKey, KeyError> {
    let (hrp, data, _variant) =
        bech32::decode(input).map_err(|e| KeyError::InvalidBech32(e.to_string()))?;
    if hrp != PRIVATE_KEY_HRP {
        return Err(KeyError::WrongHrp(hrp));
    }
    let bytes =
        Vec::<u8>::from_base32(&data).map_err(|e| KeyError::InvalidBech32(e.to_string()))?;
    if bytes.len() != 33 {
        return Err(KeyError::UnsupportedLength(bytes.len()));
    }
    flagged_secret(&bytes)
}

fn flagged_secret(bytes: &[u8]) -> Result<PrivateKey, KeyError> {
    if bytes[0] != ED25519_FLAG {
        return Err(KeyError::UnsupportedScheme(bytes[0]));
    }
    Ok(PrivateKey(to_array(&bytes[1..33])))
}

fn to_array(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[..32]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bech32::{ToBase32, Variant};

    const SEED: [u8; 32] = [42u8; 32];

    fn flagged() -> Vec<u8> {
        let mut v = vec![ED25519_FLAG];
        v.extend_from_slice(&SEED);
        v
    }

    fn decoded(input: &str) -> (PublicKey, KeyEncoding) {
        let (key, encoding) = decode_private_key(input).unwrap();
        (public_from_private(&key), encoding)
    }

    fn expected_public() -> PublicKey {
        keypair_from_seed(&SEED).public
    }

    #[test]
    fn hex_encoding() {
        let (public, enc) = decoded(&format!("0x{}", hex::encode(SEED)));
        assert_eq!(enc, KeyEncoding::Hex);
        assert_eq!(public, expected_public());
    }

    #[test]
    fn hex_wrong_length_is_rejected() {
        assert_eq!(
            decode_private_key("0xdeadbeef").err(),
            Some(KeyError::InvalidHex)
        );
    }

    #[test]
    fn bech32_encoding() {
        let encoded = bech32::encode(PRIVATE_KEY_HRP, flagged().to_base32(), Variant::Bech32)
            .unwrap();
        assert!(encoded.starts_with("suiprivkey1"));
        let (public, enc) = decoded(&encoded);
        assert_eq!(enc, KeyEncoding::Bech32);
        assert_eq!(public, expected_public());
    }

    #[test]
    fn bech32_with_other_scheme_is_rejected() {
        let mut data = flagged();
        data[0] = 0x01;
        let encoded =
            bech32::encode(PRIVATE_KEY_HRP, data.to_base32(), Variant::Bech32).unwrap();
        assert_eq!(
            decode_private_key(&encoded).err(),
            Some(KeyError::UnsupportedScheme(0x01))
        );
    }

    #[test]
    fn bech32_bad_checksum_is_rejected() {
        let mut encoded =
            bech32::encode(PRIVATE_KEY_HRP, flagged().to_base32(), Variant::Bech32).unwrap();
        let last = encoded.pop().unwrap();
        encoded.push(if last == 'q' { 'p' } else { 'q' });
        assert!(matches!(
            decode_private_key(&encoded),
            Err(KeyError::InvalidBech32(_))
        ));
    }

    #[test]
    fn base64_flagged_encoding() {
        let (public, enc) = decoded(&STANDARD.encode(flagged()));
        assert_eq!(enc, KeyEncoding::Base64Flagged);
        assert_eq!(public, expected_public());
    }

    #[test]
    fn base64_raw_encoding() {
        let (public, enc) = decoded(&STANDARD.encode(SEED));
        assert_eq!(enc, KeyEncoding::Base64Raw);
        assert_eq!(public, expected_public());
    }

    #[test]
    fn base64_expanded_encoding() {
        let mut bytes = SEED.to_vec();
        bytes.extend_from_slice(expected_public().as_bytes());
        let (public, enc) = decoded(&STANDARD.encode(&bytes));
        assert_eq!(enc, KeyEncoding::Base64Expanded);
        assert_eq!(public, expected_public());
    }

    #[test]
    fn base64_expanded_with_foreign_public_half_is_rejected() {
        let mut bytes = SEED.to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        assert_eq!(
            decode_private_key(&STANDARD.encode(&bytes)).err(),
            Some(KeyError::PublicKeyMismatch)
        );
    }

    #[test]
    fn base64_flagged_secp256k1_is_rejected() {
        let mut bytes = flagged();
        bytes[0] = 0x01;
        assert_eq!(
            decode_private_key(&STANDARD.encode(&bytes)).err(),
            Some(KeyError::UnsupportedScheme(0x01))
        );
    }

    #[test]
    fn base64_other_lengths_are_rejected() {
        assert_eq!(
            decode_private_key(&STANDARD.encode([1u8; 31])).err(),
            Some(KeyError::UnsupportedLength(31))
        );
    }

    #[test]
    fn garbage_and_empty_are_rejected() {
        assert_eq!(decode_private_key("   ").err(), Some(KeyError::Empty));
        assert_eq!(
            decode_private_key("not a key!").err(),
            Some(KeyError::InvalidBase64)
        );
    }

    #[test]
    fn every_encoding_yields_the_same_key() {
        let encodings = [
            format!("0x{}", hex::encode(SEED)),
            bech32::encode(PRIVATE_KEY_HRP, flagged().to_base32(), Variant::Bech32).unwrap(),
            STANDARD.encode(flagged()),
            STANDARD.encode(SEED),
        ];
        for e in &encodings {
            assert_eq!(decoded(e).0, expected_public(), "encoding {e}");
        }
    }

    #[test]
    fn keypair_from_seed_deterministic() {
        let kp1 = keypair_from_seed(&[9u8; 32]);
        let kp2 = keypair_from_seed(&[9u8; 32]);
        assert_eq!(kp1.public, kp2.public);
    }
}

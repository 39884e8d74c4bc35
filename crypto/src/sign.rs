//! Ed25519 signing, intent digests and the administrative signer.
//!
//! Transactions are never signed directly. The signer hashes
//! `intent || bcs(transaction)` with Blake2b-256 and signs that digest; the
//! ledger expects the result serialized as `flag || signature || public key`
//! in base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use seeds_types::{Address, PrivateKey, PublicKey, Signature};
use std::fmt;

use crate::address::derive_address;
use crate::error::KeyError;
use crate::keys::{decode_private_key, public_from_private, KeyEncoding, ED25519_FLAG};

/// Intent prefix for transaction data: scope 0, version 0, app id 0.
pub const INTENT_TRANSACTION: [u8; 3] = [0, 0, 0];

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

/// Digest actually signed for a BCS-encoded transaction.
pub fn intent_digest(tx_bytes: &[u8]) -> [u8; 32] {
    crate::blake2b_256_multi(&[&INTENT_TRANSACTION, tx_bytes])
}

/// The service's administrative identity.
///
/// Holds the decoded key for the life of the process. `Debug` only ever
/// prints the derived address.
pub struct AdminSigner {
    private: PrivateKey,
    public: PublicKey,
    address: Address,
    encoding: KeyEncoding,
}

impl AdminSigner {
    /// Decode a key in any accepted encoding.
    pub fn from_encoded(input: &str) -> Result<Self, KeyError> {
        let (private, encoding) = decode_private_key(input)?;
        Ok(Self::from_private(private, encoding))
    }

    /// Build a signer from a raw 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_private(PrivateKey(seed), KeyEncoding::Hex)
    }

    fn from_private(private: PrivateKey, encoding: KeyEncoding) -> Self {
        let public = public_from_private(&private);
        let address = derive_address(&public);
        Self {
            private,
            public,
            address,
            encoding,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Encoding the key was supplied in.
    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    /// Sign BCS transaction bytes, returning the base64 serialized signature.
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let sig = sign_message(&intent_digest(tx_bytes), &self.private);
        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(sig.as_bytes());
        serialized.extend_from_slice(self.public.as_bytes());
        STANDARD.encode(serialized)
    }
}

impl fmt::Debug for AdminSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    #[test]
    fn sign_and_verify() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let msg = b"test message for seeds";
        let sig = sign_message(msg, &kp.private);
        assert!(verify_signature(msg, &sig, &kp.public));
    }

    #[test]
    fn wrong_message_fails() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let sig = sign_message(b"correct message", &kp.private);
        assert!(!verify_signature(b"wrong message", &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = keypair_from_seed(&[1u8; 32]);
        let kp2 = keypair_from_seed(&[2u8; 32]);
        let sig = sign_message(b"test", &kp1.private);
        assert!(!verify_signature(b"test", &sig, &kp2.public));
    }

    #[test]
    fn invalid_public_key() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let sig = sign_message(b"test", &kp.private);
        assert!(!verify_signature(b"test", &sig, &PublicKey([0xFF; 32])));
    }

    #[test]
    fn intent_digest_depends_on_prefix() {
        let tx = b"tx bytes";
        assert_ne!(intent_digest(tx), crate::blake2b_256(tx));
        assert_eq!(
            intent_digest(tx),
            crate::blake2b_256(&[&[0u8, 0, 0][..], &tx[..]].concat())
        );
    }

    #[test]
    fn serialized_signature_layout() {
        let signer = AdminSigner::from_seed([5u8; 32]);
        let encoded = signer.sign_transaction(b"payload");
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(bytes.len(), 97);
        assert_eq!(bytes[0], ED25519_FLAG);
        assert_eq!(&bytes[65..], signer.public_key().as_bytes());

        let mut sig = [0u8; 64];
        sig.copy_from_slice(&bytes[1..65]);
        assert!(verify_signature(
            &intent_digest(b"payload"),
            &Signature(sig),
            signer.public_key()
        ));
    }

    #[test]
    fn signer_from_encoded_reports_encoding_and_address() {
        let signer = AdminSigner::from_encoded(&format!("0x{}", hex::encode([5u8; 32]))).unwrap();
        assert_eq!(signer.encoding(), KeyEncoding::Hex);
        assert_eq!(signer.address(), AdminSigner::from_seed([5u8; 32]).address());
    }

    #[test]
    fn debug_hides_key_material() {
        let signer = AdminSigner::from_seed([5u8; 32]);
        let dbg = format!("{signer:?}");
        assert!(dbg.contains("address"));
        assert!(!dbg.contains(&hex::encode([5u8; 32])));
    }
}

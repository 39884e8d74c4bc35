//! Cryptographic primitives for the SEEDS token API.
//!
//! - **Ed25519** for transaction signing
//! - **Blake2b-256** for address derivation and intent digests
//! - Decoding of the administrative key from its accepted text encodings

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::derive_address;
pub use error::KeyError;
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{
    decode_private_key, keypair_from_seed, public_from_private, KeyEncoding, KeyPair,
    ED25519_FLAG, PRIVATE_KEY_HRP,
};
pub use sign::{intent_digest, sign_message, verify_signature, AdminSigner, INTENT_TRANSACTION};

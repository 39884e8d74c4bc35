//! Ledger address derivation from Ed25519 public keys.
//!
//! Address = Blake2b-256(scheme flag || public key), with flag `0x00` for Ed25519.

use seeds_types::{Address, PublicKey};

use crate::keys::ED25519_FLAG;

/// Derive the ledger address controlled by an Ed25519 public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    Address::new(crate::blake2b_256_multi(&[
        &[ED25519_FLAG],
        public_key.as_bytes(),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    #[test]
    fn derive_is_deterministic() {
        let kp = keypair_from_seed(&[7u8; 32]);
        assert_eq!(derive_address(&kp.public), derive_address(&kp.public));
    }

    #[test]
    fn different_keys_different_addresses() {
        let a = derive_address(&keypair_from_seed(&[1u8; 32]).public);
        let b = derive_address(&keypair_from_seed(&[2u8; 32]).public);
        assert_ne!(a, b);
    }

    #[test]
    fn flag_is_part_of_the_preimage() {
        let kp = keypair_from_seed(&[3u8; 32]);
        let without_flag = Address::new(crate::blake2b_256(kp.public.as_bytes()));
        assert_ne!(derive_address(&kp.public), without_flag);
    }
}

//! Identity of the deployed token program.

use seeds_types::{Address, CoinType, ObjectId};

/// Module that defines the token and emits its events.
pub const DEFAULT_MODULE: &str = "seeds_coin";

/// One-time-witness type name of the token.
pub const DEFAULT_COIN_NAME: &str = "SEEDS_COIN";

/// Max supply reported when the config object carries none, in smallest units
/// (5,000,000,000 tokens).
pub const DEFAULT_MAX_SUPPLY: u64 = 5_000_000_000_000_000;

/// Contract identifiers and the administrative address, fixed at startup and
/// handed to every component that talks to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenConfig {
    pub package_id: ObjectId,
    pub module: String,
    pub coin_name: String,
    /// Capability object authorising mint and burn.
    pub treasury_cap_id: ObjectId,
    /// Shared object holding `max_supply` / `current_supply`, if deployed.
    pub config_object_id: Option<ObjectId>,
    /// Owner used when a request names none.
    pub admin_address: Address,
}

impl TokenConfig {
    pub fn new(package_id: ObjectId, treasury_cap_id: ObjectId, admin_address: Address) -> Self {
        Self {
            package_id,
            module: DEFAULT_MODULE.to_string(),
            coin_name: DEFAULT_COIN_NAME.to_string(),
            treasury_cap_id,
            config_object_id: None,
            admin_address,
        }
    }

    pub fn with_config_object(mut self, id: ObjectId) -> Self {
        self.config_object_id = Some(id);
        self
    }

    /// `<package>::seeds_coin::SEEDS_COIN`
    pub fn coin_type(&self) -> CoinType {
        CoinType::new(self.package_id, self.module.clone(), self.coin_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_type_uses_package_and_module() {
        let cfg = TokenConfig::new("0xabc".parse().unwrap(), ObjectId::ZERO, Address::ZERO);
        let ty = cfg.coin_type().to_string();
        assert!(ty.starts_with("0x0000"));
        assert!(ty.ends_with("abc::seeds_coin::SEEDS_COIN"));
        assert_eq!(cfg.config_object_id, None);
    }
}

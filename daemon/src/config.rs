//! Server configuration with TOML file support.
//!
//! A file provides the base; command-line flags and `SEEDS_*` environment
//! variables override it field by field. The admin private key is never part
//! of this structure.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use seeds_ledger::DEFAULT_GAS_BUDGET;
use seeds_types::{Address, Network, ObjectId};
use seeds_utils::LogFormat;
use seeds_wallet_core::{AnalyticsOptions, TokenConfig, DEFAULT_COIN_NAME, DEFAULT_MODULE};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP API binds to.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Ledger network; picks the full-node URL unless `rpc_url` is set.
    #[serde(default = "default_network")]
    pub network: Network,

    /// Explicit full-node JSON-RPC URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<ObjectId>,

    #[serde(default = "default_module")]
    pub module: String,

    #[serde(default = "default_coin_name")]
    pub coin_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treasury_cap_id: Option<ObjectId>,

    /// Shared object tracking supply; analytics fall back to the treasury
    /// cap without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_object_id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_address: Option<Address>,

    /// File holding the admin private key, read when the
    /// `SEEDS_ADMIN_PRIVATE_KEY` variable is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_key_file: Option<PathBuf>,

    /// Gas budget per transaction, in the gas coin's smallest unit.
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,

    /// Event pages scanned when discovering token holders.
    #[serde(default = "default_holder_scan_pages")]
    pub holder_scan_pages: usize,

    /// Most recent transactions counted by activity stats.
    #[serde(default = "default_stats_window")]
    pub stats_window: usize,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Serve against an in-memory ledger seeded with an admin balance.
    #[serde(default)]
    pub simulate: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_network() -> Network {
    Network::Testnet
}

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

fn default_coin_name() -> String {
    DEFAULT_COIN_NAME.to_string()
}

fn default_gas_budget() -> u64 {
    DEFAULT_GAS_BUDGET
}

fn default_holder_scan_pages() -> usize {
    AnalyticsOptions::default().holder_scan_pages
}

fn default_stats_window() -> usize {
    AnalyticsOptions::default().stats_window
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Overrides taken from the command line or `SEEDS_*` variables.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct Overrides {
    /// Address to bind the HTTP API to.
    #[arg(long, env = "SEEDS_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Ledger network: "mainnet", "testnet", "devnet" or "localnet".
    #[arg(long, env = "SEEDS_NETWORK")]
    pub network: Option<Network>,

    /// Full-node JSON-RPC URL (overrides the network default).
    #[arg(long, env = "SEEDS_RPC_URL")]
    pub rpc_url: Option<String>,

    #[arg(long, env = "SEEDS_PACKAGE_ID")]
    pub package_id: Option<ObjectId>,

    #[arg(long, env = "SEEDS_TREASURY_CAP_ID")]
    pub treasury_cap_id: Option<ObjectId>,

    #[arg(long, env = "SEEDS_CONFIG_OBJECT_ID")]
    pub config_object_id: Option<ObjectId>,

    #[arg(long, env = "SEEDS_ADMIN_ADDRESS")]
    pub admin_address: Option<Address>,

    /// File holding the admin private key.
    #[arg(long, env = "SEEDS_ADMIN_KEY_FILE")]
    pub admin_key_file: Option<PathBuf>,

    #[arg(long, env = "SEEDS_GAS_BUDGET")]
    pub gas_budget: Option<u64>,

    #[arg(long, env = "SEEDS_HOLDER_SCAN_PAGES")]
    pub holder_scan_pages: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SEEDS_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[arg(long, env = "SEEDS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Use the in-memory ledger instead of a full node.
    #[arg(long, env = "SEEDS_SIMULATE")]
    pub simulate: bool,
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ServerConfig is always serializable to TOML")
    }

    pub fn with_overrides(self, o: Overrides) -> Self {
        Self {
            listen: o.listen.unwrap_or(self.listen),
            network: o.network.unwrap_or(self.network),
            rpc_url: o.rpc_url.or(self.rpc_url),
            package_id: o.package_id.or(self.package_id),
            treasury_cap_id: o.treasury_cap_id.or(self.treasury_cap_id),
            config_object_id: o.config_object_id.or(self.config_object_id),
            admin_address: o.admin_address.or(self.admin_address),
            admin_key_file: o.admin_key_file.or(self.admin_key_file),
            gas_budget: o.gas_budget.unwrap_or(self.gas_budget),
            holder_scan_pages: o.holder_scan_pages.unwrap_or(self.holder_scan_pages),
            log_format: o.log_format.unwrap_or(self.log_format),
            log_level: o.log_level.unwrap_or(self.log_level),
            simulate: o.simulate || self.simulate,
            ..self
        }
    }

    /// The full-node URL to talk to.
    pub fn ledger_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.fullnode_url())
    }

    pub fn analytics(&self) -> AnalyticsOptions {
        AnalyticsOptions {
            holder_scan_pages: self.holder_scan_pages,
            stats_window: self.stats_window,
        }
    }

    /// Token identity for a real ledger; every id must be configured.
    pub fn token_config(&self) -> anyhow::Result<TokenConfig> {
        let package = self.package_id.context("package_id is not configured")?;
        let cap = self
            .treasury_cap_id
            .context("treasury_cap_id is not configured")?;
        let admin = self
            .admin_address
            .context("admin_address is not configured")?;
        Ok(self.token_config_with(package, cap, admin))
    }

    pub fn token_config_with(
        &self,
        package: ObjectId,
        cap: ObjectId,
        admin: Address,
    ) -> TokenConfig {
        let mut config = TokenConfig::new(package, cap, admin);
        config.module = self.module.clone();
        config.coin_name = self.coin_name.clone();
        config.config_object_id = self.config_object_id;
        config
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            network: default_network(),
            rpc_url: None,
            package_id: None,
            module: default_module(),
            coin_name: default_coin_name(),
            treasury_cap_id: None,
            config_object_id: None,
            admin_address: None,
            admin_key_file: None,
            gas_budget: default_gas_budget(),
            holder_scan_pages: default_holder_scan_pages(),
            stats_window: default_stats_window(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            simulate: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServerConfig {
            package_id: Some(ObjectId::new([1; 32])),
            ..Default::default()
        };
        let parsed = ServerConfig::from_toml_str(&config.to_toml_string()).expect("should parse");
        assert_eq!(parsed.listen, config.listen);
        assert_eq!(parsed.package_id, config.package_id);
        assert_eq!(parsed.network, Network::Testnet);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServerConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.listen.port(), 3000);
        assert_eq!(config.module, "seeds_coin");
        assert_eq!(config.gas_budget, DEFAULT_GAS_BUDGET);
        assert_eq!(config.holder_scan_pages, 20);
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(!config.simulate);
    }

    #[test]
    fn file_values_are_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            listen = "127.0.0.1:8080"
            network = "devnet"
            package_id = "0xabc"
            treasury_cap_id = "0xca"
            admin_address = "0x5"
            log_format = "json"
            "#
        )
        .unwrap();
        let config = ServerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.ledger_url().contains("devnet"));

        let token = config.token_config().unwrap();
        assert_eq!(token.admin_address, "0x5".parse::<Address>().unwrap());
        assert_eq!(token.config_object_id, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerConfig::from_toml_file(&dir.path().join("seeds.toml")).is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let base = ServerConfig::from_toml_str(
            r#"
            network = "mainnet"
            gas_budget = 10
            package_id = "0xabc"
            "#,
        )
        .unwrap();
        let config = base.with_overrides(Overrides {
            rpc_url: Some("http://127.0.0.1:9000".into()),
            gas_budget: Some(99),
            simulate: true,
            ..Default::default()
        });
        assert_eq!(config.ledger_url(), "http://127.0.0.1:9000");
        assert_eq!(config.gas_budget, 99);
        assert_eq!(config.package_id, Some("0xabc".parse::<ObjectId>().unwrap()));
        assert!(config.simulate);
    }

    #[test]
    fn token_config_requires_ids() {
        let err = ServerConfig::default().token_config().unwrap_err();
        assert!(err.to_string().contains("package_id"));
    }
}

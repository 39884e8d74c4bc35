//! SEEDS daemon: entry point for running the token API server.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use seeds_crypto::AdminSigner;
use seeds_ledger::{JsonRpcLedger, LedgerClient};
use seeds_nullables::{NullLedger, NullLedgerConfig};
use seeds_rpc::{AppState, RpcServer};
use seeds_types::{ObjectId, TokenAmount};
use seeds_wallet_core::{TokenConfig, TokenService, DEFAULT_MAX_SUPPLY};

use crate::config::{Overrides, ServerConfig};

/// Environment variable holding the encoded admin private key.
const ADMIN_KEY_VAR: &str = "SEEDS_ADMIN_PRIVATE_KEY";

/// Balance the simulated admin starts with: one million tokens.
const SIMULATED_ADMIN_BALANCE: u64 = 1_000_000_000_000;

const SIMULATED_KEY_SEED: [u8; 32] = [0x5E; 32];

#[derive(Parser)]
#[command(name = "seeds-daemon", about = "SEEDS token API server")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "SEEDS_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    let config = base.with_overrides(cli.overrides);

    seeds_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let signer = load_signer(&config)?;
    let (ledger, token_config, signer) = if config.simulate {
        let (ledger, token_config, signer) = simulated(&config, signer);
        (ledger, token_config, Some(signer))
    } else {
        let token_config = config.token_config()?;
        let ledger: Arc<dyn LedgerClient> =
            Arc::new(JsonRpcLedger::new(config.ledger_url(), config.gas_budget)?);
        tracing::info!(
            network = config.network.as_str(),
            url = config.ledger_url(),
            "using full-node ledger"
        );
        (ledger, token_config, signer)
    };

    report_signer(&token_config, signer.as_ref());

    let service = TokenService::new(ledger, Arc::new(token_config), signer.map(Arc::new));
    let state = AppState::new(Arc::new(service), config.analytics());

    tracing::info!(listen = %config.listen, simulate = config.simulate, "starting SEEDS API");
    RpcServer::new(config.listen, state)
        .start(shutdown_signal())
        .await?;

    tracing::info!("SEEDS daemon exited cleanly");
    Ok(())
}

/// Decode the admin key from the environment, or from the configured file.
///
/// No key at all is allowed: reads keep working and mutating endpoints
/// report the missing capability. A key in an unrecognised encoding is fatal.
fn load_signer(config: &ServerConfig) -> anyhow::Result<Option<AdminSigner>> {
    let encoded = match std::env::var(ADMIN_KEY_VAR) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => match &config.admin_key_file {
            Some(path) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read admin key file {}", path.display()))?,
            ),
            None => None,
        },
    };

    encoded
        .map(|key| {
            AdminSigner::from_encoded(key.trim()).context("admin private key could not be decoded")
        })
        .transpose()
}

fn report_signer(token_config: &TokenConfig, signer: Option<&AdminSigner>) {
    match signer {
        Some(signer) if signer.address() != token_config.admin_address => {
            tracing::warn!(
                configured = %token_config.admin_address,
                derived = %signer.address(),
                encoding = signer.encoding().as_str(),
                "admin key does not match the configured admin address"
            );
        }
        Some(signer) => {
            tracing::info!(
                admin = %signer.address(),
                encoding = signer.encoding().as_str(),
                "admin key loaded"
            );
        }
        None => {
            tracing::warn!("no admin key configured, mint/transfer/burn are unavailable");
        }
    }
}

/// An in-memory ledger whose admin holds a starting balance.
fn simulated(
    config: &ServerConfig,
    signer: Option<AdminSigner>,
) -> (Arc<dyn LedgerClient>, TokenConfig, AdminSigner) {
    let signer = signer.unwrap_or_else(|| {
        tracing::warn!("no admin key configured, simulating with a throwaway key");
        AdminSigner::from_seed(SIMULATED_KEY_SEED)
    });
    let admin = signer.address();
    let package = config
        .package_id
        .unwrap_or_else(|| ObjectId::new([0x5E; 32]));
    let cap = config
        .treasury_cap_id
        .unwrap_or_else(|| ObjectId::new([0xCA; 32]));
    let config_object = config
        .config_object_id
        .unwrap_or_else(|| ObjectId::new([0xC0; 32]));

    let mut token_config = config.token_config_with(package, cap, admin);
    token_config.config_object_id = Some(config_object);

    let ledger = NullLedger::new(NullLedgerConfig {
        package,
        module: token_config.module.clone(),
        coin_name: token_config.coin_name.clone(),
        treasury_cap: cap,
        admin,
        config_object: Some(config_object),
        max_supply: DEFAULT_MAX_SUPPLY,
    });
    ledger.set_current_supply(SIMULATED_ADMIN_BALANCE);
    ledger.seed_coin(admin, TokenAmount::from(SIMULATED_ADMIN_BALANCE));
    tracing::info!(
        %admin,
        balance = %TokenAmount::from(SIMULATED_ADMIN_BALANCE).to_human(),
        "using simulated ledger"
    );

    (Arc::new(ledger), token_config, signer)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
        _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
    }
}

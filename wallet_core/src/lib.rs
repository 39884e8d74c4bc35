//! Token operations for the SEEDS API.
//!
//! Provides everything the HTTP layer needs:
//! - Coin inventory reads (every page of an owner's coins)
//! - Coin selection for exact-amount spends (merge, then split)
//! - Transaction assembly and single-shot submission for mint, transfer, burn
//! - Balance, history and analytics reads

pub mod analytics;
pub mod balance;
pub mod coin_selection;
pub mod config;
pub mod error;
pub mod history;
pub mod inventory;
pub mod token;
pub mod transaction_builder;

pub use analytics::{
    fetch_analytics, AnalyticsOptions, AnalyticsReport, AnalyticsSection, DistributionStats,
    HolderShare, KindStats, SupplyStats, TransactionStats,
};
pub use balance::{fetch_balance, BalanceSummary};
pub use coin_selection::{select_coins, SelectionError, SpendPlan};
pub use config::{TokenConfig, DEFAULT_COIN_NAME, DEFAULT_MAX_SUPPLY, DEFAULT_MODULE};
pub use error::TokenError;
pub use history::{
    fetch_history, parse_date, HistoryEntry, HistoryFilter, HistoryPage, HistoryRequest,
    DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT,
};
pub use inventory::fetch_all_coins;
pub use token::{Operation, TokenService, TransactionRequest};
pub use transaction_builder::{assemble, assemble_mint, submit, FinalOperation, TransactionResult};

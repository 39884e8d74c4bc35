//! HTTP API for the SEEDS token.
//!
//! Provides endpoints for:
//! - Balances and coin listings
//! - Mint, transfer and burn submission
//! - Filtered transaction history
//! - Supply, distribution and activity analytics
//! - Admin key diagnostics, liveness and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pagination;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use metrics::ApiMetrics;
pub use server::{router, RpcServer};
pub use state::AppState;

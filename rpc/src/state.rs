//! Shared state handed to every handler.

use std::sync::Arc;

use seeds_wallet_core::{AnalyticsOptions, TokenService};

use crate::metrics::ApiMetrics;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TokenService>,
    pub analytics: AnalyticsOptions,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    pub fn new(service: Arc<TokenService>, analytics: AnalyticsOptions) -> Self {
        Self {
            service,
            analytics,
            metrics: Arc::new(ApiMetrics::new()),
        }
    }
}

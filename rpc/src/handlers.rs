//! HTTP handlers and their request/response shapes.
//!
//! Amounts arrive in human units and leave as smallest-unit integer strings
//! next to a formatted decimal string.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use seeds_ledger::{GasCostSummary, LedgerEvent};
use seeds_types::{
    Address, CoinObject, ObjectId, TimestampMs, TokenAmount, TokenEventKind, TransactionDigest,
};
use seeds_wallet_core::{
    fetch_analytics, fetch_balance, fetch_history, parse_date, AnalyticsReport, BalanceSummary,
    HistoryEntry, HistoryFilter, HistoryPage, HistoryRequest, HolderShare, Operation,
    TransactionRequest, TransactionResult,
};

use crate::error::RpcError;
use crate::metrics::METRICS_CONTENT_TYPE;
use crate::pagination::{PaginationMeta, PaginationParams};
use crate::state::AppState;

/// Successful response body: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, RpcError>;

fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        success: true,
        data,
    }))
}

fn rejected(rejection: impl std::fmt::Display) -> RpcError {
    RpcError::InvalidRequest(rejection.to_string())
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, RpcError> {
    value.ok_or_else(|| RpcError::InvalidRequest(format!("missing field `{field}`")))
}

fn parse_address(field: &str, value: &str) -> Result<Address, RpcError> {
    value
        .trim()
        .parse()
        .map_err(|_| RpcError::InvalidRequest(format!("`{field}` is not a valid address: {value}")))
}

/// An optional address field; blank strings count as absent.
fn optional_address(field: &str, value: Option<&str>) -> Result<Option<Address>, RpcError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_address(field, v).map(Some),
        None => Ok(None),
    }
}

fn parse_amount(field: &str, value: &str) -> Result<TokenAmount, RpcError> {
    TokenAmount::from_human(value)
        .map_err(|_| RpcError::InvalidRequest(format!("`{field}` is not a valid amount: {value}")))
}

/// A human-unit amount, given as a JSON number or a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    pub fn to_amount(&self) -> Result<TokenAmount, RpcError> {
        match self {
            Self::Number(n) => parse_amount("amount", &n.to_string()),
            Self::Text(s) => parse_amount("amount", s),
        }
    }
}

/// A smallest-unit amount next to its formatted decimal form.
#[derive(Debug, Clone, Serialize)]
pub struct AmountView {
    pub amount: String,
    pub formatted: String,
}

impl From<TokenAmount> for AmountView {
    fn from(amount: TokenAmount) -> Self {
        Self {
            amount: amount.raw().to_string(),
            formatted: amount.to_human(),
        }
    }
}

// ── Balance ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct BalanceParams {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinView {
    pub coin_object_id: ObjectId,
    pub version: String,
    pub digest: String,
    pub balance: String,
}

impl From<&CoinObject> for CoinView {
    fn from(coin: &CoinObject) -> Self {
        Self {
            coin_object_id: coin.object_id,
            version: coin.version.to_string(),
            digest: coin.digest.to_string(),
            balance: coin.balance.raw().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: String,
    pub formatted_balance: String,
    pub decimals: u32,
    pub coin_count: usize,
    pub coins: Vec<CoinView>,
}

impl From<BalanceSummary> for BalanceResponse {
    fn from(summary: BalanceSummary) -> Self {
        Self {
            address: summary.address,
            balance: summary.total.raw().to_string(),
            formatted_balance: summary.total.to_human(),
            decimals: summary.decimals,
            coin_count: summary.coin_count(),
            coins: summary.coins.iter().map(CoinView::from).collect(),
        }
    }
}

pub async fn balance(
    State(state): State<AppState>,
    params: Result<Query<BalanceParams>, QueryRejection>,
) -> ApiResult<BalanceResponse> {
    let Query(params) = params.map_err(rejected)?;
    let address = optional_address("address", params.address.as_deref())?;
    let summary = fetch_balance(state.service.ledger(), state.service.config(), address).await?;
    ok(summary.into())
}

// ── Mint / transfer / burn ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub amount: Option<AmountInput>,
    pub recipient: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub amount: Option<AmountInput>,
    pub recipient: Option<String>,
    pub from_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRequest {
    pub amount: Option<AmountInput>,
    pub from_address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub transaction_digest: TransactionDigest,
    pub status: &'static str,
    pub amount: String,
    pub formatted_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
    pub gas_used: GasCostSummary,
    pub events: Vec<LedgerEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_changes: Option<Value>,
}

impl From<TransactionResult> for TransactionResponse {
    fn from(result: TransactionResult) -> Self {
        Self {
            transaction_digest: result.digest,
            status: if result.status.is_success() {
                "success"
            } else {
                "failed"
            },
            amount: result.amount.raw().to_string(),
            formatted_amount: result.amount.to_human(),
            from: result.owner,
            recipient: result.recipient,
            gas_used: result.gas_used,
            events: result.events,
            object_changes: result.object_changes,
        }
    }
}

async fn run(state: &AppState, request: TransactionRequest) -> ApiResult<TransactionResponse> {
    let operation = request.operation.name();
    let result = state.service.execute(request).await;
    state.metrics.record_operation(operation, result.is_err());
    ok(result?.into())
}

pub async fn mint(
    State(state): State<AppState>,
    body: Result<Json<MintRequest>, JsonRejection>,
) -> ApiResult<TransactionResponse> {
    let Json(body) = body.map_err(rejected)?;
    let amount = required("amount", body.amount)?.to_amount()?;
    let recipient = parse_address("recipient", &required("recipient", body.recipient)?)?;
    run(
        &state,
        TransactionRequest {
            operation: Operation::Mint { recipient },
            amount,
            owner: None,
        },
    )
    .await
}

pub async fn transfer(
    State(state): State<AppState>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<TransactionResponse> {
    let Json(body) = body.map_err(rejected)?;
    let amount = required("amount", body.amount)?.to_amount()?;
    let destination = parse_address("recipient", &required("recipient", body.recipient)?)?;
    let owner = optional_address("fromAddress", body.from_address.as_deref())?;
    run(
        &state,
        TransactionRequest {
            operation: Operation::Transfer { destination },
            amount,
            owner,
        },
    )
    .await
}

pub async fn burn(
    State(state): State<AppState>,
    body: Result<Json<BurnRequest>, JsonRejection>,
) -> ApiResult<TransactionResponse> {
    let Json(body) = body.map_err(rejected)?;
    let amount = required("amount", body.amount)?.to_amount()?;
    let owner = optional_address("fromAddress", body.from_address.as_deref())?;
    run(
        &state,
        TransactionRequest {
            operation: Operation::Burn,
            amount,
            owner,
        },
    )
    .await
}

// ── History ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub address: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl HistoryParams {
    pub fn to_filter(&self) -> Result<HistoryFilter, RpcError> {
        let kind = match present(&self.kind).map(str::to_lowercase).as_deref() {
            None | Some("all") => None,
            Some("mint") => Some(TokenEventKind::Mint),
            Some("transfer") => Some(TokenEventKind::Transfer),
            Some("burn") => Some(TokenEventKind::Burn),
            Some(other) => {
                return Err(RpcError::InvalidRequest(format!(
                    "unknown transaction type: {other}"
                )))
            }
        };
        Ok(HistoryFilter {
            kind,
            from_date: present(&self.from_date).map(parse_date).transpose()?,
            to_date: present(&self.to_date).map(parse_date).transpose()?,
            min_amount: present(&self.min_amount)
                .map(|v| parse_amount("minAmount", v))
                .transpose()?,
            max_amount: present(&self.max_amount)
                .map(|v| parse_amount("maxAmount", v))
                .transpose()?,
            address: present(&self.address).map(str::to_string),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TokenEventKind,
    pub amount: String,
    pub formatted_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    pub timestamp: u64,
    pub tx_digest: TransactionDigest,
    pub gas_used: String,
    pub status: &'static str,
}

impl From<HistoryEntry> for HistoryEntryView {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.tx_digest.to_string(),
            kind: entry.kind,
            amount: entry.amount.raw().to_string(),
            formatted_amount: entry.amount.to_human(),
            from: entry.from,
            to: entry.to,
            timestamp: entry.timestamp.as_millis(),
            tx_digest: entry.tx_digest,
            gas_used: entry.gas_used.to_string(),
            status: if entry.status.is_success() {
                "success"
            } else {
                "failed"
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub transactions: Vec<HistoryEntryView>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
    /// Entries on this page after filtering.
    pub total_count: usize,
}

impl From<HistoryPage> for HistoryResponse {
    fn from(page: HistoryPage) -> Self {
        let transactions: Vec<HistoryEntryView> =
            page.entries.into_iter().map(HistoryEntryView::from).collect();
        Self {
            total_count: transactions.len(),
            transactions,
            pagination: PaginationMeta {
                has_next_page: page.has_next_page,
                next_cursor: page.next_cursor,
            },
        }
    }
}

pub async fn transactions(
    State(state): State<AppState>,
    page: Result<Query<PaginationParams>, QueryRejection>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> ApiResult<HistoryResponse> {
    let Query(page) = page.map_err(rejected)?;
    let Query(params) = params.map_err(rejected)?;
    let request = HistoryRequest {
        filter: params.to_filter()?,
        limit: page.effective_limit() as usize,
        cursor: page.cursor(),
    };
    let history = fetch_history(
        state.service.ledger(),
        state.service.config(),
        &request,
        TimestampMs::now(),
    )
    .await?;
    ok(history.into())
}

// ── Analytics ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyView {
    pub total_supply: AmountView,
    pub max_supply: AmountView,
    pub circulating_supply: AmountView,
    pub burned_tokens: AmountView,
    /// Percentage of the maximum supply in existence.
    pub supply_utilization: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderView {
    pub address: Address,
    pub balance: AmountView,
    pub percentage: f64,
    pub label: String,
}

impl From<HolderShare> for HolderView {
    fn from(holder: HolderShare) -> Self {
        Self {
            address: holder.address,
            balance: holder.balance.into(),
            percentage: holder.percentage,
            label: holder.label,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionView {
    pub holders: Vec<HolderView>,
    pub total_holders: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatsView {
    pub total_mints: u64,
    pub total_transfers: u64,
    pub total_burns: u64,
    pub mint_volume: AmountView,
    pub transfer_volume: AmountView,
    pub burn_volume: AmountView,
    pub total_volume: AmountView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub supply_stats: SupplyView,
    pub distribution_stats: DistributionView,
    pub transaction_stats: TransactionStatsView,
    /// Sections that fell back to defaults because their queries failed.
    pub partial_failures: Vec<&'static str>,
}

impl From<AnalyticsReport> for AnalyticsResponse {
    fn from(report: AnalyticsReport) -> Self {
        let AnalyticsReport {
            supply,
            distribution,
            transactions,
            partial_failures,
        } = report;
        Self {
            supply_stats: SupplyView {
                total_supply: supply.total_supply.into(),
                max_supply: supply.max_supply.into(),
                circulating_supply: supply.circulating_supply.into(),
                burned_tokens: supply.burned.into(),
                supply_utilization: supply.utilization_pct,
            },
            distribution_stats: DistributionView {
                holders: distribution
                    .holders
                    .into_iter()
                    .map(HolderView::from)
                    .collect(),
                total_holders: distribution.total_holders,
            },
            transaction_stats: TransactionStatsView {
                total_mints: transactions.mints.count,
                total_transfers: transactions.transfers.count,
                total_burns: transactions.burns.count,
                mint_volume: transactions.mints.volume.into(),
                transfer_volume: transactions.transfers.volume.into(),
                burn_volume: transactions.burns.volume.into(),
                total_volume: transactions.total_volume.into(),
            },
            partial_failures: partial_failures.iter().map(|s| s.as_str()).collect(),
        }
    }
}

pub async fn analytics(State(state): State<AppState>) -> ApiResult<AnalyticsResponse> {
    let report = fetch_analytics(
        state.service.ledger(),
        state.service.config(),
        &state.analytics,
    )
    .await;
    ok(report.into())
}

// ── Diagnostics ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfoResponse {
    pub has_keypair: bool,
    pub configured_address: Address,
    pub keypair_address: Option<Address>,
    pub address_match: bool,
    /// Which key encoding was recognised. Never the key itself.
    pub key_encoding: Option<&'static str>,
}

pub async fn admin_info(State(state): State<AppState>) -> ApiResult<AdminInfoResponse> {
    let configured = state.service.config().admin_address;
    let signer = state.service.signer();
    let keypair_address = signer.map(|s| s.address());
    ok(AdminInfoResponse {
        has_keypair: signer.is_some(),
        configured_address: configured,
        keypair_address,
        address_match: keypair_address == Some(configured),
        key_encoding: signer.map(|s| s.encoding().as_str()),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> ApiResult<HealthResponse> {
    ok(HealthResponse { status: "ok" })
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, RpcError> {
    let body = state.metrics.encode()?;
    Ok(([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amounts_accept_numbers_and_strings() {
        let n: AmountInput = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(n.to_amount().unwrap(), TokenAmount::new(1_500_000));
        let s: AmountInput = serde_json::from_value(json!("0.0000019")).unwrap();
        assert_eq!(s.to_amount().unwrap(), TokenAmount::new(1));
        let neg: AmountInput = serde_json::from_value(json!(-2)).unwrap();
        assert!(neg.to_amount().is_err());
    }

    #[test]
    fn history_params_build_filter() {
        let params = HistoryParams {
            kind: Some("Burn".into()),
            from_date: Some("2024-01-01".into()),
            min_amount: Some("10".into()),
            address: Some(" ".into()),
            ..Default::default()
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.kind, Some(TokenEventKind::Burn));
        assert_eq!(
            filter.from_date.map(|d| d.as_millis()),
            Some(1_704_067_200_000)
        );
        assert_eq!(filter.min_amount, Some(TokenAmount::new(10_000_000)));
        assert_eq!(filter.address, None);
    }

    #[test]
    fn all_type_means_unfiltered_and_unknown_type_is_rejected() {
        let all = HistoryParams {
            kind: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(all.to_filter().unwrap().kind, None);

        let bad = HistoryParams {
            kind: Some("swap".into()),
            ..Default::default()
        };
        assert!(matches!(bad.to_filter(), Err(RpcError::InvalidRequest(_))));
    }

    #[test]
    fn bad_dates_are_input_errors() {
        let params = HistoryParams {
            to_date: Some("yesterday".into()),
            ..Default::default()
        };
        let err = params.to_filter().unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}

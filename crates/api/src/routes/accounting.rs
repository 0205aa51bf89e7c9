//! Accounting routes: chart of accounts, journal entries, fiscal periods and
//! financial reports.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use kontor_db::{
    AccountRepository, FiscalRepository, JournalRepository, ReportRepository,
    repositories::{
        AccountFilter, CreateAccountInput, CreateJournalEntryInput, JournalEntryFilter,
        ReportFilter, UpdateAccountInput, UpdateJournalEntryInput,
    },
};
use kontor_shared::types::PageRequest;

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the accounting router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/accounts/{id}/ledger", get(account_ledger))
        .route("/journal-entries", get(list_entries).post(create_entry))
        .route(
            "/journal-entries/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/journal-entries/{id}/post", post(post_entry))
        .route("/journal-entries/{id}/void", post(void_entry))
        .route("/fiscal-years", get(list_fiscal_years))
        .route("/fiscal-periods/{id}/close", post(close_period))
        .route("/fiscal-periods/{id}/reopen", post(reopen_period))
        .route("/reports/trial-balance", get(trial_balance))
        .route("/reports/profit-loss", get(profit_loss))
        .route("/reports/balance-sheet", get(balance_sheet))
}

/// Request body for voiding an entry.
#[derive(Debug, Default, Deserialize)]
pub struct VoidRequest {
    /// Why the entry is voided.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Date range for the account ledger.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    /// Inclusive start.
    pub from: Option<NaiveDate>,
    /// Inclusive end.
    pub to: Option<NaiveDate>,
}

/// Query for the balance sheet.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceSheetQuery {
    /// Report date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

// ============================================================================
// Accounts
// ============================================================================

async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let accounts = AccountRepository::new(state.conn())
        .list_accounts(org_id, filter)
        .await?;
    Ok(Json(json!({ "accounts": accounts })))
}

async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateAccountInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let account = AccountRepository::new(state.conn())
        .create_account(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let account = AccountRepository::new(state.conn())
        .get_account(org_id, id)
        .await?;
    Ok(Json(account))
}

async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateAccountInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let account = AccountRepository::new(state.conn())
        .update_account(org_id, id, input)
        .await?;
    Ok(Json(account))
}

async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    AccountRepository::new(state.conn())
        .delete_account(org_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn account_ledger(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Query(range): Query<LedgerQuery>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let ledger = ReportRepository::new(state.conn())
        .account_ledger(org_id, id, range.from, range.to)
        .await?;
    Ok(Json(ledger))
}

// ============================================================================
// Journal entries
// ============================================================================

async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<JournalEntryFilter>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let entries = JournalRepository::new(state.conn())
        .list_entries(org_id, filter, &page)
        .await?;
    Ok(Json(entries))
}

async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateJournalEntryInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let entry = JournalRepository::new(state.conn())
        .create_entry(org_id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn get_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let entry = JournalRepository::new(state.conn())
        .get_entry(org_id, id)
        .await?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateJournalEntryInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let entry = JournalRepository::new(state.conn())
        .update_entry(org_id, id, input)
        .await?;
    Ok(Json(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    JournalRepository::new(state.conn())
        .delete_entry(org_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn post_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let entry = JournalRepository::new(state.conn())
        .post_entry(org_id, id, auth.user_id())
        .await?;
    info!(org_id = %org_id, entry_id = %id, user_id = %auth.user_id(), "journal entry posted via API");
    Ok(Json(entry))
}

async fn void_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    body: Option<Json<VoidRequest>>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let entry = JournalRepository::new(state.conn())
        .void_entry(org_id, id, auth.user_id(), request.reason)
        .await?;
    Ok(Json(entry))
}

// ============================================================================
// Fiscal periods
// ============================================================================

async fn list_fiscal_years(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let years = FiscalRepository::new(state.conn())
        .list_fiscal_years(org_id)
        .await?;
    Ok(Json(json!({ "fiscal_years": years })))
}

async fn close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let period = FiscalRepository::new(state.conn())
        .close_period(org_id, id, auth.user_id())
        .await?;
    Ok(Json(period))
}

async fn reopen_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let period = FiscalRepository::new(state.conn())
        .reopen_period(org_id, id)
        .await?;
    Ok(Json(period))
}

// ============================================================================
// Reports
// ============================================================================

async fn trial_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<ReportFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let report = ReportRepository::new(state.conn())
        .trial_balance(org_id, filter)
        .await?;
    Ok(Json(report))
}

async fn profit_loss(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<ReportFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let report = ReportRepository::new(state.conn())
        .profit_loss(org_id, filter)
        .await?;
    Ok(Json(report))
}

async fn balance_sheet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<BalanceSheetQuery>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let as_of = query
        .as_of
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let report = ReportRepository::new(state.conn())
        .balance_sheet(org_id, as_of)
        .await?;
    Ok(Json(report))
}

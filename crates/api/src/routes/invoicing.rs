//! Invoicing routes.

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
use uuid::Uuid;

use kontor_db::{
    InvoiceRepository,
    repositories::{CreateInvoiceInput, InvoiceFilter, RecordPaymentInput, UpdateInvoiceInput},
};
use kontor_shared::types::PageRequest;

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the invoicing router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{id}/send", post(send_invoice))
        .route("/invoices/{id}/payments", post(record_payment))
        .route("/invoices/{id}/cancel", post(cancel_invoice))
        .route("/invoices/check-overdue", post(check_overdue))
}

/// Query for the overdue sweep.
#[derive(Debug, Default, Deserialize)]
pub struct OverdueQuery {
    /// Reference date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<InvoiceFilter>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let invoices = InvoiceRepository::new(state.conn())
        .list_invoices(org_id, filter, &page)
        .await?;
    Ok(Json(invoices))
}

async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateInvoiceInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let invoice = InvoiceRepository::new(state.conn())
        .create_invoice(org_id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let invoice = InvoiceRepository::new(state.conn())
        .get_invoice(org_id, id)
        .await?;
    Ok(Json(invoice))
}

async fn update_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateInvoiceInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let invoice = InvoiceRepository::new(state.conn())
        .update_invoice(org_id, id, input)
        .await?;
    Ok(Json(invoice))
}

async fn delete_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    InvoiceRepository::new(state.conn())
        .delete_invoice(org_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn send_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let invoice = InvoiceRepository::new(state.conn())
        .send_invoice(org_id, id)
        .await?;
    Ok(Json(invoice))
}

async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(input): Json<RecordPaymentInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let invoice = InvoiceRepository::new(state.conn())
        .record_payment(org_id, id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn cancel_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let invoice = InvoiceRepository::new(state.conn())
        .cancel_invoice(org_id, id)
        .await?;
    Ok(Json(invoice))
}

/// POST `/invoices/check-overdue` - Flags sent invoices past their due date.
async fn check_overdue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<OverdueQuery>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let as_of = query
        .as_of
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let updated = InvoiceRepository::new(state.conn())
        .mark_overdue(Some(org_id), as_of)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}

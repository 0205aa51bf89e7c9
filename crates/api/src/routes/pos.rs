//! Point-of-sale routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use kontor_db::{
    PosRepository, entities::sea_orm_active_enums::SaleStatus, repositories::CreateSaleInput,
};
use kontor_shared::types::PageRequest;

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the point-of-sale router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/{id}", get(get_sale))
        .route("/sales/{id}/refund", post(refund_sale))
        .route("/reports/daily", get(daily_summary))
}

/// Query for listing sales.
#[derive(Debug, Default, Deserialize)]
pub struct SaleQuery {
    /// Restrict to one status.
    pub status: Option<SaleStatus>,
}

/// Query for the daily summary.
#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    /// UTC calendar day; defaults to today.
    pub date: Option<NaiveDate>,
}

async fn list_sales(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<SaleQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let sales = PosRepository::new(state.conn())
        .list_sales(org_id, query.status, &page)
        .await?;
    Ok(Json(sales))
}

/// POST `/sales` - Rings up a sale and takes the goods out of stock.
async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateSaleInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let sale = PosRepository::new(state.conn())
        .create_sale(org_id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn get_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let sale = PosRepository::new(state.conn())
        .get_sale(org_id, id)
        .await?;
    Ok(Json(sale))
}

async fn refund_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let sale = PosRepository::new(state.conn())
        .refund_sale(org_id, id)
        .await?;
    Ok(Json(sale))
}

async fn daily_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<DailyQuery>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let summary = PosRepository::new(state.conn())
        .daily_summary(org_id, date)
        .await?;
    Ok(Json(summary))
}

//! Manufacturing routes: bills of materials and production orders.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use kontor_db::{
    ManufacturingRepository,
    entities::sea_orm_active_enums::ProductionStatus,
    repositories::{CreateBomInput, CreateProductionOrderInput},
};
use kontor_shared::types::PageRequest;

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the manufacturing router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/boms", get(list_boms).post(create_bom))
        .route("/production-orders", get(list_orders).post(create_order))
        .route("/production-orders/{id}", get(get_order))
        .route("/production-orders/{id}/complete", post(complete_order))
        .route("/production-orders/{id}/cancel", post(cancel_order))
}

/// Query for listing production orders.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// Restrict to one status.
    pub status: Option<ProductionStatus>,
}

async fn list_boms(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let boms = ManufacturingRepository::new(state.conn())
        .list_boms(org_id)
        .await?;
    Ok(Json(json!({ "boms": boms })))
}

async fn create_bom(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateBomInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let bom = ManufacturingRepository::new(state.conn())
        .create_bom(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(bom)))
}

async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<OrderQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let orders = ManufacturingRepository::new(state.conn())
        .list_orders(org_id, query.status, &page)
        .await?;
    Ok(Json(orders))
}

async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateProductionOrderInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let order = ManufacturingRepository::new(state.conn())
        .create_order(org_id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let order = ManufacturingRepository::new(state.conn())
        .get_order(org_id, id)
        .await?;
    Ok(Json(order))
}

/// POST `/production-orders/{id}/complete` - Consumes components and
/// receives the finished product.
async fn complete_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let order = ManufacturingRepository::new(state.conn())
        .complete_order(org_id, id)
        .await?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let order = ManufacturingRepository::new(state.conn())
        .cancel_order(org_id, id)
        .await?;
    Ok(Json(order))
}

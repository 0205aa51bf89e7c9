//! Inventory routes: products, warehouses, stock levels and movements.

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
    InventoryRepository,
    entities::sea_orm_active_enums::MovementStatus,
    repositories::{
        AdjustStockInput, CreateMovementInput, CreateProductInput, CreateWarehouseInput,
        StockFilter, StockQuantityInput, UpdateProductInput, UpdateWarehouseInput,
    },
};
use kontor_shared::types::PageRequest;

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the inventory router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product))
        .route("/warehouses", get(list_warehouses).post(create_warehouse))
        .route("/warehouses/{id}", get(get_warehouse).put(update_warehouse))
        .route("/stock", get(list_stock))
        .route("/stock/adjust", post(adjust_stock))
        .route("/stock/reserve", post(reserve_stock))
        .route("/stock/release", post(release_stock))
        .route("/stock/valuation", get(stock_valuation))
        .route("/movements", get(list_movements).post(create_movement))
        .route("/movements/{id}", get(get_movement))
        .route("/movements/{id}/confirm", post(confirm_movement))
        .route("/movements/{id}/cancel", post(cancel_movement))
}

/// Query for the valuation report.
#[derive(Debug, Default, Deserialize)]
pub struct ValuationQuery {
    /// Restrict to one warehouse.
    pub warehouse_id: Option<Uuid>,
}

/// Query for listing movements.
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    /// Restrict to one status.
    pub status: Option<MovementStatus>,
}

// ============================================================================
// Products
// ============================================================================

async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let products = InventoryRepository::new(state.conn())
        .list_products(org_id)
        .await?;
    Ok(Json(json!({ "products": products })))
}

async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateProductInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let product = InventoryRepository::new(state.conn())
        .create_product(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let product = InventoryRepository::new(state.conn())
        .get_product(org_id, id)
        .await?;
    Ok(Json(product))
}

async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateProductInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let product = InventoryRepository::new(state.conn())
        .update_product(org_id, id, input)
        .await?;
    Ok(Json(product))
}

// ============================================================================
// Warehouses
// ============================================================================

async fn list_warehouses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let warehouses = InventoryRepository::new(state.conn())
        .list_warehouses(org_id)
        .await?;
    Ok(Json(json!({ "warehouses": warehouses })))
}

async fn create_warehouse(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateWarehouseInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let warehouse = InventoryRepository::new(state.conn())
        .create_warehouse(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

async fn get_warehouse(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let warehouse = InventoryRepository::new(state.conn())
        .get_warehouse(org_id, id)
        .await?;
    Ok(Json(warehouse))
}

async fn update_warehouse(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateWarehouseInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let warehouse = InventoryRepository::new(state.conn())
        .update_warehouse(org_id, id, input)
        .await?;
    Ok(Json(warehouse))
}

// ============================================================================
// Stock
// ============================================================================

async fn list_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<StockFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let levels = InventoryRepository::new(state.conn())
        .list_stock_levels(org_id, filter)
        .await?;
    Ok(Json(json!({ "stock_levels": levels })))
}

async fn adjust_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<AdjustStockInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let level = InventoryRepository::new(state.conn())
        .adjust_stock(org_id, input)
        .await?;
    Ok(Json(level))
}

async fn reserve_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<StockQuantityInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let level = InventoryRepository::new(state.conn())
        .reserve_stock(org_id, input)
        .await?;
    Ok(Json(level))
}

async fn release_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<StockQuantityInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let level = InventoryRepository::new(state.conn())
        .release_stock(org_id, input)
        .await?;
    Ok(Json(level))
}

async fn stock_valuation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ValuationQuery>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let valuation = InventoryRepository::new(state.conn())
        .stock_valuation(org_id, query.warehouse_id)
        .await?;
    Ok(Json(valuation))
}

// ============================================================================
// Movements
// ============================================================================

async fn list_movements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<MovementQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let movements = InventoryRepository::new(state.conn())
        .list_movements(org_id, query.status, &page)
        .await?;
    Ok(Json(movements))
}

async fn create_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateMovementInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let movement = InventoryRepository::new(state.conn())
        .create_movement(org_id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

async fn get_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let movement = InventoryRepository::new(state.conn())
        .get_movement(org_id, id)
        .await?;
    Ok(Json(movement))
}

async fn confirm_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let movement = InventoryRepository::new(state.conn())
        .confirm_movement(org_id, id, auth.user_id())
        .await?;
    Ok(Json(movement))
}

async fn cancel_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let movement = InventoryRepository::new(state.conn())
        .cancel_movement(org_id, id)
        .await?;
    Ok(Json(movement))
}

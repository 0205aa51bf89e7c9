//! HR routes: leave types, balances and requests.

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
    LeaveRepository,
    repositories::{
        AllocateBalanceInput, CreateLeaveTypeInput, LeaveBalanceFilter, LeaveRequestFilter,
        SubmitLeaveInput,
    },
};

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the HR router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leave-types", get(list_leave_types).post(create_leave_type))
        .route("/leave-balances", get(list_balances).post(allocate_balance))
        .route("/leave-balances/carry-over", post(carry_over))
        .route("/leave-requests", get(list_requests).post(submit_request))
        .route("/leave-requests/{id}/approve", post(approve_request))
        .route("/leave-requests/{id}/reject", post(reject_request))
        .route("/leave-requests/{id}/cancel", post(cancel_request))
}

/// Reviewer note on approval or rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for carrying balances into a year.
#[derive(Debug, Deserialize)]
pub struct CarryOverRequest {
    /// Source year; unused days move into the following year.
    pub year: i32,
}

async fn list_leave_types(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let leave_types = LeaveRepository::new(state.conn())
        .list_leave_types(org_id)
        .await?;
    Ok(Json(json!({ "leave_types": leave_types })))
}

async fn create_leave_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateLeaveTypeInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let leave_type = LeaveRepository::new(state.conn())
        .create_leave_type(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(leave_type)))
}

async fn list_balances(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<LeaveBalanceFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let balances = LeaveRepository::new(state.conn())
        .list_balances(org_id, filter)
        .await?;
    Ok(Json(json!({ "balances": balances })))
}

async fn allocate_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<AllocateBalanceInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let balance = LeaveRepository::new(state.conn())
        .allocate_balance(org_id, input)
        .await?;
    Ok(Json(balance))
}

async fn carry_over(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(request): Json<CarryOverRequest>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let updated = LeaveRepository::new(state.conn())
        .carry_over(org_id, request.year)
        .await?;
    Ok(Json(json!({ "carried": updated })))
}

async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<LeaveRequestFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let requests = LeaveRepository::new(state.conn())
        .list_requests(org_id, filter)
        .await?;
    Ok(Json(json!({ "leave_requests": requests })))
}

/// POST `/leave-requests` - Files a request against the employee's balance.
///
/// Any member may file; approval needs write access.
async fn submit_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<SubmitLeaveInput>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let request = LeaveRepository::new(state.conn())
        .submit_request(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn approve_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    body: Option<Json<ReviewRequest>>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let review = body.map(|Json(r)| r).unwrap_or_default();
    let request = LeaveRepository::new(state.conn())
        .approve_request(org_id, id, auth.user_id(), review.note)
        .await?;
    Ok(Json(request))
}

async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    body: Option<Json<ReviewRequest>>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let review = body.map(|Json(r)| r).unwrap_or_default();
    let request = LeaveRepository::new(state.conn())
        .reject_request(org_id, id, auth.user_id(), review.note)
        .await?;
    Ok(Json(request))
}

async fn cancel_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let request = LeaveRepository::new(state.conn())
        .cancel_request(org_id, id)
        .await?;
    Ok(Json(request))
}

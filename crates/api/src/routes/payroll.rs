//! Payroll routes: employees, settings and payroll runs.

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

use kontor_core::payroll::PayrollSettings;
use kontor_db::{
    PayrollRepository,
    entities::sea_orm_active_enums::EmployeeStatus,
    repositories::{
        CreateEmployeeInput, CreatePayrollRunInput, EmployeeAdjustment, UpdateEmployeeInput,
    },
};
use kontor_shared::types::PageRequest;

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the payroll router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/{id}", get(get_employee).put(update_employee))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/runs", get(list_runs).post(create_run))
        .route("/runs/{id}", get(get_run).delete(delete_run))
        .route("/runs/{id}/calculate", post(calculate_run))
        .route("/runs/{id}/approve", post(approve_run))
        .route("/runs/{id}/payslips", get(list_payslips))
}

/// Query for listing employees.
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    /// Restrict to one status.
    pub status: Option<EmployeeStatus>,
}

// ============================================================================
// Employees
// ============================================================================

async fn list_employees(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let employees = PayrollRepository::new(state.conn())
        .list_employees(org_id, query.status)
        .await?;
    Ok(Json(json!({ "employees": employees })))
}

async fn create_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateEmployeeInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let employee = PayrollRepository::new(state.conn())
        .create_employee(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn get_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let employee = PayrollRepository::new(state.conn())
        .get_employee(org_id, id)
        .await?;
    Ok(Json(employee))
}

async fn update_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateEmployeeInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let employee = PayrollRepository::new(state.conn())
        .update_employee(org_id, id, input)
        .await?;
    Ok(Json(employee))
}

// ============================================================================
// Settings
// ============================================================================

async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let settings = PayrollRepository::new(state.conn())
        .get_settings(org_id)
        .await?;
    Ok(Json(settings))
}

async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(settings): Json<PayrollSettings>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let settings = PayrollRepository::new(state.conn())
        .update_settings(org_id, settings)
        .await?;
    Ok(Json(settings))
}

// ============================================================================
// Runs
// ============================================================================

async fn list_runs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let runs = PayrollRepository::new(state.conn())
        .list_runs(org_id, &page)
        .await?;
    Ok(Json(runs))
}

async fn create_run(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreatePayrollRunInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let run = PayrollRepository::new(state.conn())
        .create_run(org_id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(run)))
}

async fn get_run(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let run = PayrollRepository::new(state.conn())
        .get_run(org_id, id)
        .await?;
    Ok(Json(run))
}

async fn delete_run(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    PayrollRepository::new(state.conn())
        .delete_run(org_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/runs/{id}/calculate` - Computes payslips for every active employee.
///
/// The optional body lists per-employee bonuses and deductions.
async fn calculate_run(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    body: Option<Json<Vec<EmployeeAdjustment>>>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let adjustments = body.map(|Json(a)| a).unwrap_or_default();
    let run = PayrollRepository::new(state.conn())
        .calculate_run(org_id, id, adjustments)
        .await?;
    Ok(Json(run))
}

async fn approve_run(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let run = PayrollRepository::new(state.conn())
        .approve_run(org_id, id, auth.user_id())
        .await?;
    Ok(Json(run))
}

async fn list_payslips(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let payslips = PayrollRepository::new(state.conn())
        .list_payslips(org_id, id)
        .await?;
    Ok(Json(json!({ "payslips": payslips })))
}

//! CRM routes: contacts, leads, pipelines and deals.

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
    CrmRepository,
    entities::sea_orm_active_enums::LeadStatus,
    repositories::{
        ConvertLeadInput, CreateContactInput, CreateDealInput, CreateLeadInput,
        CreatePipelineInput, DealFilter, LeadFilter,
    },
};

use super::{require_member, require_writer};
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the CRM router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/{id}", get(get_contact))
        .route("/leads", get(list_leads).post(create_lead))
        .route("/leads/{id}/status", post(update_lead_status))
        .route("/leads/{id}/convert", post(convert_lead))
        .route("/pipelines", get(list_pipelines).post(create_pipeline))
        .route("/pipelines/{id}/summary", get(pipeline_summary))
        .route("/deals", get(list_deals).post(create_deal))
        .route("/deals/{id}/stage", post(move_deal_stage))
}

/// Request body for changing a lead's status.
#[derive(Debug, Deserialize)]
pub struct LeadStatusRequest {
    /// New status.
    pub status: LeadStatus,
}

/// Request body for moving a deal.
#[derive(Debug, Deserialize)]
pub struct MoveStageRequest {
    /// Target stage in the deal's pipeline.
    pub stage_id: Uuid,
    /// Recorded when the stage closes the deal as lost.
    #[serde(default)]
    pub lost_reason: Option<String>,
}

// ============================================================================
// Contacts
// ============================================================================

async fn list_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let contacts = CrmRepository::new(state.conn())
        .list_contacts(org_id)
        .await?;
    Ok(Json(json!({ "contacts": contacts })))
}

async fn create_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateContactInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let contact = CrmRepository::new(state.conn())
        .create_contact(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn get_contact(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let contact = CrmRepository::new(state.conn())
        .get_contact(org_id, id)
        .await?;
    Ok(Json(contact))
}

// ============================================================================
// Leads
// ============================================================================

async fn list_leads(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<LeadFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let leads = CrmRepository::new(state.conn())
        .list_leads(org_id, filter)
        .await?;
    Ok(Json(json!({ "leads": leads })))
}

async fn create_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateLeadInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let lead = CrmRepository::new(state.conn())
        .create_lead(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

async fn update_lead_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<LeadStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let lead = CrmRepository::new(state.conn())
        .update_lead_status(org_id, id, request.status)
        .await?;
    Ok(Json(lead))
}

async fn convert_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    body: Option<Json<ConvertLeadInput>>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let input = body.map(|Json(i)| i).unwrap_or_default();
    let converted = CrmRepository::new(state.conn())
        .convert_lead(org_id, id, input)
        .await?;
    Ok(Json(converted))
}

// ============================================================================
// Pipelines and deals
// ============================================================================

async fn list_pipelines(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let pipelines = CrmRepository::new(state.conn())
        .list_pipelines(org_id)
        .await?;
    Ok(Json(json!({ "pipelines": pipelines })))
}

async fn create_pipeline(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreatePipelineInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let pipeline = CrmRepository::new(state.conn())
        .create_pipeline(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(pipeline)))
}

async fn pipeline_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let summary = CrmRepository::new(state.conn())
        .pipeline_summary(org_id, id)
        .await?;
    Ok(Json(summary))
}

async fn list_deals(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(filter): Query<DealFilter>,
) -> ApiResult<impl IntoResponse> {
    require_member(&state, org_id, &auth).await?;
    let deals = CrmRepository::new(state.conn())
        .list_deals(org_id, filter)
        .await?;
    Ok(Json(json!({ "deals": deals })))
}

async fn create_deal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(input): Json<CreateDealInput>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let deal = CrmRepository::new(state.conn())
        .create_deal(org_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(deal)))
}

async fn move_deal_stage(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(request): Json<MoveStageRequest>,
) -> ApiResult<impl IntoResponse> {
    require_writer(&state, org_id, &auth).await?;
    let deal = CrmRepository::new(state.conn())
        .move_deal_stage(org_id, id, request.stage_id, request.lost_reason)
        .await?;
    Ok(Json(deal))
}

//! Organization routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use kontor_db::{
    OrganizationRepository, UserRepository,
    entities::{organizations, sea_orm_active_enums::UserRole},
};
use kontor_shared::AppError;

use super::require_member;
use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the organizations router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orgs", get(list_organizations).post(create_organization))
        .route("/org/{org_id}", get(get_organization))
}

fn default_currency() -> String {
    "USD".to_string()
}

const fn default_start_month() -> u32 {
    1
}

/// Request body for creating an organization.
#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    /// ISO 4217 base currency.
    #[serde(default = "default_currency")]
    pub base_currency: String,
    /// Month the fiscal year starts in (1-12).
    #[serde(default = "default_start_month")]
    pub fiscal_year_start_month: u32,
}

/// Organization with the caller's role.
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    /// Organization.
    #[serde(flatten)]
    pub organization: organizations::Model,
    /// Caller's role.
    pub role: UserRole,
}

/// POST `/orgs` - Create an organization owned by the caller.
async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrganizationRequest>,
) -> ApiResult<impl IntoResponse> {
    let repo = OrganizationRepository::new(state.conn());

    if repo.slug_exists(&payload.slug).await? {
        return Err(AppError::Conflict(format!(
            "An organization with slug '{}' already exists",
            payload.slug
        ))
        .into());
    }
    if payload.base_currency.len() != 3 {
        return Err(AppError::Validation(
            "Base currency must be a 3-letter ISO 4217 code".to_string(),
        )
        .into());
    }

    let org = repo
        .create_with_owner(
            &payload.name,
            &payload.slug,
            &payload.base_currency,
            payload.fiscal_year_start_month,
            auth.user_id(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(org)))
}

/// GET `/orgs` - Organizations the caller belongs to.
async fn list_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let memberships: Vec<MembershipResponse> = UserRepository::new(state.conn())
        .get_user_organizations(auth.user_id())
        .await?
        .into_iter()
        .map(|(organization, membership)| MembershipResponse {
            organization,
            role: membership.role,
        })
        .collect();

    Ok(Json(json!({ "organizations": memberships })))
}

/// GET `/org/{org_id}` - Organization details.
async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let role = require_member(&state, org_id, &auth).await?;
    let organization = OrganizationRepository::new(state.conn()).get(org_id).await?;

    Ok(Json(MembershipResponse { organization, role }))
}

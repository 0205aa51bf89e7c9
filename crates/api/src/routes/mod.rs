//! API route definitions.
//!
//! Business routes live under `/org/{org_id}/...` and check the caller's
//! membership before touching data. Reads need any role; writes need
//! `accountant` or higher.

use axum::{Router, middleware};
use uuid::Uuid;

use kontor_db::{
    OrganizationRepository, entities::sea_orm_active_enums::UserRole,
    repositories::organization::role_level,
};
use kontor_shared::AppError;

use crate::{AppState, error::ApiResult, middleware::AuthUser, middleware::auth_middleware};

pub mod accounting;
pub mod crm;
pub mod erp;
pub mod health;
pub mod hr;
pub mod inventory;
pub mod invoicing;
pub mod organizations;
pub mod payroll;
pub mod pos;

/// Creates the API router with public routes and the authenticated business
/// routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let org_routes = Router::new()
        .nest("/accounting", accounting::routes())
        .nest("/invoicing", invoicing::routes())
        .nest("/inventory", inventory::routes())
        .nest("/payroll", payroll::routes())
        .nest("/hr", hr::routes())
        .nest("/crm", crm::routes())
        .nest("/erp", erp::routes())
        .nest("/pos", pos::routes());

    let protected_routes = Router::new()
        .merge(organizations::routes())
        .nest("/org/{org_id}", org_routes)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Ensures the caller belongs to the organization and returns their role.
pub(crate) async fn require_member(
    state: &AppState,
    org_id: Uuid,
    auth: &AuthUser,
) -> ApiResult<UserRole> {
    OrganizationRepository::new(state.conn())
        .get_user_membership(org_id, auth.user_id())
        .await?
        .map(|m| m.role)
        .ok_or_else(|| {
            AppError::Forbidden("You are not a member of this organization".to_string()).into()
        })
}

/// Ensures the caller holds at least `required` in the organization.
pub(crate) async fn require_role(
    state: &AppState,
    org_id: Uuid,
    auth: &AuthUser,
    required: UserRole,
) -> ApiResult<()> {
    let role = require_member(state, org_id, auth).await?;
    if role_level(role) < role_level(required) {
        return Err(AppError::Forbidden(format!(
            "This action requires the {} role or higher",
            required.as_str()
        ))
        .into());
    }
    Ok(())
}

/// Shorthand for write access.
pub(crate) async fn require_writer(
    state: &AppState,
    org_id: Uuid,
    auth: &AuthUser,
) -> ApiResult<()> {
    require_role(state, org_id, auth, UserRole::Accountant).await
}

//! Organization repository for tenancy and membership.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use kontor_core::accounting::AccountingError;

use crate::entities::{organization_users, organizations, sea_orm_active_enums::UserRole};
use crate::error::{RepoError, RepoResult};

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds an organization by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(&self.db)
            .await
    }

    /// Checks if a slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new organization with the creator as owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the start month is outside 1-12 or the insert fails.
    pub async fn create_with_owner(
        &self,
        name: &str,
        slug: &str,
        base_currency: &str,
        fiscal_year_start_month: u32,
        owner_id: Uuid,
    ) -> RepoResult<organizations::Model> {
        let start_month = i16::try_from(fiscal_year_start_month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or(AccountingError::InvalidStartMonth(fiscal_year_start_month))?;

        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let org_id = Uuid::new_v4();

        let org = organizations::ActiveModel {
            id: Set(org_id),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            base_currency: Set(base_currency.to_uppercase()),
            fiscal_year_start_month: Set(start_month),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let org = org.insert(&txn).await?;

        let org_user = organization_users::ActiveModel {
            user_id: Set(owner_id),
            organization_id: Set(org_id),
            role: Set(UserRole::Owner),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org_user.insert(&txn).await?;

        txn.commit().await?;

        info!(organization_id = %org_id, owner_id = %owner_id, "organization created");
        Ok(org)
    }

    /// Returns an organization or a not-found error.
    ///
    /// # Errors
    ///
    /// Returns an error if the organization does not exist or the query fails.
    pub async fn get(&self, id: Uuid) -> RepoResult<organizations::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(RepoError::not_found("Organization", id))
    }

    /// Adds a user to an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn add_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<organization_users::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let org_user = organization_users::ActiveModel {
            user_id: Set(user_id),
            organization_id: Set(org_id),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org_user.insert(&self.db).await
    }

    /// Gets a user's membership in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_user_membership(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<organization_users::Model>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Checks if a user is a member of an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_member(&self, org_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let count = organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Checks if a user has a specific role or higher in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn has_role(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        required_role: UserRole,
    ) -> Result<bool, DbErr> {
        let membership = self.get_user_membership(org_id, user_id).await?;

        Ok(membership.is_some_and(|m| role_level(m.role) >= role_level(required_role)))
    }
}

/// Returns the privilege level of a role (higher = more privileges).
pub const fn role_level(role: UserRole) -> u8 {
    match role {
        UserRole::Owner => 100,
        UserRole::Admin => 80,
        UserRole::Accountant => 40,
        UserRole::Viewer => 20,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_levels_are_ordered() {
        assert!(role_level(UserRole::Owner) > role_level(UserRole::Admin));
        assert!(role_level(UserRole::Admin) > role_level(UserRole::Accountant));
        assert!(role_level(UserRole::Accountant) > role_level(UserRole::Viewer));
    }
}

//! Account repository for chart of accounts database operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use kontor_core::accounting::AccountingError;

use crate::entities::{accounts, journal_lines, sea_orm_active_enums::AccountType};
use crate::error::{RepoError, RepoResult};

/// Input for creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountInput {
    /// Account code (must be unique within organization).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type (asset, liability, equity, revenue, expense).
    pub account_type: AccountType,
    /// Account description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the account is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Input for updating an account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccountInput {
    /// Account code.
    pub code: Option<String>,
    /// Account name.
    pub name: Option<String>,
    /// Account description.
    pub description: Option<String>,
    /// Account type (only while unused).
    pub account_type: Option<AccountType>,
    /// Whether the account is active.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the code already exists in the organization or
    /// the insert fails.
    pub async fn create_account(
        &self,
        organization_id: Uuid,
        input: CreateAccountInput,
    ) -> RepoResult<accounts::Model> {
        self.ensure_code_free(organization_id, &input.code, None)
            .await?;

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type),
            description: Set(input.description),
            is_active: Set(input.is_active),
            balance: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        info!(account_id = %account.id, code = %account.code, "account created");
        Ok(account)
    }

    /// Lists accounts for an organization ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        organization_id: Uuid,
        filter: AccountFilter,
    ) -> RepoResult<Vec<accounts::Model>> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .order_by_asc(accounts::Column::Code);

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type));
        }

        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        Ok(query.all(&self.db).await?)
    }

    /// Finds an account within an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the query fails.
    pub async fn get_account(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<accounts::Model> {
        accounts::Entity::find_by_id(id)
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(RepoError::not_found("Account", id))
    }

    /// Updates an account.
    ///
    /// The account type can only change while the balance is zero and no
    /// journal lines reference the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the new code is taken, or
    /// a type change is not allowed.
    pub async fn update_account(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> RepoResult<accounts::Model> {
        let account = self.get_account(organization_id, id).await?;

        if let Some(new_type) = input.account_type
            && new_type != account.account_type
            && (!account.balance.is_zero() || self.count_lines(id).await? > 0)
        {
            return Err(AccountingError::AccountTypeChangeNotAllowed.into());
        }

        if let Some(new_code) = &input.code
            && *new_code != account.code
        {
            self.ensure_code_free(organization_id, new_code, Some(id))
                .await?;
        }

        let now = chrono::Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();

        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(account_type) = input.account_type {
            active.account_type = Set(account_type);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an account that no journal line references.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing or in use.
    pub async fn delete_account(&self, organization_id: Uuid, id: Uuid) -> RepoResult<()> {
        let account = self.get_account(organization_id, id).await?;

        if self.count_lines(id).await? > 0 {
            return Err(AccountingError::AccountInUse.into());
        }

        accounts::Entity::delete_by_id(account.id)
            .exec(&self.db)
            .await?;
        info!(account_id = %id, "account deleted");
        Ok(())
    }

    async fn count_lines(&self, account_id: Uuid) -> RepoResult<u64> {
        Ok(journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?)
    }

    async fn ensure_code_free(
        &self,
        organization_id: Uuid,
        code: &str,
        except: Option<Uuid>,
    ) -> RepoResult<()> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .filter(accounts::Column::Code.eq(code));
        if let Some(id) = except {
            query = query.filter(accounts::Column::Id.ne(id));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(AccountingError::DuplicateAccountCode(code.to_string()).into());
        }
        Ok(())
    }
}

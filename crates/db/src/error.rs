//! Repository error type.

use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use kontor_core::{
    accounting::AccountingError, crm::CrmError, erp::ManufacturingError, hr::LeaveError,
    inventory::InventoryError, invoicing::InvoiceError, payroll::PayrollError, pos::PosError,
};
use kontor_shared::AppError;

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors returned by repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Row not found within the caller's organization.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested ID.
        id: Uuid,
    },

    /// A business rule from `kontor-core` rejected the operation.
    #[error(transparent)]
    Domain(AppError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepoError {
    /// Shorthand for [`RepoError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<AppError> for RepoError {
    fn from(err: AppError) -> Self {
        Self::Domain(err)
    }
}

macro_rules! domain_error {
    ($($err:ty),+ $(,)?) => {
        $(
            impl From<$err> for RepoError {
                fn from(err: $err) -> Self {
                    Self::Domain(err.into())
                }
            }
        )+
    };
}

domain_error!(
    AccountingError,
    InvoiceError,
    InventoryError,
    PayrollError,
    LeaveError,
    CrmError,
    ManufacturingError,
    PosError,
);

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => Self::not_found(entity, id),
            RepoError::Domain(app) => app,
            RepoError::Database(db) => match db.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Conflict(msg),
                Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Validation(msg),
                _ => Self::Database(db.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let app: AppError = RepoError::not_found("Invoice", Uuid::nil()).into();
        assert_eq!(app.status_code(), 404);
    }

    #[test]
    fn test_domain_error_passes_through() {
        let err: RepoError = AccountingError::NotDraftForPost.into();
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 422);
        assert_eq!(app.to_string(), "Only draft entries can be posted");
    }

    #[test]
    fn test_database_error_is_server_error() {
        let err: RepoError = DbErr::Custom("boom".to_string()).into();
        let app: AppError = err.into();
        assert!(app.is_server_error());
    }
}

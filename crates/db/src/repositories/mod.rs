//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every query is scoped to an organization, and every guarded mutation runs
//! inside a single database transaction.

pub mod account;
pub mod crm;
pub mod fiscal;
pub mod inventory;
pub mod invoice;
pub mod journal;
pub mod leave;
pub mod manufacturing;
pub mod organization;
pub mod payroll;
pub mod pos;
pub mod report;
pub mod user;

pub use account::{AccountFilter, AccountRepository, CreateAccountInput, UpdateAccountInput};
pub use crm::{
    ConvertLeadInput, ConvertedLead, CreateContactInput, CreateDealInput, CreateLeadInput,
    CreatePipelineInput, CrmRepository, DealFilter, LeadFilter, PipelineWithStages,
};
pub use fiscal::{FiscalRepository, FiscalYearWithPeriods};
pub use inventory::{
    AdjustStockInput, CreateMovementInput, CreateProductInput, CreateWarehouseInput,
    InventoryRepository, MovementWithLines, StockFilter, StockLevelView, StockQuantityInput,
    StockValuation, UpdateProductInput, UpdateWarehouseInput,
};
pub use invoice::{
    CreateInvoiceInput, InvoiceFilter, InvoiceLineInput, InvoiceRepository, InvoiceWithDetails,
    RecordPaymentInput, UpdateInvoiceInput,
};
pub use journal::{
    CreateJournalEntryInput, JournalEntryFilter, JournalEntryWithLines, JournalRepository,
    UpdateJournalEntryInput,
};
pub use leave::{
    AllocateBalanceInput, CreateLeaveTypeInput, LeaveBalanceFilter, LeaveBalanceView,
    LeaveRepository, LeaveRequestFilter, SubmitLeaveInput,
};
pub use manufacturing::{
    BomWithLines, CreateBomInput, CreateProductionOrderInput, ManufacturingRepository,
};
pub use organization::OrganizationRepository;
pub use payroll::{
    CreateEmployeeInput, CreatePayrollRunInput, EmployeeAdjustment, PayrollRepository,
    PayrollRunWithPayslips, UpdateEmployeeInput,
};
pub use pos::{CreateSaleInput, PosRepository, SaleLineInput, SaleWithLines};
pub use report::{ReportFilter, ReportRepository};
pub use user::UserRepository;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};
use uuid::Uuid;

use kontor_core::numbering;
use kontor_shared::types::{PageRequest, PageResponse};

/// Returns the next sequential document number (`{prefix}-000001`) for an
/// organization.
///
/// `number_column` must hold numbers formatted by [`numbering::format_number`];
/// zero padding keeps lexical and numeric order aligned.
pub(crate) async fn next_document_number<E, C>(
    conn: &C,
    organization_column: E::Column,
    number_column: E::Column,
    organization_id: Uuid,
    prefix: &str,
) -> Result<String, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let last: Option<String> = E::find()
        .select_only()
        .column(number_column)
        .filter(organization_column.eq(organization_id))
        .order_by_desc(number_column)
        .limit(1)
        .into_tuple()
        .one(conn)
        .await?;

    Ok(numbering::next_number(prefix, last.as_deref()))
}

/// Runs a paginated select and wraps the result in a [`PageResponse`].
pub(crate) async fn fetch_page<'db, E, C>(
    conn: &'db C,
    select: Select<E>,
    page: &PageRequest,
) -> Result<PageResponse<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync + 'db,
    C: ConnectionTrait,
{
    use sea_orm::PaginatorTrait;

    let page = page.normalized();
    let paginator = select.paginate(conn, page.limit());
    let total = paginator.num_items().await?;
    let data = paginator
        .fetch_page(u64::from(page.page.saturating_sub(1)))
        .await?;

    Ok(PageResponse::new(data, page.page, page.per_page, total))
}

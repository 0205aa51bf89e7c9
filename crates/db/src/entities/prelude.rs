//! Re-exports of every entity under its table name.

pub use super::accounts::Entity as Accounts;
pub use super::bom_lines::Entity as BomLines;
pub use super::boms::Entity as Boms;
pub use super::contacts::Entity as Contacts;
pub use super::deals::Entity as Deals;
pub use super::employees::Entity as Employees;
pub use super::fiscal_periods::Entity as FiscalPeriods;
pub use super::fiscal_years::Entity as FiscalYears;
pub use super::invoice_lines::Entity as InvoiceLines;
pub use super::invoice_payments::Entity as InvoicePayments;
pub use super::invoices::Entity as Invoices;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_lines::Entity as JournalLines;
pub use super::leads::Entity as Leads;
pub use super::leave_balances::Entity as LeaveBalances;
pub use super::leave_requests::Entity as LeaveRequests;
pub use super::leave_types::Entity as LeaveTypes;
pub use super::organization_users::Entity as OrganizationUsers;
pub use super::organizations::Entity as Organizations;
pub use super::payroll_runs::Entity as PayrollRuns;
pub use super::payroll_settings::Entity as PayrollSettings;
pub use super::payslips::Entity as Payslips;
pub use super::pipeline_stages::Entity as PipelineStages;
pub use super::pipelines::Entity as Pipelines;
pub use super::pos_sale_lines::Entity as PosSaleLines;
pub use super::pos_sales::Entity as PosSales;
pub use super::production_orders::Entity as ProductionOrders;
pub use super::products::Entity as Products;
pub use super::stock_levels::Entity as StockLevels;
pub use super::stock_movement_lines::Entity as StockMovementLines;
pub use super::stock_movements::Entity as StockMovements;
pub use super::users::Entity as Users;
pub use super::warehouses::Entity as Warehouses;

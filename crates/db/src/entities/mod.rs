//! `SeaORM` entity definitions.
//!
//! One module per table; enums live in [`sea_orm_active_enums`].

pub mod prelude;

pub mod accounts;
pub mod bom_lines;
pub mod boms;
pub mod contacts;
pub mod deals;
pub mod employees;
pub mod fiscal_periods;
pub mod fiscal_years;
pub mod invoice_lines;
pub mod invoice_payments;
pub mod invoices;
pub mod journal_entries;
pub mod journal_lines;
pub mod leads;
pub mod leave_balances;
pub mod leave_requests;
pub mod leave_types;
pub mod organization_users;
pub mod organizations;
pub mod payroll_runs;
pub mod payroll_settings;
pub mod payslips;
pub mod pipeline_stages;
pub mod pipelines;
pub mod pos_sale_lines;
pub mod pos_sales;
pub mod production_orders;
pub mod products;
pub mod sea_orm_active_enums;
pub mod stock_levels;
pub mod stock_movement_lines;
pub mod stock_movements;
pub mod users;
pub mod warehouses;

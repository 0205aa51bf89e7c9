//! Core business logic for Kontor.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `accounting` - Double-entry bookkeeping, fiscal calendar and financial reports
//! - `invoicing` - Invoice line arithmetic, payments and status progression
//! - `inventory` - Weighted-average stock costing and movement planning
//! - `payroll` - Payslip deductions and employer contributions
//! - `hr` - Leave balance arithmetic
//! - `crm` - Lead conversion and deal pipeline aggregation
//! - `erp` - Bill of materials and production costing
//! - `pos` - Point-of-sale totals and tendering

pub mod accounting;
pub mod crm;
pub mod erp;
pub mod hr;
pub mod inventory;
pub mod invoicing;
pub mod numbering;
pub mod payroll;
pub mod pos;

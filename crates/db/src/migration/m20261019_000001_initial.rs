//! Initial database migration.
//!
//! Creates the enums, tables, indexes and guard triggers for every module
//! of the suite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_USERS_SQL).await?;

        // ============================================================
        // PART 3: ACCOUNTING
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(FISCAL_SQL).await?;
        db.execute_unprepared(JOURNAL_SQL).await?;

        // ============================================================
        // PART 4: INVENTORY
        // ============================================================
        db.execute_unprepared(INVENTORY_SQL).await?;

        // ============================================================
        // PART 5: CRM
        // ============================================================
        db.execute_unprepared(CRM_SQL).await?;

        // ============================================================
        // PART 6: INVOICING
        // ============================================================
        db.execute_unprepared(INVOICING_SQL).await?;

        // ============================================================
        // PART 7: PAYROLL & HR
        // ============================================================
        db.execute_unprepared(EMPLOYEES_SQL).await?;
        db.execute_unprepared(PAYROLL_SQL).await?;
        db.execute_unprepared(LEAVE_SQL).await?;

        // ============================================================
        // PART 8: MANUFACTURING & POINT OF SALE
        // ============================================================
        db.execute_unprepared(MANUFACTURING_SQL).await?;
        db.execute_unprepared(POS_SQL).await?;

        // ============================================================
        // PART 9: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('owner', 'admin', 'accountant', 'viewer');

CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'revenue', 'expense');
CREATE TYPE journal_status AS ENUM ('draft', 'posted', 'voided');
CREATE TYPE fiscal_status AS ENUM ('open', 'closed');

CREATE TYPE invoice_status AS ENUM (
    'draft',
    'sent',
    'partially_paid',
    'paid',
    'overdue',
    'cancelled'
);

CREATE TYPE movement_type AS ENUM ('receipt', 'issue', 'transfer', 'adjustment');
CREATE TYPE movement_status AS ENUM ('draft', 'confirmed', 'cancelled');

CREATE TYPE employee_status AS ENUM ('active', 'on_leave', 'terminated');
CREATE TYPE payroll_status AS ENUM ('draft', 'calculated', 'approved');
CREATE TYPE leave_status AS ENUM ('pending', 'approved', 'rejected', 'cancelled');

CREATE TYPE lead_status AS ENUM ('new', 'contacted', 'qualified', 'converted', 'lost');
CREATE TYPE deal_status AS ENUM ('open', 'won', 'lost');

CREATE TYPE production_status AS ENUM ('draft', 'completed', 'cancelled');

CREATE TYPE payment_method AS ENUM ('cash', 'card', 'other');
CREATE TYPE sale_status AS ENUM ('completed', 'refunded');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL UNIQUE,
    base_currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    fiscal_year_start_month SMALLINT NOT NULL DEFAULT 1
        CHECK (fiscal_year_start_month BETWEEN 1 AND 12),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATION_USERS_SQL: &str = r"
CREATE TABLE organization_users (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    role user_role NOT NULL DEFAULT 'viewer',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, organization_id)
);

CREATE INDEX idx_org_users_org ON organization_users(organization_id);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_account_code UNIQUE (organization_id, code)
);

CREATE INDEX idx_accounts_org_type ON accounts(organization_id, account_type);
";

const FISCAL_SQL: &str = r"
CREATE TABLE fiscal_years (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status fiscal_status NOT NULL DEFAULT 'open',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_fiscal_year_start UNIQUE (organization_id, start_date),
    CONSTRAINT chk_fiscal_year_dates CHECK (end_date > start_date)
);

CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE CASCADE,
    name VARCHAR(50) NOT NULL,
    period_number SMALLINT NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status fiscal_status NOT NULL DEFAULT 'open',
    closed_by UUID REFERENCES users(id),
    closed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_fiscal_period_number UNIQUE (fiscal_year_id, period_number),
    CONSTRAINT chk_fiscal_period_dates CHECK (end_date >= start_date)
);

CREATE INDEX idx_fiscal_periods_dates ON fiscal_periods(organization_id, start_date, end_date);
";

const JOURNAL_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    entry_number VARCHAR(20) NOT NULL,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    reference VARCHAR(100),
    status journal_status NOT NULL DEFAULT 'draft',
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id),
    total_debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_by UUID NOT NULL REFERENCES users(id),
    posted_by UUID REFERENCES users(id),
    posted_at TIMESTAMPTZ,
    voided_by UUID REFERENCES users(id),
    voided_at TIMESTAMPTZ,
    void_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_journal_entry_number UNIQUE (organization_id, entry_number)
);

CREATE INDEX idx_journal_entries_org_date ON journal_entries(organization_id, entry_date);
CREATE INDEX idx_journal_entries_status ON journal_entries(organization_id, status);

CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    description TEXT,
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    currency VARCHAR(3) NOT NULL,
    exchange_rate NUMERIC(19, 10) NOT NULL DEFAULT 1,
    base_debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    base_credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_journal_line_side CHECK (
        (debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0)
    ),
    CONSTRAINT chk_journal_line_rate CHECK (exchange_rate > 0)
);

CREATE INDEX idx_journal_lines_entry ON journal_lines(journal_entry_id);
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const INVENTORY_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    sku VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    unit VARCHAR(20) NOT NULL DEFAULT 'unit',
    sale_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_product_sku UNIQUE (organization_id, sku),
    CONSTRAINT chk_product_price CHECK (sale_price >= 0)
);

CREATE TABLE warehouses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    address TEXT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_warehouse_code UNIQUE (organization_id, code)
);

CREATE TABLE stock_levels (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    warehouse_id UUID NOT NULL REFERENCES warehouses(id) ON DELETE CASCADE,
    quantity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    reserved NUMERIC(19, 4) NOT NULL DEFAULT 0,
    average_cost NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_stock_level UNIQUE (product_id, warehouse_id),
    CONSTRAINT chk_stock_non_negative CHECK (quantity >= 0 AND reserved >= 0),
    CONSTRAINT chk_stock_reserved CHECK (reserved <= quantity)
);

CREATE INDEX idx_stock_levels_org ON stock_levels(organization_id, warehouse_id);

CREATE TABLE stock_movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    movement_number VARCHAR(20) NOT NULL,
    movement_type movement_type NOT NULL,
    source_warehouse_id UUID REFERENCES warehouses(id),
    destination_warehouse_id UUID REFERENCES warehouses(id),
    status movement_status NOT NULL DEFAULT 'draft',
    movement_date DATE NOT NULL,
    reference VARCHAR(100),
    notes TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    confirmed_by UUID REFERENCES users(id),
    confirmed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_movement_number UNIQUE (organization_id, movement_number)
);

CREATE TABLE stock_movement_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    movement_id UUID NOT NULL REFERENCES stock_movements(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    quantity NUMERIC(19, 4) NOT NULL CHECK (quantity > 0),
    unit_cost NUMERIC(19, 4) CHECK (unit_cost >= 0)
);

CREATE INDEX idx_movement_lines_movement ON stock_movement_lines(movement_id);
";

const CRM_SQL: &str = r"
CREATE TABLE leads (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    company VARCHAR(255),
    source VARCHAR(100),
    status lead_status NOT NULL DEFAULT 'new',
    estimated_value NUMERIC(19, 4),
    converted_contact_id UUID,
    converted_deal_id UUID,
    converted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_leads_org_status ON leads(organization_id, status);

CREATE TABLE contacts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100),
    email VARCHAR(255),
    phone VARCHAR(50),
    company VARCHAR(255),
    lead_id UUID REFERENCES leads(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_contacts_org ON contacts(organization_id);

CREATE TABLE pipelines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    is_default BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX uq_pipeline_default ON pipelines(organization_id) WHERE is_default;

CREATE TABLE pipeline_stages (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    pipeline_id UUID NOT NULL REFERENCES pipelines(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    position INTEGER NOT NULL,
    probability INTEGER NOT NULL CHECK (probability BETWEEN 0 AND 100),
    is_won BOOLEAN NOT NULL DEFAULT false,
    is_lost BOOLEAN NOT NULL DEFAULT false,

    CONSTRAINT uq_stage_position UNIQUE (pipeline_id, position),
    CONSTRAINT chk_stage_flags CHECK (NOT (is_won AND is_lost))
);

CREATE TABLE deals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    value NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (value >= 0),
    currency VARCHAR(3) NOT NULL,
    pipeline_id UUID NOT NULL REFERENCES pipelines(id),
    stage_id UUID NOT NULL REFERENCES pipeline_stages(id),
    contact_id UUID REFERENCES contacts(id) ON DELETE SET NULL,
    probability INTEGER NOT NULL,
    status deal_status NOT NULL DEFAULT 'open',
    expected_close_date DATE,
    closed_at TIMESTAMPTZ,
    lost_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_deals_pipeline ON deals(organization_id, pipeline_id);
";

const INVOICING_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    invoice_number VARCHAR(20) NOT NULL,
    contact_id UUID REFERENCES contacts(id) ON DELETE SET NULL,
    customer_name VARCHAR(255) NOT NULL,
    customer_email VARCHAR(255),
    issue_date DATE NOT NULL,
    due_date DATE NOT NULL,
    currency VARCHAR(3) NOT NULL,
    status invoice_status NOT NULL DEFAULT 'draft',
    subtotal NUMERIC(19, 4) NOT NULL DEFAULT 0,
    discount_total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    tax_total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    amount_paid NUMERIC(19, 4) NOT NULL DEFAULT 0,
    amount_due NUMERIC(19, 4) NOT NULL DEFAULT 0,
    notes TEXT,
    sent_at TIMESTAMPTZ,
    paid_at TIMESTAMPTZ,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_invoice_number UNIQUE (organization_id, invoice_number),
    CONSTRAINT chk_invoice_due CHECK (amount_due = total - amount_paid)
);

CREATE INDEX idx_invoices_org_status ON invoices(organization_id, status);
CREATE INDEX idx_invoices_due ON invoices(status, due_date);

CREATE TABLE invoice_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    description TEXT NOT NULL,
    product_id UUID REFERENCES products(id) ON DELETE SET NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    discount_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    tax_rate NUMERIC(7, 4) NOT NULL DEFAULT 0,
    gross NUMERIC(19, 4) NOT NULL,
    discount NUMERIC(19, 4) NOT NULL,
    tax NUMERIC(19, 4) NOT NULL,
    line_total NUMERIC(19, 4) NOT NULL
);

CREATE INDEX idx_invoice_lines_invoice ON invoice_lines(invoice_id);

CREATE TABLE invoice_payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    payment_date DATE NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    method VARCHAR(50),
    reference VARCHAR(100),
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_invoice_payments_invoice ON invoice_payments(invoice_id);
";

const EMPLOYEES_SQL: &str = r"
CREATE TABLE employees (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    employee_number VARCHAR(20) NOT NULL,
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    email VARCHAR(255),
    department VARCHAR(100),
    position VARCHAR(100),
    hire_date DATE NOT NULL,
    base_salary NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (base_salary >= 0),
    allowances NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (allowances >= 0),
    status employee_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_employee_number UNIQUE (organization_id, employee_number)
);

CREATE INDEX idx_employees_org_status ON employees(organization_id, status);
";

const PAYROLL_SQL: &str = r"
CREATE TABLE payroll_settings (
    organization_id UUID PRIMARY KEY REFERENCES organizations(id) ON DELETE CASCADE,
    income_tax_rate NUMERIC(7, 4) NOT NULL,
    tax_free_allowance NUMERIC(19, 4) NOT NULL,
    pension_rate NUMERIC(7, 4) NOT NULL,
    health_insurance_rate NUMERIC(7, 4) NOT NULL,
    employer_pension_rate NUMERIC(7, 4) NOT NULL,
    employer_health_rate NUMERIC(7, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE payroll_runs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    pay_date DATE NOT NULL,
    status payroll_status NOT NULL DEFAULT 'draft',
    employee_count INTEGER NOT NULL DEFAULT 0,
    total_gross NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_deductions NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_net NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_employer_contributions NUMERIC(19, 4) NOT NULL DEFAULT 0,
    snapshot JSONB,
    created_by UUID NOT NULL REFERENCES users(id),
    approved_by UUID REFERENCES users(id),
    approved_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_payroll_period CHECK (period_end >= period_start)
);

CREATE INDEX idx_payroll_runs_org ON payroll_runs(organization_id, period_start DESC);

CREATE TABLE payslips (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    payroll_run_id UUID NOT NULL REFERENCES payroll_runs(id) ON DELETE CASCADE,
    employee_id UUID NOT NULL REFERENCES employees(id),
    base_salary NUMERIC(19, 4) NOT NULL,
    allowances NUMERIC(19, 4) NOT NULL,
    bonus NUMERIC(19, 4) NOT NULL,
    gross NUMERIC(19, 4) NOT NULL,
    pension NUMERIC(19, 4) NOT NULL,
    health_insurance NUMERIC(19, 4) NOT NULL,
    taxable_income NUMERIC(19, 4) NOT NULL,
    income_tax NUMERIC(19, 4) NOT NULL,
    other_deductions NUMERIC(19, 4) NOT NULL,
    total_deductions NUMERIC(19, 4) NOT NULL,
    net NUMERIC(19, 4) NOT NULL,
    employer_pension NUMERIC(19, 4) NOT NULL,
    employer_health NUMERIC(19, 4) NOT NULL,
    employer_total NUMERIC(19, 4) NOT NULL,

    CONSTRAINT uq_payslip_employee UNIQUE (payroll_run_id, employee_id)
);
";

const LEAVE_SQL: &str = r"
CREATE TABLE leave_types (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(100) NOT NULL,
    default_days NUMERIC(7, 2) NOT NULL DEFAULT 0 CHECK (default_days >= 0),
    is_paid BOOLEAN NOT NULL DEFAULT true,
    max_carry_over NUMERIC(7, 2) NOT NULL DEFAULT 0 CHECK (max_carry_over >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_leave_type_code UNIQUE (organization_id, code)
);

CREATE TABLE leave_balances (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    leave_type_id UUID NOT NULL REFERENCES leave_types(id) ON DELETE CASCADE,
    year INTEGER NOT NULL,
    entitled NUMERIC(7, 2) NOT NULL DEFAULT 0,
    taken NUMERIC(7, 2) NOT NULL DEFAULT 0,
    pending NUMERIC(7, 2) NOT NULL DEFAULT 0,
    carried_over NUMERIC(7, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_leave_balance UNIQUE (employee_id, leave_type_id, year)
);

CREATE TABLE leave_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    leave_type_id UUID NOT NULL REFERENCES leave_types(id),
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    days NUMERIC(7, 2) NOT NULL CHECK (days > 0),
    reason TEXT,
    status leave_status NOT NULL DEFAULT 'pending',
    reviewed_by UUID REFERENCES users(id),
    reviewed_at TIMESTAMPTZ,
    review_note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_leave_dates CHECK (end_date >= start_date)
);

CREATE INDEX idx_leave_requests_employee ON leave_requests(organization_id, employee_id);
";

const MANUFACTURING_SQL: &str = r"
CREATE TABLE boms (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    name VARCHAR(255) NOT NULL,
    output_quantity NUMERIC(19, 4) NOT NULL CHECK (output_quantity > 0),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE bom_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    bom_id UUID NOT NULL REFERENCES boms(id) ON DELETE CASCADE,
    component_id UUID NOT NULL REFERENCES products(id),
    quantity NUMERIC(19, 4) NOT NULL CHECK (quantity > 0)
);

CREATE TABLE production_orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    order_number VARCHAR(20) NOT NULL,
    bom_id UUID NOT NULL REFERENCES boms(id),
    product_id UUID NOT NULL REFERENCES products(id),
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    quantity NUMERIC(19, 4) NOT NULL CHECK (quantity > 0),
    status production_status NOT NULL DEFAULT 'draft',
    unit_cost NUMERIC(19, 4),
    created_by UUID NOT NULL REFERENCES users(id),
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_production_order_number UNIQUE (organization_id, order_number)
);
";

const POS_SQL: &str = r"
CREATE TABLE pos_sales (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    sale_number VARCHAR(20) NOT NULL,
    warehouse_id UUID NOT NULL REFERENCES warehouses(id),
    contact_id UUID REFERENCES contacts(id) ON DELETE SET NULL,
    subtotal NUMERIC(19, 4) NOT NULL,
    discount_total NUMERIC(19, 4) NOT NULL,
    tax_total NUMERIC(19, 4) NOT NULL,
    total NUMERIC(19, 4) NOT NULL,
    payment_method payment_method NOT NULL,
    amount_tendered NUMERIC(19, 4) NOT NULL,
    change_due NUMERIC(19, 4) NOT NULL,
    status sale_status NOT NULL DEFAULT 'completed',
    sold_by UUID NOT NULL REFERENCES users(id),
    sold_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    refunded_at TIMESTAMPTZ,

    CONSTRAINT uq_sale_number UNIQUE (organization_id, sale_number)
);

CREATE INDEX idx_pos_sales_org_sold ON pos_sales(organization_id, sold_at);

CREATE TABLE pos_sale_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    sale_id UUID NOT NULL REFERENCES pos_sales(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    quantity NUMERIC(19, 4) NOT NULL CHECK (quantity > 0),
    unit_price NUMERIC(19, 4) NOT NULL,
    discount_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    tax_rate NUMERIC(7, 4) NOT NULL DEFAULT 0,
    unit_cost NUMERIC(19, 4) NOT NULL,
    gross NUMERIC(19, 4) NOT NULL,
    discount NUMERIC(19, 4) NOT NULL,
    tax NUMERIC(19, 4) NOT NULL,
    line_total NUMERIC(19, 4) NOT NULL
);

CREATE INDEX idx_pos_sale_lines_sale ON pos_sale_lines(sale_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_posted_journal_modification
-- Posted entries may only move to voided; voided entries are frozen
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_journal_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'posted' AND NEW.status <> 'voided' THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry';
    END IF;

    IF OLD.status = 'voided' THEN
        RAISE EXCEPTION 'Cannot modify voided journal entry';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_journal_mod
BEFORE UPDATE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_journal_modification();

-- ============================================================
-- FUNCTION: prevent_approved_payroll_modification
-- Approved payroll runs are frozen
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_approved_payroll_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'approved' THEN
        RAISE EXCEPTION 'Cannot modify approved payroll run';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_approved_payroll_mod
BEFORE UPDATE ON payroll_runs
FOR EACH ROW
EXECUTE FUNCTION prevent_approved_payroll_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TRIGGER IF EXISTS trg_prevent_approved_payroll_mod ON payroll_runs;
DROP TRIGGER IF EXISTS trg_prevent_posted_journal_mod ON journal_entries;
DROP FUNCTION IF EXISTS prevent_approved_payroll_modification();
DROP FUNCTION IF EXISTS prevent_posted_journal_modification();

DROP TABLE IF EXISTS pos_sale_lines CASCADE;
DROP TABLE IF EXISTS pos_sales CASCADE;
DROP TABLE IF EXISTS production_orders CASCADE;
DROP TABLE IF EXISTS bom_lines CASCADE;
DROP TABLE IF EXISTS boms CASCADE;
DROP TABLE IF EXISTS leave_requests CASCADE;
DROP TABLE IF EXISTS leave_balances CASCADE;
DROP TABLE IF EXISTS leave_types CASCADE;
DROP TABLE IF EXISTS payslips CASCADE;
DROP TABLE IF EXISTS payroll_runs CASCADE;
DROP TABLE IF EXISTS payroll_settings CASCADE;
DROP TABLE IF EXISTS employees CASCADE;
DROP TABLE IF EXISTS invoice_payments CASCADE;
DROP TABLE IF EXISTS invoice_lines CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS deals CASCADE;
DROP TABLE IF EXISTS pipeline_stages CASCADE;
DROP TABLE IF EXISTS pipelines CASCADE;
DROP TABLE IF EXISTS contacts CASCADE;
DROP TABLE IF EXISTS leads CASCADE;
DROP TABLE IF EXISTS stock_movement_lines CASCADE;
DROP TABLE IF EXISTS stock_movements CASCADE;
DROP TABLE IF EXISTS stock_levels CASCADE;
DROP TABLE IF EXISTS warehouses CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;
DROP TABLE IF EXISTS fiscal_years CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS organization_users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP TYPE IF EXISTS sale_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS production_status;
DROP TYPE IF EXISTS deal_status;
DROP TYPE IF EXISTS lead_status;
DROP TYPE IF EXISTS leave_status;
DROP TYPE IF EXISTS payroll_status;
DROP TYPE IF EXISTS employee_status;
DROP TYPE IF EXISTS movement_status;
DROP TYPE IF EXISTS movement_type;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS fiscal_status;
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS account_type;
DROP TYPE IF EXISTS user_role;
";

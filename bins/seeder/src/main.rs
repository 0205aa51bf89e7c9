//! Database seeder for Kontor development and testing.
//!
//! Seeds a demo owner and organization with a small chart of accounts, a
//! warehouse with products, a sales pipeline, leave types and employees, then
//! prints a bearer token for the owner.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use kontor_core::crm::StageInput;
use kontor_db::{
    AccountRepository, CrmRepository, InventoryRepository, LeaveRepository,
    OrganizationRepository, PayrollRepository, UserRepository,
    entities::sea_orm_active_enums::{AccountType, EmployeeStatus},
    repositories::{
        AdjustStockInput, AllocateBalanceInput, CreateAccountInput, CreateEmployeeInput,
        CreateLeaveTypeInput, CreatePipelineInput, CreateProductInput, CreateWarehouseInput,
    },
};
use kontor_shared::{JwtConfig, JwtService};
use sea_orm::DatabaseConnection;

const DEMO_EMAIL: &str = "owner@kontor.dev";
const DEMO_SLUG: &str = "demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("KONTOR__DATABASE__URL"))
        .context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = kontor_db::connect(&database_url).await?;

    let orgs = OrganizationRepository::new(db.clone());
    if orgs.slug_exists(DEMO_SLUG).await? {
        println!("Demo organization already exists, nothing to seed.");
        return Ok(());
    }

    println!("Seeding demo owner...");
    let users = UserRepository::new(db.clone());
    let owner = match users.find_by_email(DEMO_EMAIL).await? {
        Some(user) => user,
        None => users.create(DEMO_EMAIL, "Demo Owner").await?,
    };

    println!("Seeding demo organization...");
    let org = orgs
        .create_with_owner("Demo Company", DEMO_SLUG, "USD", 1, owner.id)
        .await?;

    println!("Seeding chart of accounts...");
    seed_accounts(&db, org.id).await?;

    println!("Seeding inventory...");
    seed_inventory(&db, org.id).await?;

    println!("Seeding sales pipeline...");
    seed_pipeline(&db, org.id).await?;

    println!("Seeding employees and leave...");
    seed_people(&db, org.id).await?;

    let secret = std::env::var("KONTOR__JWT__SECRET")
        .unwrap_or_else(|_| JwtConfig::default().secret);
    let jwt = JwtService::new(JwtConfig {
        secret,
        access_token_expires_secs: 30 * 24 * 3600,
    });
    let token = jwt.generate_access_token(owner.id, org.id, "owner")?;

    println!("Seeding complete!");
    println!("  Organization: {} ({})", org.name, org.id);
    println!("  Owner token:  {token}");
    Ok(())
}

async fn seed_accounts(db: &DatabaseConnection, org_id: Uuid) -> anyhow::Result<()> {
    let accounts = [
        ("1000", "Cash", AccountType::Asset),
        ("1100", "Accounts Receivable", AccountType::Asset),
        ("1200", "Inventory", AccountType::Asset),
        ("2000", "Accounts Payable", AccountType::Liability),
        ("2100", "Sales Tax Payable", AccountType::Liability),
        ("3000", "Owner's Equity", AccountType::Equity),
        ("4000", "Sales Revenue", AccountType::Revenue),
        ("5000", "Cost of Goods Sold", AccountType::Expense),
        ("6000", "Salaries Expense", AccountType::Expense),
        ("6100", "Rent Expense", AccountType::Expense),
    ];

    let repo = AccountRepository::new(db.clone());
    for (code, name, account_type) in accounts {
        repo.create_account(
            org_id,
            CreateAccountInput {
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                description: None,
                is_active: true,
            },
        )
        .await?;
    }
    println!("  Created {} accounts", accounts.len());
    Ok(())
}

async fn seed_inventory(db: &DatabaseConnection, org_id: Uuid) -> anyhow::Result<()> {
    let repo = InventoryRepository::new(db.clone());
    let warehouse = repo
        .create_warehouse(
            org_id,
            CreateWarehouseInput {
                code: "MAIN".to_string(),
                name: "Main Warehouse".to_string(),
                address: None,
                is_active: true,
            },
        )
        .await?;

    let products = [
        ("WIDGET-001", "Widget", dec!(12.50), dec!(100), dec!(6.00)),
        ("GADGET-001", "Gadget", dec!(45.00), dec!(40), dec!(22.75)),
        ("BOLT-M6", "M6 Bolt", dec!(0.25), dec!(1000), dec!(0.08)),
    ];

    for (sku, name, price, quantity, unit_cost) in products {
        let product = repo
            .create_product(
                org_id,
                CreateProductInput {
                    sku: sku.to_string(),
                    name: name.to_string(),
                    description: None,
                    unit: "pcs".to_string(),
                    sale_price: price,
                    is_active: true,
                },
            )
            .await?;
        repo.adjust_stock(
            org_id,
            AdjustStockInput {
                product_id: product.id,
                warehouse_id: warehouse.id,
                quantity,
                unit_cost: Some(unit_cost),
            },
        )
        .await?;
    }
    println!("  Created warehouse {} with {} products", warehouse.code, products.len());
    Ok(())
}

async fn seed_pipeline(db: &DatabaseConnection, org_id: Uuid) -> anyhow::Result<()> {
    let stage = |name: &str, probability: i32, is_won: bool, is_lost: bool| StageInput {
        name: name.to_string(),
        probability,
        is_won,
        is_lost,
    };

    let pipeline = CrmRepository::new(db.clone())
        .create_pipeline(
            org_id,
            CreatePipelineInput {
                name: "Sales".to_string(),
                is_default: true,
                stages: vec![
                    stage("Qualification", 10, false, false),
                    stage("Proposal", 40, false, false),
                    stage("Negotiation", 70, false, false),
                    stage("Won", 100, true, false),
                    stage("Lost", 0, false, true),
                ],
            },
        )
        .await?;
    println!("  Created pipeline {} with {} stages", pipeline.pipeline.name, pipeline.stages.len());
    Ok(())
}

async fn seed_people(db: &DatabaseConnection, org_id: Uuid) -> anyhow::Result<()> {
    let leave = LeaveRepository::new(db.clone());
    let annual = leave
        .create_leave_type(
            org_id,
            CreateLeaveTypeInput {
                code: "ANNUAL".to_string(),
                name: "Annual Leave".to_string(),
                default_days: dec!(20),
                is_paid: true,
                max_carry_over: dec!(5),
            },
        )
        .await?;
    leave
        .create_leave_type(
            org_id,
            CreateLeaveTypeInput {
                code: "SICK".to_string(),
                name: "Sick Leave".to_string(),
                default_days: dec!(10),
                is_paid: true,
                max_carry_over: dec!(0),
            },
        )
        .await?;

    let employees = [
        ("EMP-001", "Alex", "Rivera", "Finance", dec!(5200)),
        ("EMP-002", "Sam", "Okafor", "Operations", dec!(4100)),
    ];

    let payroll = PayrollRepository::new(db.clone());
    let year = Utc::now().year();
    let hire_date = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid hire date")?;

    for (number, first_name, last_name, department, salary) in employees {
        let employee = payroll
            .create_employee(
                org_id,
                CreateEmployeeInput {
                    employee_number: number.to_string(),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email: None,
                    department: Some(department.to_string()),
                    position: None,
                    hire_date,
                    base_salary: salary,
                    allowances: dec!(0),
                    status: EmployeeStatus::Active,
                },
            )
            .await?;
        leave
            .allocate_balance(
                org_id,
                AllocateBalanceInput {
                    employee_id: employee.id,
                    leave_type_id: annual.id,
                    year,
                    entitled: None,
                    carried_over: None,
                },
            )
            .await?;
    }
    println!("  Created {} employees with {year} annual leave", employees.len());
    Ok(())
}

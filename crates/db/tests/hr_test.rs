//! Integration tests for payroll runs and leave requests.

mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use kontor_db::{
    LeaveRepository, PayrollRepository, RepoError,
    entities::sea_orm_active_enums::{EmployeeStatus, LeaveStatus, PayrollStatus},
    repositories::{
        AllocateBalanceInput, CreateEmployeeInput, CreateLeaveTypeInput, CreatePayrollRunInput,
        EmployeeAdjustment, LeaveBalanceFilter, LeaveBalanceView, SubmitLeaveInput,
    },
};

use common::TestOrg;

async fn employee(t: &TestOrg, number: &str, salary: Decimal, status: EmployeeStatus) -> Uuid {
    PayrollRepository::new(t.db.clone())
        .create_employee(
            t.org_id,
            CreateEmployeeInput {
                employee_number: number.to_string(),
                first_name: "Test".to_string(),
                last_name: number.to_string(),
                email: None,
                department: None,
                position: None,
                hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                base_salary: salary,
                allowances: dec!(200),
                status,
            },
        )
        .await
        .expect("Failed to create employee")
        .id
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_payroll_run_covers_active_employees() {
    let Some(t) = common::setup().await else {
        return;
    };
    let active = employee(&t, "E-1", dec!(5000), EmployeeStatus::Active).await;
    employee(&t, "E-2", dec!(4000), EmployeeStatus::Terminated).await;
    let repo = PayrollRepository::new(t.db.clone());

    let run = repo
        .create_run(
            t.org_id,
            t.user_id,
            CreatePayrollRunInput {
                name: "March 2026".to_string(),
                period_start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                period_end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
                pay_date: None,
            },
        )
        .await
        .expect("Failed to create run");
    assert_eq!(run.status, PayrollStatus::Draft);

    let calculated = repo
        .calculate_run(
            t.org_id,
            run.id,
            vec![EmployeeAdjustment {
                employee_id: active,
                bonus: dec!(300),
                other_deductions: dec!(50),
            }],
        )
        .await
        .expect("Failed to calculate run");
    assert_eq!(calculated.run.status, PayrollStatus::Calculated);
    assert_eq!(calculated.payslips.len(), 1);

    let slip = &calculated.payslips[0];
    assert_eq!(slip.employee_id, active);
    assert_eq!(slip.gross, dec!(5500));
    assert_eq!(slip.net, slip.gross - slip.total_deductions);
    assert_eq!(calculated.run.total_net, slip.net);

    let approved = repo
        .approve_run(t.org_id, run.id, t.user_id)
        .await
        .expect("Failed to approve run");
    assert_eq!(approved.run.status, PayrollStatus::Approved);
    assert!(approved.run.snapshot.is_some());

    let err = repo
        .calculate_run(t.org_id, run.id, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "approved run recalculated: {err}");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_leave_request_moves_days_through_balance() {
    let Some(t) = common::setup().await else {
        return;
    };
    let emp = employee(&t, "E-1", dec!(5000), EmployeeStatus::Active).await;
    let repo = LeaveRepository::new(t.db.clone());

    let annual = repo
        .create_leave_type(
            t.org_id,
            CreateLeaveTypeInput {
                code: "ANNUAL".to_string(),
                name: "Annual leave".to_string(),
                default_days: dec!(10),
                is_paid: true,
                max_carry_over: dec!(5),
            },
        )
        .await
        .expect("Failed to create leave type");

    // Monday to the following Tuesday: 7 working days
    let request = repo
        .submit_request(
            t.org_id,
            SubmitLeaveInput {
                employee_id: emp,
                leave_type_id: annual.id,
                start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                reason: None,
            },
        )
        .await
        .expect("Failed to submit request");
    assert_eq!(request.days, dec!(7));
    assert_eq!(request.status, LeaveStatus::Pending);

    let err = repo
        .submit_request(
            t.org_id,
            SubmitLeaveInput {
                employee_id: emp,
                leave_type_id: annual.id,
                start_date: NaiveDate::from_ymd_opt(2026, 4, 6).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 4, 9).unwrap(),
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "pending days ignored: {err}");

    repo.approve_request(t.org_id, request.id, t.user_id, None)
        .await
        .expect("Failed to approve request");
    let balances = repo
        .list_balances(
            t.org_id,
            LeaveBalanceFilter {
                employee_id: Some(emp),
                year: Some(2026),
            },
        )
        .await
        .expect("Failed to list balances");
    assert_eq!(balances[0].balance.taken, dec!(7));
    assert_eq!(balances[0].balance.pending, Decimal::ZERO);
    assert_eq!(balances[0].remaining, dec!(3));

    let cancelled = repo
        .cancel_request(t.org_id, request.id)
        .await
        .expect("Failed to cancel request");
    assert_eq!(cancelled.status, LeaveStatus::Cancelled);
    let balances = repo
        .list_balances(
            t.org_id,
            LeaveBalanceFilter {
                employee_id: Some(emp),
                year: Some(2026),
            },
        )
        .await
        .expect("Failed to list balances");
    assert_eq!(balances[0].remaining, dec!(10));
}

async fn balance_for(t: &TestOrg, employee_id: Uuid, year: i32) -> LeaveBalanceView {
    LeaveRepository::new(t.db.clone())
        .list_balances(
            t.org_id,
            LeaveBalanceFilter {
                employee_id: Some(employee_id),
                year: Some(year),
            },
        )
        .await
        .expect("Failed to list balances")
        .into_iter()
        .next()
        .expect("Balance missing")
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_carry_over_caps_and_replaces() {
    let Some(t) = common::setup().await else {
        return;
    };
    let busy = employee(&t, "E-1", dec!(5000), EmployeeStatus::Active).await;
    let idle = employee(&t, "E-2", dec!(4000), EmployeeStatus::Active).await;
    let repo = LeaveRepository::new(t.db.clone());

    let annual = repo
        .create_leave_type(
            t.org_id,
            CreateLeaveTypeInput {
                code: "ANNUAL".to_string(),
                name: "Annual leave".to_string(),
                default_days: dec!(10),
                is_paid: true,
                max_carry_over: dec!(5),
            },
        )
        .await
        .expect("Failed to create leave type");

    // Monday and Tuesday
    let request = repo
        .submit_request(
            t.org_id,
            SubmitLeaveInput {
                employee_id: busy,
                leave_type_id: annual.id,
                start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
                reason: None,
            },
        )
        .await
        .expect("Failed to submit request");
    repo.approve_request(t.org_id, request.id, t.user_id, None)
        .await
        .expect("Failed to approve request");

    repo.allocate_balance(
        t.org_id,
        AllocateBalanceInput {
            employee_id: idle,
            leave_type_id: annual.id,
            year: 2025,
            entitled: Some(dec!(3)),
            carried_over: None,
        },
    )
    .await
    .expect("Failed to allocate 2025");
    repo.allocate_balance(
        t.org_id,
        AllocateBalanceInput {
            employee_id: idle,
            leave_type_id: annual.id,
            year: 2026,
            entitled: Some(dec!(12)),
            carried_over: None,
        },
    )
    .await
    .expect("Failed to allocate 2026");

    let carried = repo.carry_over(t.org_id, 2025).await.expect("Failed to carry over");
    assert_eq!(carried, 2);

    // 8 unused, capped at 5
    let next = balance_for(&t, busy, 2026).await;
    assert_eq!(next.balance.entitled, dec!(10));
    assert_eq!(next.balance.carried_over, dec!(5));
    assert_eq!(next.remaining, dec!(15));

    let next = balance_for(&t, idle, 2026).await;
    assert_eq!(next.balance.entitled, dec!(12));
    assert_eq!(next.balance.carried_over, dec!(3));

    repo.carry_over(t.org_id, 2025).await.expect("Failed to re-run carry over");
    assert_eq!(balance_for(&t, busy, 2026).await.balance.carried_over, dec!(5));
    assert_eq!(balance_for(&t, idle, 2026).await.remaining, dec!(15));
}

//! Integration tests for journal posting, voiding and reports.

mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use uuid::Uuid;

use kontor_core::accounting::JournalLineInput;
use kontor_db::{
    FiscalRepository, JournalRepository, RepoError, ReportRepository,
    entities::{
        accounts,
        sea_orm_active_enums::{AccountType, FiscalStatus, JournalStatus},
    },
    repositories::{CreateJournalEntryInput, ReportFilter},
};

use common::TestOrg;

fn line(account_id: Uuid, debit: Decimal, credit: Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id,
        description: None,
        debit,
        credit,
        currency: None,
        exchange_rate: None,
    }
}

fn entry(date: NaiveDate, lines: Vec<JournalLineInput>) -> CreateJournalEntryInput {
    CreateJournalEntryInput {
        entry_date: date,
        description: "Test entry".to_string(),
        reference: None,
        lines,
    }
}

async fn balance(t: &TestOrg, account_id: Uuid) -> Decimal {
    accounts::Entity::find_by_id(account_id)
        .one(&t.db)
        .await
        .expect("Failed to load account")
        .expect("Account missing")
        .balance
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_post_and_void_move_balances() {
    let Some(t) = common::setup().await else {
        return;
    };
    let cash = t.account("1000", AccountType::Asset).await;
    let sales = t.account("4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(t.db.clone());
    let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    let draft = repo
        .create_entry(
            t.org_id,
            t.user_id,
            entry(date, vec![line(cash, dec!(250), dec!(0)), line(sales, dec!(0), dec!(250))]),
        )
        .await
        .expect("Failed to create entry");
    assert_eq!(draft.entry.entry_number, "JE-000001");
    assert_eq!(draft.lines.len(), 2);
    assert_eq!(balance(&t, cash).await, Decimal::ZERO);

    let posted = repo
        .post_entry(t.org_id, draft.entry.id, t.user_id)
        .await
        .expect("Failed to post entry");
    assert_eq!(posted.entry.status, JournalStatus::Posted);
    assert_eq!(balance(&t, cash).await, dec!(250));
    assert_eq!(balance(&t, sales).await, dec!(250));

    let voided = repo
        .void_entry(t.org_id, draft.entry.id, t.user_id, Some("duplicate".to_string()))
        .await
        .expect("Failed to void entry");
    assert_eq!(voided.entry.status, JournalStatus::Voided);
    assert_eq!(balance(&t, cash).await, Decimal::ZERO);
    assert_eq!(balance(&t, sales).await, Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unbalanced_draft_cannot_be_posted() {
    let Some(t) = common::setup().await else {
        return;
    };
    let cash = t.account("1000", AccountType::Asset).await;
    let sales = t.account("4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(t.db.clone());
    let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    let draft = repo
        .create_entry(
            t.org_id,
            t.user_id,
            entry(date, vec![line(cash, dec!(100), dec!(0)), line(sales, dec!(0), dec!(90))]),
        )
        .await
        .expect("Unbalanced drafts are allowed");

    let err = repo
        .post_entry(t.org_id, draft.entry.id, t.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "unexpected error: {err}");
    assert_eq!(balance(&t, cash).await, Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_closed_period_blocks_posting() {
    let Some(t) = common::setup().await else {
        return;
    };
    let cash = t.account("1000", AccountType::Asset).await;
    let sales = t.account("4000", AccountType::Revenue).await;
    let journals = JournalRepository::new(t.db.clone());
    let fiscal = FiscalRepository::new(t.db.clone());
    let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();

    let draft = journals
        .create_entry(
            t.org_id,
            t.user_id,
            entry(date, vec![line(cash, dec!(80), dec!(0)), line(sales, dec!(0), dec!(80))]),
        )
        .await
        .expect("Failed to create entry");

    let years = fiscal.list_fiscal_years(t.org_id).await.unwrap();
    assert_eq!(years.len(), 1);
    assert_eq!(years[0].periods.len(), 12);
    let january = years[0].periods[0].id;
    let february = years[0].periods[1].id;
    assert_eq!(draft.entry.fiscal_period_id, january);

    let err = fiscal.close_period(t.org_id, february, t.user_id).await.unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "closed out of order: {err}");

    let closed = fiscal
        .close_period(t.org_id, january, t.user_id)
        .await
        .expect("Failed to close period");
    assert_eq!(closed.status, FiscalStatus::Closed);
    assert_eq!(closed.closed_by, Some(t.user_id));

    let err = journals
        .post_entry(t.org_id, draft.entry.id, t.user_id)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Fiscal period is closed, no posting allowed");
    assert_eq!(balance(&t, cash).await, Decimal::ZERO);

    fiscal
        .close_period(t.org_id, february, t.user_id)
        .await
        .expect("Failed to close February");
    let err = fiscal.reopen_period(t.org_id, january).await.unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "reopened under a closed period: {err}");

    fiscal.reopen_period(t.org_id, february).await.unwrap();
    let reopened = fiscal.reopen_period(t.org_id, january).await.unwrap();
    assert_eq!(reopened.status, FiscalStatus::Open);
    assert_eq!(reopened.closed_by, None);

    journals
        .post_entry(t.org_id, draft.entry.id, t.user_id)
        .await
        .expect("Failed to post after reopening");
    assert_eq!(balance(&t, cash).await, dec!(80));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_trial_balance_after_postings() {
    let Some(t) = common::setup().await else {
        return;
    };
    let cash = t.account("1000", AccountType::Asset).await;
    let rent = t.account("6000", AccountType::Expense).await;
    let sales = t.account("4000", AccountType::Revenue).await;
    let journal = JournalRepository::new(t.db.clone());
    let date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();

    for lines in [
        vec![line(cash, dec!(1000), dec!(0)), line(sales, dec!(0), dec!(1000))],
        vec![line(rent, dec!(400), dec!(0)), line(cash, dec!(0), dec!(400))],
    ] {
        let draft = journal
            .create_entry(t.org_id, t.user_id, entry(date, lines))
            .await
            .expect("Failed to create entry");
        journal
            .post_entry(t.org_id, draft.entry.id, t.user_id)
            .await
            .expect("Failed to post entry");
    }

    let reports = ReportRepository::new(t.db.clone());
    let tb = reports
        .trial_balance(t.org_id, ReportFilter::default())
        .await
        .expect("Failed to build trial balance");
    assert!(tb.totals.is_balanced);
    assert_eq!(tb.totals.total_debit, dec!(1400));

    let pl = reports
        .profit_loss(t.org_id, ReportFilter::default())
        .await
        .expect("Failed to build profit and loss");
    assert_eq!(pl.net_income, dec!(600));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_postings_keep_balances_exact() {
    let Some(t) = common::setup().await else {
        return;
    };
    let cash = t.account("1000", AccountType::Asset).await;
    let sales = t.account("4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(t.db.clone());
    let date = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();

    const ENTRIES: usize = 25;
    let mut ids = Vec::with_capacity(ENTRIES);
    for _ in 0..ENTRIES {
        let draft = repo
            .create_entry(
                t.org_id,
                t.user_id,
                entry(date, vec![line(cash, dec!(10), dec!(0)), line(sales, dec!(0), dec!(10))]),
            )
            .await
            .expect("Failed to create entry");
        ids.push(draft.entry.id);
    }

    let mut tasks = tokio::task::JoinSet::new();
    for id in ids {
        let repo = repo.clone();
        let (org_id, user_id) = (t.org_id, t.user_id);
        tasks.spawn(async move { repo.post_entry(org_id, id, user_id).await });
    }

    let mut posted = 0_i64;
    while let Some(result) = tasks.join_next().await {
        if result.expect("Task panicked").is_ok() {
            posted += 1;
        }
    }

    assert_eq!(posted, ENTRIES as i64);
    assert_eq!(balance(&t, cash).await, dec!(10) * Decimal::from(posted));
    assert_eq!(balance(&t, sales).await, dec!(10) * Decimal::from(posted));
}

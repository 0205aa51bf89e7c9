//! Integration tests for leads, pipelines and deals.

mod common;

use rust_decimal_macros::dec;

use kontor_core::crm::StageInput;
use kontor_db::{
    CrmRepository, RepoError,
    entities::sea_orm_active_enums::{DealStatus, LeadStatus},
    repositories::{ConvertLeadInput, CreateLeadInput, CreatePipelineInput},
};

fn stage(name: &str, probability: i32, is_won: bool, is_lost: bool) -> StageInput {
    StageInput {
        name: name.to_string(),
        probability,
        is_won,
        is_lost,
    }
}

fn sales_pipeline() -> CreatePipelineInput {
    CreatePipelineInput {
        name: "Sales".to_string(),
        is_default: false,
        stages: vec![
            stage("Prospect", 10, false, false),
            stage("Proposal", 50, false, false),
            stage("Won", 100, true, false),
            stage("Lost", 0, false, true),
        ],
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_lead_conversion_opens_deal_in_default_pipeline() {
    let Some(t) = common::setup().await else {
        return;
    };
    let repo = CrmRepository::new(t.db.clone());

    let pipeline = repo
        .create_pipeline(t.org_id, sales_pipeline())
        .await
        .expect("Failed to create pipeline");
    assert!(pipeline.pipeline.is_default, "first pipeline becomes default");
    assert_eq!(pipeline.stages.len(), 4);

    let lead = repo
        .create_lead(
            t.org_id,
            CreateLeadInput {
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.com".to_string()),
                phone: None,
                company: Some("Analytical Engines".to_string()),
                source: Some("referral".to_string()),
                estimated_value: Some(dec!(5000)),
            },
        )
        .await
        .expect("Failed to create lead");

    let converted = repo
        .convert_lead(
            t.org_id,
            lead.id,
            ConvertLeadInput {
                create_deal: true,
                ..ConvertLeadInput::default()
            },
        )
        .await
        .expect("Failed to convert lead");

    assert_eq!(converted.lead.status, LeadStatus::Converted);
    assert_eq!(converted.contact.first_name, "Ada");
    assert_eq!(converted.contact.last_name.as_deref(), Some("Lovelace"));
    assert_eq!(converted.contact.lead_id, Some(lead.id));
    let deal = converted.deal.expect("deal requested");
    assert_eq!(deal.value, dec!(5000));
    assert_eq!(deal.stage_id, pipeline.stages[0].id);
    assert_eq!(deal.probability, 10);
    assert_eq!(deal.status, DealStatus::Open);

    let err = repo
        .convert_lead(t.org_id, lead.id, ConvertLeadInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "converted twice: {err}");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_winning_deal_closes_it_and_updates_summary() {
    let Some(t) = common::setup().await else {
        return;
    };
    let repo = CrmRepository::new(t.db.clone());
    let pipeline = repo
        .create_pipeline(t.org_id, sales_pipeline())
        .await
        .expect("Failed to create pipeline");

    let lead = repo
        .create_lead(
            t.org_id,
            CreateLeadInput {
                name: "Grace Hopper".to_string(),
                email: None,
                phone: None,
                company: None,
                source: None,
                estimated_value: Some(dec!(2000)),
            },
        )
        .await
        .expect("Failed to create lead");
    let deal = repo
        .convert_lead(
            t.org_id,
            lead.id,
            ConvertLeadInput {
                create_deal: true,
                ..ConvertLeadInput::default()
            },
        )
        .await
        .expect("Failed to convert lead")
        .deal
        .expect("deal requested");

    let proposal = repo
        .move_deal_stage(t.org_id, deal.id, pipeline.stages[1].id, None)
        .await
        .expect("Failed to move deal");
    assert_eq!(proposal.probability, 50);

    let summary = repo
        .pipeline_summary(t.org_id, pipeline.pipeline.id)
        .await
        .expect("Failed to summarize");
    assert_eq!(summary.open_count, 1);
    assert_eq!(summary.total_weighted_value, dec!(1000));

    let won = repo
        .move_deal_stage(t.org_id, deal.id, pipeline.stages[2].id, None)
        .await
        .expect("Failed to win deal");
    assert_eq!(won.status, DealStatus::Won);
    assert!(won.closed_at.is_some());

    let err = repo
        .move_deal_stage(t.org_id, deal.id, pipeline.stages[0].id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Domain(_)), "closed deal moved: {err}");

    let summary = repo
        .pipeline_summary(t.org_id, pipeline.pipeline.id)
        .await
        .expect("Failed to summarize");
    assert_eq!(summary.open_count, 0);
    assert_eq!(summary.won_count, 1);
    assert_eq!(summary.won_value, dec!(2000));
}

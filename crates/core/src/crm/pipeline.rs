//! Deal pipelines: stage moves and weighted summaries.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::CrmError;

/// Deal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    /// In progress.
    Open,
    /// Closed successfully.
    Won,
    /// Closed unsuccessfully.
    Lost,
}

/// Stage definition supplied when creating a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInput {
    /// Stage name.
    pub name: String,
    /// Win probability (0-100).
    pub probability: i32,
    /// Reaching this stage wins the deal.
    #[serde(default)]
    pub is_won: bool,
    /// Reaching this stage loses the deal.
    #[serde(default)]
    pub is_lost: bool,
}

/// A stored stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInfo {
    /// Stage ID.
    pub id: Uuid,
    /// Owning pipeline.
    pub pipeline_id: Uuid,
    /// Order within the pipeline.
    pub position: i32,
    /// Win probability (0-100).
    pub probability: i32,
    /// Won stage.
    pub is_won: bool,
    /// Lost stage.
    pub is_lost: bool,
}

/// Effect of moving a deal into a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMove {
    /// Probability copied from the stage.
    pub probability: i32,
    /// Deal status after the move.
    pub status: DealStatus,
}

/// The deal fields a summary needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealSnapshot {
    /// Current stage.
    pub stage_id: Uuid,
    /// Deal value.
    pub value: Decimal,
    /// Current probability.
    pub probability: i32,
    /// Deal status.
    pub status: DealStatus,
}

/// Per-stage summary over open deals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    /// Stage ID.
    pub stage_id: Uuid,
    /// Open deals in the stage.
    pub deal_count: i64,
    /// Σ value.
    pub total_value: Decimal,
    /// Σ value × probability / 100.
    pub weighted_value: Decimal,
}

/// Pipeline summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Per-stage rows in stage order.
    pub stages: Vec<StageSummary>,
    /// Open deals.
    pub open_count: i64,
    /// Σ value of open deals.
    pub total_value: Decimal,
    /// Σ weighted value of open deals.
    pub total_weighted_value: Decimal,
    /// Won deals.
    pub won_count: i64,
    /// Σ value of won deals.
    pub won_value: Decimal,
    /// Lost deals.
    pub lost_count: i64,
}

/// Pipeline rules.
pub struct PipelineService;

impl PipelineService {
    /// Validates the stages of a new pipeline.
    pub fn validate_stages(stages: &[StageInput]) -> Result<(), CrmError> {
        if stages.is_empty() {
            return Err(CrmError::NoStages);
        }
        for stage in stages {
            if !(0..=100).contains(&stage.probability) {
                return Err(CrmError::InvalidProbability(stage.probability));
            }
            if stage.is_won && stage.is_lost {
                return Err(CrmError::InvalidStageFlags);
            }
        }
        Ok(())
    }

    /// Returns the first stage by position.
    #[must_use]
    pub fn first_stage(stages: &[StageInfo]) -> Option<&StageInfo> {
        stages.iter().min_by_key(|s| s.position)
    }

    /// Computes the effect of entering `stage`. Won/lost stages close the deal.
    #[must_use]
    pub fn enter_stage(stage: &StageInfo) -> StageMove {
        let status = if stage.is_won {
            DealStatus::Won
        } else if stage.is_lost {
            DealStatus::Lost
        } else {
            DealStatus::Open
        };
        StageMove {
            probability: stage.probability,
            status,
        }
    }

    /// Validates and computes a stage move for an existing deal.
    pub fn move_deal(
        deal_status: DealStatus,
        deal_pipeline_id: Uuid,
        stage: &StageInfo,
    ) -> Result<StageMove, CrmError> {
        if deal_status != DealStatus::Open {
            return Err(CrmError::DealClosed);
        }
        if stage.pipeline_id != deal_pipeline_id {
            return Err(CrmError::StageNotInPipeline);
        }
        Ok(Self::enter_stage(stage))
    }

    /// Weighted value of a deal.
    #[must_use]
    pub fn weighted_value(value: Decimal, probability: i32) -> Decimal {
        value * Decimal::from(probability) / Decimal::ONE_HUNDRED
    }

    /// Summarizes a pipeline. Only open deals count toward stage rows and
    /// the open totals.
    #[must_use]
    pub fn summarize(stages: &[StageInfo], deals: &[DealSnapshot]) -> PipelineSummary {
        let mut ordered: Vec<&StageInfo> = stages.iter().collect();
        ordered.sort_by_key(|s| s.position);

        let mut rows: HashMap<Uuid, StageSummary> = ordered
            .iter()
            .map(|s| {
                (
                    s.id,
                    StageSummary {
                        stage_id: s.id,
                        deal_count: 0,
                        total_value: Decimal::ZERO,
                        weighted_value: Decimal::ZERO,
                    },
                )
            })
            .collect();

        let mut summary = PipelineSummary {
            stages: Vec::new(),
            open_count: 0,
            total_value: Decimal::ZERO,
            total_weighted_value: Decimal::ZERO,
            won_count: 0,
            won_value: Decimal::ZERO,
            lost_count: 0,
        };

        for deal in deals {
            match deal.status {
                DealStatus::Open => {
                    let weighted = Self::weighted_value(deal.value, deal.probability);
                    summary.open_count += 1;
                    summary.total_value += deal.value;
                    summary.total_weighted_value += weighted;
                    if let Some(row) = rows.get_mut(&deal.stage_id) {
                        row.deal_count += 1;
                        row.total_value += deal.value;
                        row.weighted_value += weighted;
                    }
                }
                DealStatus::Won => {
                    summary.won_count += 1;
                    summary.won_value += deal.value;
                }
                DealStatus::Lost => summary.lost_count += 1,
            }
        }

        summary.stages = ordered
            .iter()
            .filter_map(|s| rows.remove(&s.id))
            .collect();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stage(pipeline_id: Uuid, position: i32, probability: i32) -> StageInfo {
        StageInfo {
            id: Uuid::new_v4(),
            pipeline_id,
            position,
            probability,
            is_won: false,
            is_lost: false,
        }
    }

    #[test]
    fn test_validate_stages() {
        let ok = StageInput {
            name: "Lead".into(),
            probability: 10,
            is_won: false,
            is_lost: false,
        };
        assert!(PipelineService::validate_stages(std::slice::from_ref(&ok)).is_ok());
        assert!(matches!(PipelineService::validate_stages(&[]), Err(CrmError::NoStages)));

        let bad = StageInput {
            probability: 150,
            ..ok.clone()
        };
        assert!(matches!(
            PipelineService::validate_stages(&[bad]),
            Err(CrmError::InvalidProbability(150))
        ));

        let both = StageInput {
            is_won: true,
            is_lost: true,
            ..ok
        };
        assert!(matches!(
            PipelineService::validate_stages(&[both]),
            Err(CrmError::InvalidStageFlags)
        ));
    }

    #[test]
    fn test_move_deal() {
        let pipeline = Uuid::new_v4();
        let mut won = stage(pipeline, 3, 100);
        won.is_won = true;

        let mv = PipelineService::move_deal(DealStatus::Open, pipeline, &stage(pipeline, 2, 60))
            .unwrap();
        assert_eq!(mv.probability, 60);
        assert_eq!(mv.status, DealStatus::Open);

        let mv = PipelineService::move_deal(DealStatus::Open, pipeline, &won).unwrap();
        assert_eq!(mv.status, DealStatus::Won);

        assert!(matches!(
            PipelineService::move_deal(DealStatus::Won, pipeline, &won),
            Err(CrmError::DealClosed)
        ));
        assert!(matches!(
            PipelineService::move_deal(DealStatus::Open, Uuid::new_v4(), &won),
            Err(CrmError::StageNotInPipeline)
        ));
    }

    #[test]
    fn test_first_stage() {
        let pipeline = Uuid::new_v4();
        let stages = vec![stage(pipeline, 2, 50), stage(pipeline, 1, 10)];
        assert_eq!(PipelineService::first_stage(&stages).unwrap().position, 1);
        assert!(PipelineService::first_stage(&[]).is_none());
    }

    #[test]
    fn test_summary_counts_open_deals_only() {
        let pipeline = Uuid::new_v4();
        let s1 = stage(pipeline, 1, 20);
        let s2 = stage(pipeline, 2, 50);
        let deals = vec![
            DealSnapshot { stage_id: s1.id, value: dec!(1000), probability: 20, status: DealStatus::Open },
            DealSnapshot { stage_id: s2.id, value: dec!(500), probability: 50, status: DealStatus::Open },
            DealSnapshot { stage_id: s2.id, value: dec!(9000), probability: 100, status: DealStatus::Won },
            DealSnapshot { stage_id: s1.id, value: dec!(300), probability: 0, status: DealStatus::Lost },
        ];

        let summary = PipelineService::summarize(&[s2, s1], &deals);
        assert_eq!(summary.stages[0].stage_id, s1.id);
        assert_eq!(summary.stages[0].weighted_value, dec!(200));
        assert_eq!(summary.stages[1].deal_count, 1);
        assert_eq!(summary.open_count, 2);
        assert_eq!(summary.total_value, dec!(1500));
        assert_eq!(summary.total_weighted_value, dec!(450));
        assert_eq!(summary.won_count, 1);
        assert_eq!(summary.won_value, dec!(9000));
        assert_eq!(summary.lost_count, 1);
    }
}

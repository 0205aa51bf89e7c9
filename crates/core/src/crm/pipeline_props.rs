//! Property-based tests for pipeline summaries.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::pipeline::{DealSnapshot, DealStatus, PipelineService, StageInfo};

fn status() -> impl Strategy<Value = DealStatus> {
    prop_oneof![Just(DealStatus::Open), Just(DealStatus::Won), Just(DealStatus::Lost)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Total weighted value is the sum of value × probability / 100 over open
    /// deals, and equals the sum of the stage rows.
    #[test]
    fn prop_weighted_total_over_open_deals(
        deals in prop::collection::vec((0usize..3, 0i64..10_000_000, 0i32..=100, status()), 0..20),
    ) {
        let pipeline = Uuid::new_v4();
        let stages: Vec<StageInfo> = (0..3)
            .map(|i| StageInfo {
                id: Uuid::new_v4(),
                pipeline_id: pipeline,
                position: i,
                probability: 0,
                is_won: false,
                is_lost: false,
            })
            .collect();
        let snapshots: Vec<DealSnapshot> = deals
            .iter()
            .map(|&(idx, cents, probability, status)| DealSnapshot {
                stage_id: stages[idx].id,
                value: Decimal::new(cents, 2),
                probability,
                status,
            })
            .collect();

        let summary = PipelineService::summarize(&stages, &snapshots);

        let expected: Decimal = snapshots
            .iter()
            .filter(|d| d.status == DealStatus::Open)
            .map(|d| PipelineService::weighted_value(d.value, d.probability))
            .sum();
        prop_assert_eq!(summary.total_weighted_value, expected);

        let from_rows: Decimal = summary.stages.iter().map(|s| s.weighted_value).sum();
        prop_assert_eq!(from_rows, expected);
        prop_assert!(summary.total_weighted_value <= summary.total_value);
    }
}

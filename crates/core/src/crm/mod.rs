//! CRM: leads, deals and pipelines.

pub mod error;
pub mod lead;
pub mod pipeline;

#[cfg(test)]
mod pipeline_props;

pub use error::CrmError;
pub use lead::{LeadService, LeadStatus};
pub use pipeline::{
    DealSnapshot, DealStatus, PipelineService, PipelineSummary, StageInfo, StageInput, StageMove,
    StageSummary,
};

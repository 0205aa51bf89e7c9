//! CRM repository: contacts, leads, pipelines and deals.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::crm::{
    CrmError, DealSnapshot, LeadService, PipelineService, PipelineSummary, StageInfo, StageInput,
};

use crate::entities::{
    contacts, deals, leads, organizations, pipeline_stages, pipelines,
    sea_orm_active_enums::{DealStatus, LeadStatus},
};
use crate::error::{RepoError, RepoResult};

/// Input for creating a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContactInput {
    /// First name.
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Company.
    #[serde(default)]
    pub company: Option<String>,
}

/// Input for creating a lead.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeadInput {
    /// Person or organization name.
    pub name: String,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Company.
    #[serde(default)]
    pub company: Option<String>,
    /// Where the lead came from.
    #[serde(default)]
    pub source: Option<String>,
    /// Expected deal value.
    #[serde(default)]
    pub estimated_value: Option<Decimal>,
}

/// Filter for lead listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilter {
    /// Restrict to one status.
    pub status: Option<LeadStatus>,
}

/// Options for converting a lead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertLeadInput {
    /// Also open a deal for the new contact.
    #[serde(default)]
    pub create_deal: bool,
    /// Deal title; defaults to the lead name.
    #[serde(default)]
    pub deal_title: Option<String>,
    /// Pipeline; defaults to the organization's default pipeline.
    #[serde(default)]
    pub pipeline_id: Option<Uuid>,
    /// Stage; defaults to the pipeline's first stage.
    #[serde(default)]
    pub stage_id: Option<Uuid>,
    /// Deal value; defaults to the lead's estimated value.
    #[serde(default)]
    pub value: Option<Decimal>,
    /// Expected close date.
    #[serde(default)]
    pub expected_close_date: Option<NaiveDate>,
}

/// Result of a lead conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedLead {
    /// Updated lead.
    pub lead: leads::Model,
    /// Contact created from the lead.
    pub contact: contacts::Model,
    /// Deal opened for the contact, when requested.
    pub deal: Option<deals::Model>,
}

/// Input for creating a pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePipelineInput {
    /// Pipeline name.
    pub name: String,
    /// Make this the organization's default pipeline.
    #[serde(default)]
    pub is_default: bool,
    /// Stages in order.
    pub stages: Vec<StageInput>,
}

/// Pipeline with its ordered stages.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineWithStages {
    /// Pipeline.
    #[serde(flatten)]
    pub pipeline: pipelines::Model,
    /// Stages ordered by position.
    pub stages: Vec<pipeline_stages::Model>,
}

/// Input for creating a deal.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDealInput {
    /// Title.
    pub title: String,
    /// Value.
    #[serde(default)]
    pub value: Decimal,
    /// Currency; defaults to the organization's base currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// Pipeline; defaults to the organization's default pipeline.
    #[serde(default)]
    pub pipeline_id: Option<Uuid>,
    /// Stage; defaults to the pipeline's first stage.
    #[serde(default)]
    pub stage_id: Option<Uuid>,
    /// Contact.
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    /// Expected close date.
    #[serde(default)]
    pub expected_close_date: Option<NaiveDate>,
}

/// Filter for deal listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealFilter {
    /// Restrict to one pipeline.
    pub pipeline_id: Option<Uuid>,
    /// Restrict to one stage.
    pub stage_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<DealStatus>,
}

/// CRM repository.
#[derive(Debug, Clone)]
pub struct CrmRepository {
    db: DatabaseConnection,
}

impl CrmRepository {
    /// Creates a new CRM repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    /// Creates a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_contact(
        &self,
        organization_id: Uuid,
        input: CreateContactInput,
    ) -> RepoResult<contacts::Model> {
        let contact = insert_contact(&self.db, organization_id, input, None).await?;
        info!(contact_id = %contact.id, "contact created");
        Ok(contact)
    }

    /// Lists contacts by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_contacts(&self, organization_id: Uuid) -> RepoResult<Vec<contacts::Model>> {
        Ok(contacts::Entity::find()
            .filter(contacts::Column::OrganizationId.eq(organization_id))
            .order_by_asc(contacts::Column::FirstName)
            .order_by_asc(contacts::Column::LastName)
            .all(&self.db)
            .await?)
    }

    /// Finds a contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the contact does not exist or the query fails.
    pub async fn get_contact(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<contacts::Model> {
        contacts::Entity::find_by_id(id)
            .filter(contacts::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(RepoError::not_found("Contact", id))
    }

    // ------------------------------------------------------------------
    // Leads
    // ------------------------------------------------------------------

    /// Creates a lead with status `new`.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimated value is negative or the insert
    /// fails.
    pub async fn create_lead(
        &self,
        organization_id: Uuid,
        input: CreateLeadInput,
    ) -> RepoResult<leads::Model> {
        if input.estimated_value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(CrmError::NegativeValue.into());
        }

        let now = chrono::Utc::now().into();
        let lead = leads::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            company: Set(input.company),
            source: Set(input.source),
            status: Set(LeadStatus::New),
            estimated_value: Set(input.estimated_value),
            converted_contact_id: Set(None),
            converted_deal_id: Set(None),
            converted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(lead_id = %lead.id, "lead created");
        Ok(lead)
    }

    /// Lists leads, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_leads(
        &self,
        organization_id: Uuid,
        filter: LeadFilter,
    ) -> RepoResult<Vec<leads::Model>> {
        let mut query = leads::Entity::find()
            .filter(leads::Column::OrganizationId.eq(organization_id))
            .order_by_desc(leads::Column::CreatedAt);
        if let Some(status) = filter.status {
            query = query.filter(leads::Column::Status.eq(status));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Changes a lead's status. Conversion has its own operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the change involves `converted`.
    pub async fn update_lead_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        status: LeadStatus,
    ) -> RepoResult<leads::Model> {
        let lead = find_lead(&self.db, organization_id, id).await?;
        LeadService::validate_status_change(lead.status.into(), status.into())?;

        let mut active: leads::ActiveModel = lead.into();
        active.status = Set(status);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Converts a lead into a contact and, optionally, a deal.
    ///
    /// # Errors
    ///
    /// Returns an error if the lead is converted or lost, or a requested
    /// deal has no usable pipeline or stage.
    pub async fn convert_lead(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: ConvertLeadInput,
    ) -> RepoResult<ConvertedLead> {
        let txn = self.db.begin().await?;

        let lead = leads::Entity::find_by_id(id)
            .filter(leads::Column::OrganizationId.eq(organization_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepoError::not_found("Lead", id))?;
        if let Err(err) = LeadService::validate_convert(lead.status.into()) {
            warn!(lead_id = %id, error = %err, "lead conversion rejected");
            return Err(err.into());
        }

        let (first_name, last_name) = split_name(&lead.name);
        let contact = insert_contact(
            &txn,
            organization_id,
            CreateContactInput {
                first_name,
                last_name,
                email: lead.email.clone(),
                phone: lead.phone.clone(),
                company: lead.company.clone(),
            },
            Some(lead.id),
        )
        .await?;

        let deal = if input.create_deal {
            let deal = insert_deal(
                &txn,
                organization_id,
                CreateDealInput {
                    title: input.deal_title.unwrap_or_else(|| lead.name.clone()),
                    value: input
                        .value
                        .or(lead.estimated_value)
                        .unwrap_or_default(),
                    currency: None,
                    pipeline_id: input.pipeline_id,
                    stage_id: input.stage_id,
                    contact_id: Some(contact.id),
                    expected_close_date: input.expected_close_date,
                },
            )
            .await?;
            Some(deal)
        } else {
            None
        };

        let now = chrono::Utc::now().into();
        let mut active: leads::ActiveModel = lead.into();
        active.status = Set(LeadStatus::Converted);
        active.converted_contact_id = Set(Some(contact.id));
        active.converted_deal_id = Set(deal.as_ref().map(|d| d.id));
        active.converted_at = Set(Some(now));
        active.updated_at = Set(now);
        let lead = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            lead_id = %id,
            contact_id = %contact.id,
            with_deal = deal.is_some(),
            "lead converted"
        );
        Ok(ConvertedLead {
            lead,
            contact,
            deal,
        })
    }

    // ------------------------------------------------------------------
    // Pipelines
    // ------------------------------------------------------------------

    /// Creates a pipeline with its stages. The organization's first
    /// pipeline becomes the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage list is empty or a stage is invalid.
    pub async fn create_pipeline(
        &self,
        organization_id: Uuid,
        input: CreatePipelineInput,
    ) -> RepoResult<PipelineWithStages> {
        PipelineService::validate_stages(&input.stages)?;

        let txn = self.db.begin().await?;

        let existing = pipelines::Entity::find()
            .filter(pipelines::Column::OrganizationId.eq(organization_id))
            .count(&txn)
            .await?;
        let is_default = input.is_default || existing == 0;

        if is_default {
            pipelines::Entity::update_many()
                .col_expr(pipelines::Column::IsDefault, Expr::value(false))
                .filter(pipelines::Column::OrganizationId.eq(organization_id))
                .exec(&txn)
                .await?;
        }

        let now = chrono::Utc::now().into();
        let pipeline = pipelines::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(input.name),
            is_default: Set(is_default),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut stages = Vec::with_capacity(input.stages.len());
        for (stage, position) in input.stages.into_iter().zip(1_i32..) {
            let model = pipeline_stages::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                pipeline_id: Set(pipeline.id),
                name: Set(stage.name),
                position: Set(position),
                probability: Set(stage.probability),
                is_won: Set(stage.is_won),
                is_lost: Set(stage.is_lost),
            }
            .insert(&txn)
            .await?;
            stages.push(model);
        }

        txn.commit().await?;

        info!(pipeline_id = %pipeline.id, stages = stages.len(), "pipeline created");
        Ok(PipelineWithStages { pipeline, stages })
    }

    /// Lists pipelines with their stages.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_pipelines(
        &self,
        organization_id: Uuid,
    ) -> RepoResult<Vec<PipelineWithStages>> {
        let pipelines = pipelines::Entity::find()
            .filter(pipelines::Column::OrganizationId.eq(organization_id))
            .order_by_desc(pipelines::Column::IsDefault)
            .order_by_asc(pipelines::Column::Name)
            .all(&self.db)
            .await?;

        let mut result = Vec::with_capacity(pipelines.len());
        for pipeline in pipelines {
            let stages = load_stages(&self.db, pipeline.id).await?;
            result.push(PipelineWithStages { pipeline, stages });
        }
        Ok(result)
    }

    /// Summarizes the deals of a pipeline by stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline does not exist or a query fails.
    pub async fn pipeline_summary(
        &self,
        organization_id: Uuid,
        pipeline_id: Uuid,
    ) -> RepoResult<PipelineSummary> {
        find_pipeline(&self.db, organization_id, pipeline_id).await?;

        let stages: Vec<StageInfo> = load_stages(&self.db, pipeline_id)
            .await?
            .iter()
            .map(stage_info)
            .collect();
        let snapshots: Vec<DealSnapshot> = deals::Entity::find()
            .filter(deals::Column::OrganizationId.eq(organization_id))
            .filter(deals::Column::PipelineId.eq(pipeline_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|d| DealSnapshot {
                stage_id: d.stage_id,
                value: d.value,
                probability: d.probability,
                status: d.status.into(),
            })
            .collect();

        Ok(PipelineService::summarize(&stages, &snapshots))
    }

    // ------------------------------------------------------------------
    // Deals
    // ------------------------------------------------------------------

    /// Creates a deal in the given or default pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or no pipeline or stage
    /// applies.
    pub async fn create_deal(
        &self,
        organization_id: Uuid,
        input: CreateDealInput,
    ) -> RepoResult<deals::Model> {
        let txn = self.db.begin().await?;
        let deal = insert_deal(&txn, organization_id, input).await?;
        txn.commit().await?;

        info!(deal_id = %deal.id, value = %deal.value, "deal created");
        Ok(deal)
    }

    /// Lists deals, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_deals(
        &self,
        organization_id: Uuid,
        filter: DealFilter,
    ) -> RepoResult<Vec<deals::Model>> {
        let mut query = deals::Entity::find()
            .filter(deals::Column::OrganizationId.eq(organization_id))
            .order_by_desc(deals::Column::CreatedAt);
        if let Some(pipeline_id) = filter.pipeline_id {
            query = query.filter(deals::Column::PipelineId.eq(pipeline_id));
        }
        if let Some(stage_id) = filter.stage_id {
            query = query.filter(deals::Column::StageId.eq(stage_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(deals::Column::Status.eq(status));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Moves an open deal to another stage of its pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the deal is closed or the stage belongs to another
    /// pipeline.
    pub async fn move_deal_stage(
        &self,
        organization_id: Uuid,
        id: Uuid,
        stage_id: Uuid,
        lost_reason: Option<String>,
    ) -> RepoResult<deals::Model> {
        let deal = deals::Entity::find_by_id(id)
            .filter(deals::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(RepoError::not_found("Deal", id))?;
        let stage = find_stage(&self.db, organization_id, stage_id).await?;

        let moved = match PipelineService::move_deal(
            deal.status.into(),
            deal.pipeline_id,
            &stage_info(&stage),
        ) {
            Ok(moved) => moved,
            Err(err) => {
                warn!(deal_id = %id, error = %err, "deal stage move rejected");
                return Err(err.into());
            }
        };

        let now = chrono::Utc::now().into();
        let status: DealStatus = moved.status.into();
        let mut active: deals::ActiveModel = deal.into();
        active.stage_id = Set(stage.id);
        active.probability = Set(moved.probability);
        active.status = Set(status);
        if status != DealStatus::Open {
            active.closed_at = Set(Some(now));
        }
        if status == DealStatus::Lost {
            active.lost_reason = Set(lost_reason);
        }
        active.updated_at = Set(now);

        let deal = active.update(&self.db).await?;
        info!(deal_id = %id, stage = %stage.name, "deal moved");
        Ok(deal)
    }
}

/// Splits a full name at the first whitespace.
fn split_name(name: &str) -> (String, Option<String>) {
    match name.trim().split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), Some(rest.trim().to_string())),
        None => (name.trim().to_string(), None),
    }
}

fn stage_info(stage: &pipeline_stages::Model) -> StageInfo {
    StageInfo {
        id: stage.id,
        pipeline_id: stage.pipeline_id,
        position: stage.position,
        probability: stage.probability,
        is_won: stage.is_won,
        is_lost: stage.is_lost,
    }
}

async fn insert_contact<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    input: CreateContactInput,
    lead_id: Option<Uuid>,
) -> RepoResult<contacts::Model> {
    let now = chrono::Utc::now().into();
    Ok(contacts::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        email: Set(input.email),
        phone: Set(input.phone),
        company: Set(input.company),
        lead_id: Set(lead_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?)
}

/// Resolves pipeline and stage defaults and inserts the deal.
async fn insert_deal(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    input: CreateDealInput,
) -> RepoResult<deals::Model> {
    if input.value < Decimal::ZERO {
        return Err(CrmError::NegativeValue.into());
    }

    let pipeline = match input.pipeline_id {
        Some(pipeline_id) => find_pipeline(txn, organization_id, pipeline_id).await?,
        None => pipelines::Entity::find()
            .filter(pipelines::Column::OrganizationId.eq(organization_id))
            .filter(pipelines::Column::IsDefault.eq(true))
            .one(txn)
            .await?
            .ok_or(CrmError::NoPipeline)?,
    };

    let stage = match input.stage_id {
        Some(stage_id) => {
            let stage = find_stage(txn, organization_id, stage_id).await?;
            if stage.pipeline_id != pipeline.id {
                return Err(CrmError::StageNotInPipeline.into());
            }
            stage
        }
        None => {
            let stages = load_stages(txn, pipeline.id).await?;
            let infos: Vec<StageInfo> = stages.iter().map(stage_info).collect();
            let first = PipelineService::first_stage(&infos).ok_or(CrmError::NoStages)?;
            stages
                .into_iter()
                .find(|s| s.id == first.id)
                .ok_or(CrmError::NoStages)?
        }
    };

    let currency = match input.currency {
        Some(currency) => currency.to_uppercase(),
        None => {
            organizations::Entity::find_by_id(organization_id)
                .one(txn)
                .await?
                .ok_or(RepoError::not_found("Organization", organization_id))?
                .base_currency
        }
    };

    let entered = PipelineService::enter_stage(&stage_info(&stage));
    let status: DealStatus = entered.status.into();
    let now = chrono::Utc::now().into();

    Ok(deals::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        title: Set(input.title),
        value: Set(input.value),
        currency: Set(currency),
        pipeline_id: Set(pipeline.id),
        stage_id: Set(stage.id),
        contact_id: Set(input.contact_id),
        probability: Set(entered.probability),
        status: Set(status),
        expected_close_date: Set(input.expected_close_date),
        closed_at: Set((status != DealStatus::Open).then_some(now)),
        lost_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?)
}

async fn find_lead<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<leads::Model> {
    leads::Entity::find_by_id(id)
        .filter(leads::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Lead", id))
}

async fn find_pipeline<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<pipelines::Model> {
    pipelines::Entity::find_by_id(id)
        .filter(pipelines::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Pipeline", id))
}

async fn find_stage<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<pipeline_stages::Model> {
    pipeline_stages::Entity::find_by_id(id)
        .filter(pipeline_stages::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Pipeline stage", id))
}

async fn load_stages<C: ConnectionTrait>(
    conn: &C,
    pipeline_id: Uuid,
) -> RepoResult<Vec<pipeline_stages::Model>> {
    Ok(pipeline_stages::Entity::find()
        .filter(pipeline_stages::Column::PipelineId.eq(pipeline_id))
        .order_by_asc(pipeline_stages::Column::Position)
        .all(conn)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("Ada Lovelace"),
            ("Ada".to_string(), Some("Lovelace".to_string()))
        );
        assert_eq!(
            split_name(" Grace  Brewster Hopper "),
            ("Grace".to_string(), Some("Brewster Hopper".to_string()))
        );
        assert_eq!(split_name("Acme"), ("Acme".to_string(), None));
    }
}

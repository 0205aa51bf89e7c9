//! Lead qualification and conversion rules.

use serde::{Deserialize, Serialize};

use super::error::CrmError;

/// Lead lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    /// Just captured.
    New,
    /// Reached out.
    Contacted,
    /// Worth pursuing.
    Qualified,
    /// Turned into a contact.
    Converted,
    /// Abandoned.
    Lost,
}

/// Lead rules.
pub struct LeadService;

impl LeadService {
    /// Validates a manual status change. `converted` is only reachable by conversion.
    pub fn validate_status_change(from: LeadStatus, to: LeadStatus) -> Result<(), CrmError> {
        if from == LeadStatus::Converted || to == LeadStatus::Converted {
            return Err(CrmError::InvalidLeadTransition);
        }
        Ok(())
    }

    /// Validates converting a lead.
    pub fn validate_convert(status: LeadStatus) -> Result<(), CrmError> {
        match status {
            LeadStatus::Converted => Err(CrmError::LeadAlreadyConverted),
            LeadStatus::Lost => Err(CrmError::LeadLost),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_changes() {
        assert!(LeadService::validate_status_change(LeadStatus::New, LeadStatus::Contacted).is_ok());
        assert!(LeadService::validate_status_change(LeadStatus::Qualified, LeadStatus::Lost).is_ok());
        assert!(LeadService::validate_status_change(LeadStatus::Lost, LeadStatus::New).is_ok());
        assert!(matches!(
            LeadService::validate_status_change(LeadStatus::New, LeadStatus::Converted),
            Err(CrmError::InvalidLeadTransition)
        ));
        assert!(matches!(
            LeadService::validate_status_change(LeadStatus::Converted, LeadStatus::New),
            Err(CrmError::InvalidLeadTransition)
        ));
    }

    #[test]
    fn test_convert_rules() {
        assert!(LeadService::validate_convert(LeadStatus::Qualified).is_ok());
        assert!(LeadService::validate_convert(LeadStatus::New).is_ok());
        assert!(matches!(
            LeadService::validate_convert(LeadStatus::Converted),
            Err(CrmError::LeadAlreadyConverted)
        ));
        assert!(matches!(
            LeadService::validate_convert(LeadStatus::Lost),
            Err(CrmError::LeadLost)
        ));
    }
}

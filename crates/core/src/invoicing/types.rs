//! Invoice domain types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Invoice status progression.
///
/// draft → sent → (partially_paid | paid), sent/partially_paid → overdue,
/// draft/sent → cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Editable, not yet issued.
    Draft,
    /// Issued to the customer.
    Sent,
    /// Some payment received.
    PartiallyPaid,
    /// Fully paid.
    Paid,
    /// Past due with a balance remaining.
    Overdue,
    /// Withdrawn.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true if payments may be recorded.
    #[must_use]
    pub fn accepts_payment(self) -> bool {
        matches!(self, Self::Sent | Self::PartiallyPaid | Self::Overdue)
    }

    /// Returns true if the overdue sweep applies.
    #[must_use]
    pub fn can_become_overdue(self) -> bool {
        matches!(self, Self::Sent | Self::PartiallyPaid)
    }

    /// Returns the snake_case name used in storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

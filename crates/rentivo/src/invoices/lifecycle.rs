//! Invoice status transitions.
//!
//! Status changes are set by the landlord. The permissive policy accepts every change. The strict
//! policy follows the billing flow only: an invoice is raised, may fall overdue, and is paid.

use serde::Serialize;

use crate::lifecycle::InvalidTransition;

use super::domain::InvoiceStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

const STRICT_TRANSITIONS: &[(InvoiceStatus, InvoiceStatus)] = &[
    (InvoiceStatus::Pending, InvoiceStatus::Paid),
    (InvoiceStatus::Pending, InvoiceStatus::Overdue),
    (InvoiceStatus::Overdue, InvoiceStatus::Paid),
    (InvoiceStatus::Overdue, InvoiceStatus::Pending),
];

impl TransitionPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" => Some(Self::Permissive),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Re-applying the current status is always accepted.
    pub fn transition(
        self,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> Result<InvoiceStatus, InvalidTransition> {
        let allowed = from == to
            || match self {
                TransitionPolicy::Permissive => true,
                TransitionPolicy::Strict => STRICT_TRANSITIONS.contains(&(from, to)),
            };

        if allowed {
            Ok(to)
        } else {
            Err(InvalidTransition {
                entity: "invoice",
                state: from.label(),
                event: mark_label(to),
            })
        }
    }
}

const fn mark_label(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Pending => "be marked Pending",
        InvoiceStatus::Paid => "be marked Paid",
        InvoiceStatus::Overdue => "be marked Overdue",
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::deserialize_optional_date;
use crate::identity::UserSummary;
use crate::ids::{InvoiceId, PropertyId, TenancyId, UserId};
use crate::properties::PropertySummary;
use crate::tenancies::Tenancy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    Rent,
    Maintenance,
    Utilities,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
        }
    }
}

/// Stored invoice. `tenant_id` references the tenancy, not the user, because one user may
/// hold tenancies on several properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub tenant_id: TenancyId,
    pub property_id: PropertyId,
    pub landlord_id: UserId,
    /// Smallest currency unit.
    pub amount: u64,
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invoice creation request. Carries no landlord field; the issuer is the owner of the
/// referenced property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub tenant_id: Option<TenancyId>,
    pub property_id: Option<PropertyId>,
    pub amount: Option<u64>,
    #[serde(rename = "type")]
    pub invoice_type: Option<InvoiceType>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusChange {
    pub status: Option<InvoiceStatus>,
}

/// Invoice joined with its references for listings and detail reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenancy: Option<Tenancy>,
    pub property: Option<PropertySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landlord: Option<UserSummary>,
}

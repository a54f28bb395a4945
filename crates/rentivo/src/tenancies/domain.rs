use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::deserialize_optional_date;
use crate::identity::UserSummary;
use crate::ids::{PropertyId, TenancyId, UserId};
use crate::properties::PropertySummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenancyStatus {
    /// Invitation sent, awaiting the invited user's answer.
    Pending,
    Active,
    /// Lease ended. Past tenancies no longer block a new invitation.
    Past,
}

impl TenancyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TenancyStatus::Pending => "Pending",
            TenancyStatus::Active => "Active",
            TenancyStatus::Past => "Past",
        }
    }

    pub const fn is_current(self) -> bool {
        !matches!(self, TenancyStatus::Past)
    }
}

/// Link between an occupying user and a property for a lease interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenancy {
    pub id: TenancyId,
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
    pub status: TenancyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Invitation request sent by a landlord.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub email: Option<String>,
    pub property_id: Option<PropertyId>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub lease_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub lease_end: Option<NaiveDate>,
}

/// Landlord-side listing entry. Joined references are `None` when the referenced document is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantView {
    #[serde(flatten)]
    pub tenancy: Tenancy,
    pub user: Option<UserSummary>,
    pub property: Option<PropertySummary>,
}

/// Tenant-side listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    #[serde(flatten)]
    pub tenancy: Tenancy,
    pub property: Option<PropertySummary>,
}

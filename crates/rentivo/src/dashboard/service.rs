use serde::Serialize;

use crate::access::Principal;
use crate::error::ServiceError;
use crate::ids::PropertyId;
use crate::store::Repositories;
use crate::tenancies::{TenancyFilter, TenancyStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordStats {
    pub properties_count: usize,
    /// Active tenancies across the landlord's properties.
    pub tenants_count: usize,
    pub pending_tenants_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStats {
    pub active_properties: usize,
    pub pending_invitations: usize,
}

/// Counts are recomputed from the repositories on every call.
pub struct DashboardService {
    repositories: Repositories,
}

impl DashboardService {
    pub fn new(repositories: Repositories) -> Self {
        Self { repositories }
    }

    pub fn landlord_stats(&self, principal: &Principal) -> Result<LandlordStats, ServiceError> {
        let property_ids: Vec<PropertyId> = self
            .repositories
            .properties
            .list_by_landlord(&principal.id)?
            .into_iter()
            .map(|property| property.id)
            .collect();
        let on_properties = TenancyFilter::for_properties(property_ids.clone());

        Ok(LandlordStats {
            properties_count: property_ids.len(),
            tenants_count: self
                .repositories
                .tenancies
                .count(&on_properties.clone().with_status(TenancyStatus::Active))?,
            pending_tenants_count: self
                .repositories
                .tenancies
                .count(&on_properties.with_status(TenancyStatus::Pending))?,
        })
    }

    pub fn tenant_stats(&self, principal: &Principal) -> Result<TenantStats, ServiceError> {
        let mine = TenancyFilter::for_user(principal.id);
        Ok(TenantStats {
            active_properties: self
                .repositories
                .tenancies
                .count(&mine.clone().with_status(TenancyStatus::Active))?,
            pending_invitations: self
                .repositories
                .tenancies
                .count(&mine.with_status(TenancyStatus::Pending))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::identity::{IdentityService, Registration, Role};
    use crate::properties::{PropertyInput, PropertyService};
    use crate::tenancies::{Invitation, TenancyService};

    fn register(identity: &IdentityService, email: &str, role: Role) -> Principal {
        let registered = identity
            .register(Registration {
                name: Some("Someone".to_string()),
                email: Some(email.to_string()),
                password: Some("secret".to_string()),
                phone: Some("0300".to_string()),
                role: Some(role.label().to_string()),
            })
            .expect("registers");
        Principal::new(registered.user.id, registered.user.role)
    }

    #[test]
    fn counts_follow_tenancy_states() {
        let repositories = Repositories::in_memory();
        let identity = IdentityService::new(repositories.users.clone());
        let properties = PropertyService::new(repositories.clone());
        let tenancies = TenancyService::new(repositories.clone());
        let dashboard = DashboardService::new(repositories);

        let landlord = register(&identity, "l@x.com", Role::Landlord);
        let first = register(&identity, "a@x.com", Role::Tenant);
        register(&identity, "b@x.com", Role::Tenant);

        let property = properties
            .create(
                &landlord,
                PropertyInput {
                    title: Some("Lakeside".to_string()),
                    address: Some("1 Shore Rd".to_string()),
                    property_type: Some("House".to_string()),
                    units: Some(2),
                    ..PropertyInput::default()
                },
            )
            .expect("property");

        let mut invited = Vec::new();
        for email in ["a@x.com", "b@x.com"] {
            invited.push(
                tenancies
                    .invite(
                        &landlord,
                        Invitation {
                            email: Some(email.to_string()),
                            property_id: Some(property.id),
                            lease_start: NaiveDate::from_ymd_opt(2024, 1, 1),
                            lease_end: NaiveDate::from_ymd_opt(2024, 12, 31),
                        },
                    )
                    .expect("invite"),
            );
        }
        tenancies.accept(&first, &invited[0].id).expect("accept");

        assert_eq!(
            dashboard.landlord_stats(&landlord).expect("stats"),
            LandlordStats {
                properties_count: 1,
                tenants_count: 1,
                pending_tenants_count: 1,
            }
        );
        assert_eq!(
            dashboard.tenant_stats(&first).expect("stats"),
            TenantStats {
                active_properties: 1,
                pending_invitations: 0,
            }
        );
    }

    #[test]
    fn empty_accounts_report_zero() {
        let dashboard = DashboardService::new(Repositories::in_memory());
        let nobody = Principal::new(crate::ids::UserId::generate(), Role::Landlord);

        let stats = dashboard.landlord_stats(&nobody).expect("stats");
        assert_eq!(stats.properties_count, 0);
        assert_eq!(stats.tenants_count, 0);

        let value = serde_json::to_value(dashboard.tenant_stats(&nobody).expect("stats"))
            .expect("serializes");
        assert_eq!(value["pendingInvitations"], 0);
    }
}

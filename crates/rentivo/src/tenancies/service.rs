use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::domain::{Invitation, InvitationView, Tenancy, TenancyStatus, TenantView};
use super::lifecycle::{self, TenancyEvent, TenancyOutcome};
use super::repository::TenancyFilter;
use crate::access::{
    authorize_property, authorize_tenancy, AccessDenied, Principal, PropertyAction, TenancyAction,
    TenancyFacts,
};
use crate::error::{non_blank, ServiceError};
use crate::identity::UserSummary;
use crate::ids::{PropertyId, TenancyId, UserId};
use crate::properties::Property;
use crate::store::{Repositories, RepositoryError};

const MISSING_FIELDS: &str = "Please fill in all fields";
const UNKNOWN_INVITEE: &str =
    "User with this email not found. Please ask tenant to register first.";
const DUPLICATE_TENANCY: &str =
    "This user already has a pending or active tenancy for this property";

/// Invitation lifecycle: landlords invite and remove, invited users accept or reject.
pub struct TenancyService {
    repositories: Repositories,
}

impl TenancyService {
    pub fn new(repositories: Repositories) -> Self {
        Self { repositories }
    }

    /// Invite a registered user to a property. The new tenancy always starts as `Pending`.
    pub fn invite(
        &self,
        principal: &Principal,
        invitation: Invitation,
    ) -> Result<Tenancy, ServiceError> {
        let missing = || ServiceError::validation(MISSING_FIELDS);
        let email = non_blank(invitation.email).ok_or_else(missing)?;
        let property_id = invitation.property_id.ok_or_else(missing)?;
        let lease_start = invitation.lease_start.ok_or_else(missing)?;
        let lease_end = invitation.lease_end.ok_or_else(missing)?;
        if lease_end < lease_start {
            return Err(ServiceError::validation(
                "Lease end must not be before lease start",
            ));
        }

        let property = self.property(&property_id)?;
        authorize_property(
            principal,
            PropertyAction::InviteTenant,
            Some(&property.landlord_id),
        )
        .map_err(|denied| denial(principal, denied))?;

        let invitee = self
            .repositories
            .users
            .find_by_email(&email)?
            .ok_or_else(|| ServiceError::not_found(UNKNOWN_INVITEE))?;

        let now = Utc::now();
        let tenancy = Tenancy {
            id: TenancyId::generate(),
            user_id: invitee.id,
            property_id: property.id,
            lease_start,
            lease_end,
            status: TenancyStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let stored = self
            .repositories
            .tenancies
            .insert_unique(tenancy)
            .map_err(|err| match err {
                RepositoryError::Conflict => ServiceError::conflict(DUPLICATE_TENANCY),
                other => ServiceError::Repository(other),
            })?;

        info!(
            tenancy_id = %stored.id,
            property_id = %stored.property_id,
            user_id = %stored.user_id,
            "tenant invited"
        );
        Ok(stored)
    }

    pub fn accept(&self, principal: &Principal, id: &TenancyId) -> Result<Tenancy, ServiceError> {
        let tenancy = self.respondable(principal, id)?;
        self.apply(tenancy, TenancyEvent::Accept)?
            .ok_or_else(|| ServiceError::not_found("Tenancy not found"))
    }

    /// Rejection deletes the invitation; nothing is archived.
    pub fn reject(&self, principal: &Principal, id: &TenancyId) -> Result<(), ServiceError> {
        let tenancy = self.respondable(principal, id)?;
        self.apply(tenancy, TenancyEvent::Reject)?;
        Ok(())
    }

    pub fn remove(&self, principal: &Principal, id: &TenancyId) -> Result<(), ServiceError> {
        let tenancy = self.tenancy(id)?;
        let owner = self
            .repositories
            .properties
            .fetch(&tenancy.property_id)?
            .map(|property| property.landlord_id);

        authorize_tenancy(
            principal,
            TenancyAction::Remove,
            TenancyFacts {
                occupant: &tenancy.user_id,
                property_owner: owner.as_ref(),
            },
        )
        .map_err(|denied| denial(principal, denied))?;

        self.apply(tenancy, TenancyEvent::Remove)?;
        Ok(())
    }

    /// Every tenancy on the caller's properties, joined with occupant and property summaries.
    pub fn list_tenants(&self, principal: &Principal) -> Result<Vec<TenantView>, ServiceError> {
        let properties = self.owned_properties(principal)?;
        let filter = TenancyFilter::for_properties(properties.keys().copied().collect());
        let tenancies = self.repositories.tenancies.find(&filter)?;

        let mut users: HashMap<UserId, Option<UserSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(tenancies.len());
        for tenancy in tenancies {
            let user = match users.get(&tenancy.user_id) {
                Some(cached) => cached.clone(),
                None => {
                    let summary = self
                        .repositories
                        .users
                        .fetch(&tenancy.user_id)?
                        .map(|user| user.summary());
                    users.insert(tenancy.user_id, summary.clone());
                    summary
                }
            };
            let property = properties
                .get(&tenancy.property_id)
                .map(Property::summary);
            views.push(TenantView {
                tenancy,
                user,
                property,
            });
        }
        Ok(views)
    }

    /// The caller's tenancies in every status, joined with the property summary.
    pub fn list_invitations(
        &self,
        principal: &Principal,
    ) -> Result<Vec<InvitationView>, ServiceError> {
        let tenancies = self
            .repositories
            .tenancies
            .find(&TenancyFilter::for_user(principal.id))?;

        tenancies
            .into_iter()
            .map(|tenancy| {
                let property = self
                    .repositories
                    .properties
                    .fetch(&tenancy.property_id)?
                    .map(|property| property.summary());
                Ok(InvitationView { tenancy, property })
            })
            .collect()
    }

    /// Move active tenancies on the caller's properties whose lease ended before `as_of` to `Past`.
    pub fn expire_leases(
        &self,
        principal: &Principal,
        as_of: NaiveDate,
    ) -> Result<Vec<Tenancy>, ServiceError> {
        let properties = self.owned_properties(principal)?;
        let filter = TenancyFilter::for_properties(properties.keys().copied().collect())
            .with_status(TenancyStatus::Active);

        let mut expired = Vec::new();
        for tenancy in self.repositories.tenancies.find(&filter)? {
            if tenancy.lease_end >= as_of {
                continue;
            }
            let owner = properties
                .get(&tenancy.property_id)
                .map(|property| property.landlord_id);
            authorize_tenancy(
                principal,
                TenancyAction::Expire,
                TenancyFacts {
                    occupant: &tenancy.user_id,
                    property_owner: owner.as_ref(),
                },
            )?;
            if let Some(updated) = self.apply(tenancy, TenancyEvent::Expire)? {
                expired.push(updated);
            }
        }

        if !expired.is_empty() {
            info!(count = expired.len(), %as_of, "leases expired");
        }
        Ok(expired)
    }

    /// Apply `event` through the transition table and persist the outcome.
    /// Returns the updated record, or `None` when the event deletes it.
    fn apply(
        &self,
        mut tenancy: Tenancy,
        event: TenancyEvent,
    ) -> Result<Option<Tenancy>, ServiceError> {
        match lifecycle::transition(tenancy.status, event)? {
            TenancyOutcome::Becomes(status) => {
                tenancy.status = status;
                tenancy.updated_at = Utc::now();
                let stored = self.repositories.tenancies.update(tenancy)?;
                info!(
                    tenancy_id = %stored.id,
                    event = event.label(),
                    status = stored.status.label(),
                    "tenancy transitioned"
                );
                Ok(Some(stored))
            }
            TenancyOutcome::Removed => {
                self.repositories.tenancies.delete(&tenancy.id)?;
                info!(tenancy_id = %tenancy.id, event = event.label(), "tenancy removed");
                Ok(None)
            }
        }
    }

    fn respondable(&self, principal: &Principal, id: &TenancyId) -> Result<Tenancy, ServiceError> {
        let tenancy = self.tenancy(id)?;
        authorize_tenancy(
            principal,
            TenancyAction::Respond,
            TenancyFacts {
                occupant: &tenancy.user_id,
                property_owner: None,
            },
        )
        .map_err(|denied| denial(principal, denied))?;
        Ok(tenancy)
    }

    fn tenancy(&self, id: &TenancyId) -> Result<Tenancy, ServiceError> {
        self.repositories
            .tenancies
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("Tenancy not found"))
    }

    fn property(&self, id: &PropertyId) -> Result<Property, ServiceError> {
        self.repositories
            .properties
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("Property not found"))
    }

    fn owned_properties(
        &self,
        principal: &Principal,
    ) -> Result<HashMap<PropertyId, Property>, ServiceError> {
        Ok(self
            .repositories
            .properties
            .list_by_landlord(&principal.id)?
            .into_iter()
            .map(|property| (property.id, property))
            .collect())
    }
}

fn denial(principal: &Principal, denied: AccessDenied) -> ServiceError {
    warn!(user_id = %principal.id, reason = denied.reason, "tenancy access denied");
    denied.into()
}

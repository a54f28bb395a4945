use tracing::info;

use super::domain::{Property, PropertyInput};
use crate::access::{authorize_property, Principal, PropertyAction};
use crate::error::ServiceError;
use crate::ids::PropertyId;
use crate::store::Repositories;

/// Property CRUD scoped to the owning landlord.
pub struct PropertyService {
    repositories: Repositories,
}

impl PropertyService {
    pub fn new(repositories: Repositories) -> Self {
        Self { repositories }
    }

    pub fn create(
        &self,
        principal: &Principal,
        input: PropertyInput,
    ) -> Result<Property, ServiceError> {
        authorize_property(principal, PropertyAction::Create, None)?;
        let property = input.into_property(principal.id)?;
        let stored = self.repositories.properties.insert(property)?;
        info!(property_id = %stored.id, landlord_id = %stored.landlord_id, "property created");
        Ok(stored)
    }

    pub fn list(&self, principal: &Principal) -> Result<Vec<Property>, ServiceError> {
        Ok(self.repositories.properties.list_by_landlord(&principal.id)?)
    }

    pub fn get(&self, principal: &Principal, id: &PropertyId) -> Result<Property, ServiceError> {
        self.owned(principal, id, PropertyAction::View)
    }

    pub fn update(
        &self,
        principal: &Principal,
        id: &PropertyId,
        patch: PropertyInput,
    ) -> Result<Property, ServiceError> {
        let mut property = self.owned(principal, id, PropertyAction::Update)?;
        patch.apply_to(&mut property)?;
        let stored = self.repositories.properties.update(property)?;
        info!(property_id = %stored.id, "property updated");
        Ok(stored)
    }

    /// Delete the property together with the tenancies and invoices that reference it.
    ///
    /// The cascade is three separate writes and is not atomic. Children go first and the
    /// property last, so a failure partway through leaves the property in place and repeating
    /// the delete finishes the cleanup.
    pub fn delete(&self, principal: &Principal, id: &PropertyId) -> Result<(), ServiceError> {
        let property = self.owned(principal, id, PropertyAction::Delete)?;

        let invoices = self
            .repositories
            .invoices
            .delete_for_property(&property.id)?;
        let tenancies = self
            .repositories
            .tenancies
            .delete_for_property(&property.id)?;
        self.repositories.properties.delete(&property.id)?;

        info!(
            property_id = %property.id,
            tenancies_removed = tenancies,
            invoices_removed = invoices,
            "property deleted"
        );
        Ok(())
    }

    fn owned(
        &self,
        principal: &Principal,
        id: &PropertyId,
        action: PropertyAction,
    ) -> Result<Property, ServiceError> {
        let property = self
            .repositories
            .properties
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("Property not found"))?;
        authorize_property(principal, action, Some(&property.landlord_id))?;
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use chrono::{NaiveDate, Utc};

    use crate::identity::Role;
    use crate::ids::{TenancyId, UserId};
    use crate::properties::PropertyStatus;
    use crate::store::{MemoryStore, RepositoryError};
    use crate::tenancies::{Tenancy, TenancyFilter, TenancyRepository, TenancyStatus};

    /// Tenancy store whose next bulk delete fails once, then recovers.
    struct FlakyTenancies {
        inner: Arc<MemoryStore>,
        fail_next_cascade: AtomicBool,
    }

    impl TenancyRepository for FlakyTenancies {
        fn insert_unique(&self, tenancy: Tenancy) -> Result<Tenancy, RepositoryError> {
            self.inner.insert_unique(tenancy)
        }

        fn fetch(&self, id: &TenancyId) -> Result<Option<Tenancy>, RepositoryError> {
            TenancyRepository::fetch(&*self.inner, id)
        }

        fn update(&self, tenancy: Tenancy) -> Result<Tenancy, RepositoryError> {
            TenancyRepository::update(&*self.inner, tenancy)
        }

        fn delete(&self, id: &TenancyId) -> Result<(), RepositoryError> {
            TenancyRepository::delete(&*self.inner, id)
        }

        fn find(&self, filter: &TenancyFilter) -> Result<Vec<Tenancy>, RepositoryError> {
            TenancyRepository::find(&*self.inner, filter)
        }

        fn delete_for_property(&self, property_id: &PropertyId) -> Result<usize, RepositoryError> {
            if self.fail_next_cascade.swap(false, Ordering::SeqCst) {
                return Err(RepositoryError::Unavailable("database offline".to_string()));
            }
            TenancyRepository::delete_for_property(&*self.inner, property_id)
        }
    }

    fn landlord() -> Principal {
        Principal::new(UserId::generate(), Role::Landlord)
    }

    fn input(title: &str) -> PropertyInput {
        PropertyInput {
            title: Some(title.to_string()),
            address: Some("7 Canal View".to_string()),
            property_type: Some("House".to_string()),
            units: Some(2),
            ..PropertyInput::default()
        }
    }

    #[test]
    fn list_returns_only_own_properties() {
        let service = PropertyService::new(Repositories::in_memory());
        let owner = landlord();
        let other = landlord();

        service.create(&owner, input("First")).expect("created");
        service.create(&owner, input("Second")).expect("created");
        service.create(&other, input("Elsewhere")).expect("created");

        let titles: Vec<String> = service
            .list(&owner)
            .expect("list")
            .into_iter()
            .map(|property| property.title)
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(!titles.contains(&"Elsewhere".to_string()));
    }

    #[test]
    fn tenants_cannot_create_properties() {
        let service = PropertyService::new(Repositories::in_memory());
        let tenant = Principal::new(UserId::generate(), Role::Tenant);

        match service.create(&tenant, input("Nope")) {
            Err(ServiceError::Unauthorized(_)) => {}
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn strangers_cannot_read_update_or_delete() {
        let service = PropertyService::new(Repositories::in_memory());
        let owner = landlord();
        let stranger = landlord();
        let property = service.create(&owner, input("Owned")).expect("created");

        assert!(matches!(
            service.get(&stranger, &property.id),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.update(&stranger, &property.id, PropertyInput::default()),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            service.delete(&stranger, &property.id),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(service.get(&owner, &property.id).is_ok());
    }

    #[test]
    fn update_keeps_owner_and_applies_patch() {
        let service = PropertyService::new(Repositories::in_memory());
        let owner = landlord();
        let property = service.create(&owner, input("Owned")).expect("created");

        let updated = service
            .update(
                &owner,
                &property.id,
                PropertyInput {
                    status: Some(PropertyStatus::Occupied),
                    ..PropertyInput::default()
                },
            )
            .expect("updated");

        assert_eq!(updated.status, PropertyStatus::Occupied);
        assert_eq!(updated.landlord_id, owner.id);
        assert!(updated.updated_at >= property.updated_at);
    }

    #[test]
    fn interrupted_delete_keeps_the_property_and_can_be_repeated() {
        let store = Arc::new(MemoryStore::default());
        let tenancies = Arc::new(FlakyTenancies {
            inner: store.clone(),
            fail_next_cascade: AtomicBool::new(true),
        });
        let mut repositories = Repositories::shared(store);
        repositories.tenancies = tenancies.clone();
        let service = PropertyService::new(repositories);

        let owner = landlord();
        let property = service.create(&owner, input("Owned")).expect("created");
        let now = Utc::now();
        tenancies
            .insert_unique(Tenancy {
                id: TenancyId::generate(),
                user_id: UserId::generate(),
                property_id: property.id,
                lease_start: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid"),
                lease_end: NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid"),
                status: TenancyStatus::Active,
                created_at: now,
                updated_at: now,
            })
            .expect("tenancy stored");

        assert!(matches!(
            service.delete(&owner, &property.id),
            Err(ServiceError::Repository(RepositoryError::Unavailable(_)))
        ));
        assert!(service.get(&owner, &property.id).is_ok());

        service.delete(&owner, &property.id).expect("retry completes");
        assert!(matches!(
            service.get(&owner, &property.id),
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(
            tenancies
                .count(&TenancyFilter::for_properties(vec![property.id]))
                .expect("count"),
            0
        );
    }

    #[test]
    fn missing_property_is_not_found() {
        let service = PropertyService::new(Repositories::in_memory());
        match service.get(&landlord(), &PropertyId::generate()) {
            Err(ServiceError::NotFound(message)) => assert_eq!(message, "Property not found"),
            other => panic!("expected not found, got {other:?}"),
        }
    }
}

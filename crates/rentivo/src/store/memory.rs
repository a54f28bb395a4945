use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::snapshot::{self, Snapshot};
use super::RepositoryError;
use crate::identity::domain::normalize_email;
use crate::identity::{User, UserRepository};
use crate::ids::{InvoiceId, PropertyId, TenancyId, UserId};
use crate::invoices::{Invoice, InvoiceFilter, InvoiceRepository};
use crate::properties::{Property, PropertyRepository};
use crate::tenancies::{Tenancy, TenancyFilter, TenancyRepository};

/// Document store keeping each collection in a locked map, optionally mirrored to a JSON file
/// after every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    properties: RwLock<HashMap<PropertyId, Property>>,
    tenancies: RwLock<HashMap<TenancyId, Tenancy>>,
    invoices: RwLock<HashMap<InvoiceId, Invoice>>,
    snapshot: Option<SnapshotFile>,
}

#[derive(Debug)]
struct SnapshotFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Open a store backed by `path`, loading existing documents when the file is present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let loaded = snapshot::load(&path)?;
        debug!(
            path = %path.display(),
            users = loaded.users.len(),
            properties = loaded.properties.len(),
            tenancies = loaded.tenancies.len(),
            invoices = loaded.invoices.len(),
            "document store loaded"
        );

        Ok(Self {
            users: RwLock::new(index(loaded.users, |user| user.id)),
            properties: RwLock::new(index(loaded.properties, |property| property.id)),
            tenancies: RwLock::new(index(loaded.tenancies, |tenancy| tenancy.id)),
            invoices: RwLock::new(index(loaded.invoices, |invoice| invoice.id)),
            snapshot: Some(SnapshotFile {
                path,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Apply `op` to one collection and mirror the result to the snapshot file. When the
    /// snapshot cannot be written the collection is restored and the error is returned, so a
    /// failed write never lingers in memory.
    fn mutate<T, R>(
        &self,
        lock: &RwLock<T>,
        op: impl FnOnce(&mut T) -> Result<R, RepositoryError>,
    ) -> Result<R, RepositoryError>
    where
        T: Clone,
    {
        let Some(file) = &self.snapshot else {
            let mut guard = write(lock)?;
            return op(&mut guard);
        };

        // Writers are serialized on the file lock, so nothing else changes `lock` between the
        // edit and a rollback.
        let _serialized = file.write_lock.lock().map_err(poisoned)?;
        let (result, previous) = {
            let mut guard = write(lock)?;
            let previous = guard.clone();
            (op(&mut guard)?, previous)
        };

        if let Err(err) = self.persist(file) {
            warn!(
                path = %file.path.display(),
                error = %err,
                "snapshot write failed, change discarded"
            );
            *write(lock)? = previous;
            return Err(err);
        }
        Ok(result)
    }

    fn persist(&self, file: &SnapshotFile) -> Result<(), RepositoryError> {
        let image = Snapshot {
            users: ordered(&*read(&self.users)?, |user| (user.created_at, user.id.0)),
            properties: ordered(&*read(&self.properties)?, |property| {
                (property.created_at, property.id.0)
            }),
            tenancies: ordered(&*read(&self.tenancies)?, |tenancy| {
                (tenancy.created_at, tenancy.id.0)
            }),
            invoices: ordered(&*read(&self.invoices)?, |invoice| {
                (invoice.created_at, invoice.id.0)
            }),
        };
        snapshot::save(&file.path, &image)
    }
}

fn index<K, V>(values: Vec<V>, key: impl Fn(&V) -> K) -> HashMap<K, V>
where
    K: Eq + Hash,
{
    values.into_iter().map(|value| (key(&value), value)).collect()
}

/// Clone the documents out of `map` in creation order (ids break ties).
fn ordered<K, V, O>(map: &HashMap<K, V>, sort_key: impl Fn(&V) -> O) -> Vec<V>
where
    V: Clone,
    O: Ord,
{
    let mut values: Vec<V> = map.values().cloned().collect();
    values.sort_by_key(|value| sort_key(value));
    values
}

fn poisoned<E>(_: E) -> RepositoryError {
    RepositoryError::Unavailable("document store lock poisoned".to_string())
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, RepositoryError> {
    lock.read().map_err(poisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, RepositoryError> {
    lock.write().map_err(poisoned)
}

fn replace_existing<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> Result<V, RepositoryError>
where
    K: Eq + Hash,
    V: Clone,
{
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value.clone();
            Ok(value)
        }
        None => Err(RepositoryError::NotFound),
    }
}

fn remove_existing<K, V>(map: &mut HashMap<K, V>, key: &K) -> Result<(), RepositoryError>
where
    K: Eq + Hash,
{
    map.remove(key).map(|_| ()).ok_or(RepositoryError::NotFound)
}

impl UserRepository for MemoryStore {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        self.mutate(&self.users, |users| {
            let email = normalize_email(&user.email);
            if users.contains_key(&user.id)
                || users.values().any(|existing| existing.email == email)
            {
                return Err(RepositoryError::Conflict);
            }
            let stored = User { email, ..user };
            users.insert(stored.id, stored.clone());
            Ok(stored)
        })
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(read(&self.users)?.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let email = normalize_email(email);
        Ok(read(&self.users)?
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

impl PropertyRepository for MemoryStore {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        self.mutate(&self.properties, |properties| {
            if properties.contains_key(&property.id) {
                return Err(RepositoryError::Conflict);
            }
            properties.insert(property.id, property.clone());
            Ok(property)
        })
    }

    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        Ok(read(&self.properties)?.get(id).cloned())
    }

    fn update(&self, property: Property) -> Result<Property, RepositoryError> {
        self.mutate(&self.properties, |properties| {
            replace_existing(properties, property.id, property)
        })
    }

    fn delete(&self, id: &PropertyId) -> Result<(), RepositoryError> {
        self.mutate(&self.properties, |properties| remove_existing(properties, id))
    }

    fn list_by_landlord(&self, landlord_id: &UserId) -> Result<Vec<Property>, RepositoryError> {
        let properties = read(&self.properties)?;
        let mut owned: Vec<Property> = properties
            .values()
            .filter(|property| property.landlord_id == *landlord_id)
            .cloned()
            .collect();
        owned.sort_by_key(|property| (property.created_at, property.id));
        Ok(owned)
    }
}

impl TenancyRepository for MemoryStore {
    fn insert_unique(&self, tenancy: Tenancy) -> Result<Tenancy, RepositoryError> {
        self.mutate(&self.tenancies, |tenancies| {
            let clash = tenancies.values().any(|existing| {
                existing.user_id == tenancy.user_id
                    && existing.property_id == tenancy.property_id
                    && existing.status.is_current()
            });
            if clash || tenancies.contains_key(&tenancy.id) {
                return Err(RepositoryError::Conflict);
            }
            tenancies.insert(tenancy.id, tenancy.clone());
            Ok(tenancy)
        })
    }

    fn fetch(&self, id: &TenancyId) -> Result<Option<Tenancy>, RepositoryError> {
        Ok(read(&self.tenancies)?.get(id).cloned())
    }

    fn update(&self, tenancy: Tenancy) -> Result<Tenancy, RepositoryError> {
        self.mutate(&self.tenancies, |tenancies| {
            replace_existing(tenancies, tenancy.id, tenancy)
        })
    }

    fn delete(&self, id: &TenancyId) -> Result<(), RepositoryError> {
        self.mutate(&self.tenancies, |tenancies| remove_existing(tenancies, id))
    }

    fn find(&self, filter: &TenancyFilter) -> Result<Vec<Tenancy>, RepositoryError> {
        let tenancies = read(&self.tenancies)?;
        let mut matching: Vec<Tenancy> = tenancies
            .values()
            .filter(|tenancy| filter.matches(tenancy))
            .cloned()
            .collect();
        matching.sort_by_key(|tenancy| (tenancy.created_at, tenancy.id));
        Ok(matching)
    }

    fn delete_for_property(&self, property_id: &PropertyId) -> Result<usize, RepositoryError> {
        self.mutate(&self.tenancies, |tenancies| {
            let before = tenancies.len();
            tenancies.retain(|_, tenancy| tenancy.property_id != *property_id);
            Ok(before - tenancies.len())
        })
    }

    fn count(&self, filter: &TenancyFilter) -> Result<usize, RepositoryError> {
        Ok(read(&self.tenancies)?
            .values()
            .filter(|tenancy| filter.matches(tenancy))
            .count())
    }
}

impl InvoiceRepository for MemoryStore {
    fn insert(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        self.mutate(&self.invoices, |invoices| {
            if invoices.contains_key(&invoice.id) {
                return Err(RepositoryError::Conflict);
            }
            invoices.insert(invoice.id, invoice.clone());
            Ok(invoice)
        })
    }

    fn fetch(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        Ok(read(&self.invoices)?.get(id).cloned())
    }

    fn update(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        self.mutate(&self.invoices, |invoices| {
            replace_existing(invoices, invoice.id, invoice)
        })
    }

    fn delete(&self, id: &InvoiceId) -> Result<(), RepositoryError> {
        self.mutate(&self.invoices, |invoices| remove_existing(invoices, id))
    }

    fn find(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, RepositoryError> {
        let invoices = read(&self.invoices)?;
        let mut matching: Vec<Invoice> = invoices
            .values()
            .filter(|invoice| filter.matches(invoice))
            .cloned()
            .collect();
        matching.sort_by_key(|invoice| (invoice.created_at, invoice.id));
        Ok(matching)
    }

    fn delete_for_property(&self, property_id: &PropertyId) -> Result<usize, RepositoryError> {
        self.mutate(&self.invoices, |invoices| {
            let before = invoices.len();
            invoices.retain(|_, invoice| invoice.property_id != *property_id);
            Ok(before - invoices.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::tenancies::TenancyStatus;
    use chrono::{NaiveDate, Utc};
    use std::sync::Arc;
    use std::thread;

    fn user(email: &str) -> User {
        User {
            id: UserId::generate(),
            name: "Test User".to_string(),
            email: email.to_string(),
            phone: "000".to_string(),
            role: Role::Tenant,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        }
    }

    fn tenancy(user_id: UserId, property_id: PropertyId, status: TenancyStatus) -> Tenancy {
        let now = Utc::now();
        Tenancy {
            id: TenancyId::generate(),
            user_id,
            property_id,
            lease_start: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid"),
            lease_end: NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid"),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rentivo-{label}-{}.json", UserId::generate()))
    }

    #[test]
    fn user_emails_are_unique_ignoring_case() {
        let store = MemoryStore::default();
        UserRepository::insert(&store, user("u@x.com")).expect("first insert");

        match UserRepository::insert(&store, user("U@X.com")) {
            Err(RepositoryError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(store.find_by_email(" U@x.COM").expect("lookup").is_some());
    }

    #[test]
    fn insert_unique_ignores_past_tenancies() {
        let store = MemoryStore::default();
        let user_id = UserId::generate();
        let property_id = PropertyId::generate();

        store
            .insert_unique(tenancy(user_id, property_id, TenancyStatus::Past))
            .expect("past tenancy stored");
        store
            .insert_unique(tenancy(user_id, property_id, TenancyStatus::Pending))
            .expect("past tenancy does not block");

        match store.insert_unique(tenancy(user_id, property_id, TenancyStatus::Pending)) {
            Err(RepositoryError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn concurrent_invites_for_one_pair_store_a_single_tenancy() {
        let store = Arc::new(MemoryStore::default());
        let user_id = UserId::generate();
        let property_id = PropertyId::generate();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    store
                        .insert_unique(tenancy(user_id, property_id, TenancyStatus::Pending))
                        .is_ok()
                })
            })
            .collect();

        let stored = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread joins"))
            .filter(|ok| *ok)
            .count();

        assert_eq!(stored, 1);
        assert_eq!(
            store
                .count(&TenancyFilter::for_user(user_id))
                .expect("count"),
            1
        );
    }

    #[test]
    fn update_and_delete_require_existing_records() {
        let store = MemoryStore::default();
        let ghost = tenancy(
            UserId::generate(),
            PropertyId::generate(),
            TenancyStatus::Active,
        );

        assert!(matches!(
            TenancyRepository::update(&store, ghost.clone()),
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            TenancyRepository::delete(&store, &ghost.id),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn filters_combine_equality_and_in_set_predicates() {
        let store = MemoryStore::default();
        let user_id = UserId::generate();
        let first = PropertyId::generate();
        let second = PropertyId::generate();

        store
            .insert_unique(tenancy(user_id, first, TenancyStatus::Active))
            .expect("stored");
        store
            .insert_unique(tenancy(user_id, second, TenancyStatus::Pending))
            .expect("stored");
        store
            .insert_unique(tenancy(UserId::generate(), first, TenancyStatus::Pending))
            .expect("stored");

        let on_first = TenancyFilter::for_properties(vec![first]);
        assert_eq!(TenancyRepository::find(&store, &on_first).expect("find").len(), 2);
        assert_eq!(
            store
                .count(&on_first.with_status(TenancyStatus::Pending))
                .expect("count"),
            1
        );
        assert_eq!(
            store
                .count(&TenancyFilter::for_properties(Vec::new()))
                .expect("count"),
            0
        );
        assert_eq!(TenancyRepository::delete_for_property(&store, &first).expect("deleted"), 2);
        assert_eq!(TenancyRepository::find(&store, &TenancyFilter::default()).expect("find").len(), 1);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let path = temp_file("reopen");
        let user_id = UserId::generate();
        let property_id = PropertyId::generate();

        {
            let store = MemoryStore::open(&path).expect("fresh store opens");
            UserRepository::insert(&store, user("u@x.com")).expect("user stored");
            store
                .insert_unique(tenancy(user_id, property_id, TenancyStatus::Active))
                .expect("tenancy stored");
        }

        let reopened = MemoryStore::open(&path).expect("store reopens");
        assert!(reopened.find_by_email("u@x.com").expect("lookup").is_some());
        let tenancies =
            TenancyRepository::find(&reopened, &TenancyFilter::for_user(user_id)).expect("find");
        assert_eq!(tenancies.len(), 1);
        assert_eq!(tenancies[0].status, TenancyStatus::Active);

        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn failed_snapshot_write_leaves_no_trace() {
        let path = std::env::temp_dir()
            .join(format!("rentivo-missing-{}", UserId::generate()))
            .join("store.json");
        let store = MemoryStore::open(&path).expect("missing file opens empty");
        let invite = tenancy(UserId::generate(), PropertyId::generate(), TenancyStatus::Pending);

        for attempt in 0..2 {
            match store.insert_unique(invite.clone()) {
                Err(RepositoryError::Unavailable(message)) => {
                    assert!(message.contains("failed to write"), "attempt {attempt}: {message}")
                }
                other => panic!("attempt {attempt}: expected unavailable, got {other:?}"),
            }
        }

        assert_eq!(store.count(&TenancyFilter::default()).expect("count"), 0);
        assert!(TenancyRepository::fetch(&store, &invite.id)
            .expect("fetch")
            .is_none());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let path = temp_file("corrupt");
        std::fs::write(&path, b"{ not json").expect("write fixture");

        match MemoryStore::open(&path) {
            Err(RepositoryError::Unavailable(message)) => assert!(message.contains("corrupt")),
            other => panic!("expected unavailable, got {other:?}"),
        }

        std::fs::remove_file(&path).expect("cleanup");
    }
}

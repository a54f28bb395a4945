use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::access::Principal;
use crate::config::DomainConfig;
use crate::http::ApiState;
use crate::identity::{Registration, Role};
use crate::ids::{PropertyId, TenancyId};
use crate::properties::{Property, PropertyInput};
use crate::store::{Repositories, RepositoryError};
use crate::tenancies::repository::{TenancyFilter, TenancyRepository};
use crate::tenancies::{Invitation, Tenancy};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A registered user together with the bearer token issued at registration.
pub(super) struct Account {
    pub(super) principal: Principal,
    pub(super) token: String,
}

impl Account {
    pub(super) fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Services over a fresh in-memory store.
pub(super) struct World {
    pub(super) repositories: Repositories,
    pub(super) state: ApiState,
}

impl World {
    pub(super) fn new() -> Self {
        let repositories = Repositories::in_memory();
        let state = ApiState::new(repositories.clone(), DomainConfig::default());
        Self {
            repositories,
            state,
        }
    }

    pub(super) fn register(&self, email: &str, role: Role) -> Account {
        let registered = self
            .state
            .identity
            .register(Registration {
                name: Some(format!("{} user", role.label())),
                email: Some(email.to_string()),
                password: Some("correct horse".to_string()),
                phone: Some("+92 300 0000000".to_string()),
                role: Some(role.label().to_string()),
            })
            .expect("registration succeeds");
        Account {
            principal: Principal::new(registered.user.id, registered.user.role),
            token: registered.token,
        }
    }

    pub(super) fn property(&self, owner: &Account, title: &str) -> Property {
        self.state
            .properties
            .create(
                &owner.principal,
                PropertyInput {
                    title: Some(title.to_string()),
                    address: Some("12 Canal Road".to_string()),
                    property_type: Some("Apartment".to_string()),
                    units: Some(2),
                    ..PropertyInput::default()
                },
            )
            .expect("property created")
    }

    pub(super) fn invite(&self, landlord: &Account, email: &str, property: &Property) -> Tenancy {
        self.state
            .tenancies
            .invite(&landlord.principal, invitation(email, property.id))
            .expect("invitation created")
    }

    pub(super) fn stored(&self, id: &TenancyId) -> Option<Tenancy> {
        self.repositories.tenancies.fetch(id).expect("fetch succeeds")
    }

    pub(super) fn tenancy_count(&self) -> usize {
        self.repositories
            .tenancies
            .count(&TenancyFilter::default())
            .expect("count succeeds")
    }
}

pub(super) fn invitation(email: &str, property_id: PropertyId) -> Invitation {
    Invitation {
        email: Some(email.to_string()),
        property_id: Some(property_id),
        lease_start: Some(date(2024, 1, 1)),
        lease_end: Some(date(2024, 12, 31)),
    }
}

pub(super) fn request(
    method: &str,
    uri: &str,
    bearer: Option<String>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("serializable")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Tenancy repository whose backend is offline.
pub(super) struct UnavailableTenancies;

impl TenancyRepository for UnavailableTenancies {
    fn insert_unique(&self, _tenancy: Tenancy) -> Result<Tenancy, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &TenancyId) -> Result<Option<Tenancy>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _tenancy: Tenancy) -> Result<Tenancy, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &TenancyId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find(&self, _filter: &TenancyFilter) -> Result<Vec<Tenancy>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_for_property(&self, _property_id: &PropertyId) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// A world whose tenancy collection is offline while every other collection works.
pub(super) fn offline_world() -> World {
    let mut repositories = Repositories::in_memory();
    repositories.tenancies = Arc::new(UnavailableTenancies);
    let state = ApiState::new(repositories.clone(), DomainConfig::default());
    World {
        repositories,
        state,
    }
}

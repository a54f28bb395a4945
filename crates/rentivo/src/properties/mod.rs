//! Landlord-owned properties.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Property, PropertyInput, PropertyStatus, PropertySummary, RoomSize, SplitMethod,
};
pub use repository::PropertyRepository;
pub use router::property_router;
pub use service::PropertyService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{non_blank, ServiceError};
use crate::ids::{PropertyId, UserId};

/// Occupancy state shown on the landlord's property list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Occupied,
    #[default]
    Vacant,
    Maintenance,
}

/// How shared utility bills are divided between the occupants of a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitMethod {
    #[default]
    Equal,
    RoomSize,
    Occupancy,
    Custom,
}

/// Room floor area, consulted when the split method is [`SplitMethod::RoomSize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSize {
    pub name: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub landlord_id: UserId,
    pub title: String,
    pub address: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub units: u32,
    pub status: PropertyStatus,
    pub split_method: SplitMethod,
    pub room_sizes: Vec<RoomSize>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn summary(&self) -> PropertySummary {
        PropertySummary {
            id: self.id,
            title: self.title.clone(),
            address: self.address.clone(),
        }
    }
}

/// Title and address joined onto tenancy and invoice listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: PropertyId,
    pub title: String,
    pub address: String,
}

/// Client-supplied property fields, used both for creation and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub title: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub units: Option<u32>,
    pub status: Option<PropertyStatus>,
    pub split_method: Option<SplitMethod>,
    pub room_sizes: Option<Vec<RoomSize>>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

const MISSING_REQUIRED: &str = "Please fill in all required fields";

impl PropertyInput {
    /// Build a new property; title, address, type and a non-zero unit count are required.
    pub fn into_property(self, landlord_id: UserId) -> Result<Property, ServiceError> {
        let missing = || ServiceError::validation(MISSING_REQUIRED);
        let title = non_blank(self.title).ok_or_else(missing)?;
        let address = non_blank(self.address).ok_or_else(missing)?;
        let property_type = non_blank(self.property_type).ok_or_else(missing)?;
        let units = self.units.filter(|units| *units > 0).ok_or_else(missing)?;

        let now = Utc::now();
        Ok(Property {
            id: PropertyId::generate(),
            landlord_id,
            title,
            address,
            property_type,
            units,
            status: self.status.unwrap_or_default(),
            split_method: self.split_method.unwrap_or_default(),
            room_sizes: self.room_sizes.unwrap_or_default(),
            amenities: self.amenities.unwrap_or_default(),
            images: self.images.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Overlay the supplied fields. Required fields may be replaced but never blanked.
    pub fn apply_to(self, property: &mut Property) -> Result<(), ServiceError> {
        fn replace_text(target: &mut String, value: Option<String>) -> Result<(), ServiceError> {
            if let Some(raw) = value {
                *target =
                    non_blank(Some(raw)).ok_or_else(|| ServiceError::validation(MISSING_REQUIRED))?;
            }
            Ok(())
        }

        replace_text(&mut property.title, self.title)?;
        replace_text(&mut property.address, self.address)?;
        replace_text(&mut property.property_type, self.property_type)?;
        if let Some(units) = self.units {
            if units == 0 {
                return Err(ServiceError::validation("A property needs at least one unit"));
            }
            property.units = units;
        }
        if let Some(status) = self.status {
            property.status = status;
        }
        if let Some(split_method) = self.split_method {
            property.split_method = split_method;
        }
        if let Some(room_sizes) = self.room_sizes {
            property.room_sizes = room_sizes;
        }
        if let Some(amenities) = self.amenities {
            property.amenities = amenities;
        }
        if let Some(images) = self.images {
            property.images = images;
        }
        property.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PropertyInput {
        PropertyInput {
            title: Some("Gulberg Heights".to_string()),
            address: Some("12 Main Boulevard, Lahore".to_string()),
            property_type: Some("Apartment".to_string()),
            units: Some(4),
            ..PropertyInput::default()
        }
    }

    #[test]
    fn into_property_applies_defaults() {
        let landlord = UserId::generate();
        let property = input().into_property(landlord).expect("valid input");

        assert_eq!(property.landlord_id, landlord);
        assert_eq!(property.status, PropertyStatus::Vacant);
        assert_eq!(property.split_method, SplitMethod::Equal);
        assert!(property.amenities.is_empty());
    }

    #[test]
    fn into_property_requires_core_fields() {
        let mut missing_units = input();
        missing_units.units = None;
        assert!(matches!(
            missing_units.into_property(UserId::generate()),
            Err(ServiceError::Validation(_))
        ));

        let mut blank_title = input();
        blank_title.title = Some("  ".to_string());
        assert!(matches!(
            blank_title.into_property(UserId::generate()),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn apply_to_patches_only_supplied_fields() {
        let mut property = input().into_property(UserId::generate()).expect("valid");
        let patch = PropertyInput {
            status: Some(PropertyStatus::Maintenance),
            split_method: Some(SplitMethod::RoomSize),
            ..PropertyInput::default()
        };

        patch.apply_to(&mut property).expect("patch applies");
        assert_eq!(property.status, PropertyStatus::Maintenance);
        assert_eq!(property.split_method, SplitMethod::RoomSize);
        assert_eq!(property.title, "Gulberg Heights");
    }

    #[test]
    fn apply_to_refuses_blanking_required_fields() {
        let mut property = input().into_property(UserId::generate()).expect("valid");
        let patch = PropertyInput {
            address: Some(String::new()),
            ..PropertyInput::default()
        };
        assert!(patch.apply_to(&mut property).is_err());
        assert_eq!(property.address, "12 Main Boulevard, Lahore");
    }

    #[test]
    fn split_method_uses_kebab_case_on_the_wire() {
        let parsed: SplitMethod = serde_json::from_str("\"room-size\"").expect("parses");
        assert_eq!(parsed, SplitMethod::RoomSize);
    }
}

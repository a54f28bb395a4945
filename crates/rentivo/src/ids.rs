use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse a path segment; malformed identifiers are treated as absent records.
            pub fn parse(raw: &str) -> Option<Self> {
                Uuid::parse_str(raw.trim()).ok().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identifier of a registered user, landlord or tenant.
    UserId
);
entity_id!(
    /// Identifier of a landlord-owned property.
    PropertyId
);
entity_id!(
    /// Identifier of a tenancy (the link between a user and a property).
    TenancyId
);
entity_id!(
    /// Identifier of an invoice issued against a tenancy.
    InvoiceId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_malformed_identifiers() {
        assert!(TenancyId::parse("not-a-uuid").is_none());
        let id = TenancyId::generate();
        assert_eq!(TenancyId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn identifiers_serialize_as_plain_strings() {
        let id = UserId::generate();
        let json = serde_json::to_value(id).expect("serializes");
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}

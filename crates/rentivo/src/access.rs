//! Capability checks for every mutation and read the services perform.
//!
//! Each entity type has exactly one `authorize_*` function taking the acting principal, the
//! requested action, and the ownership facts of the resource. Services look the facts up,
//! call the guard, and only then touch the store.

use serde::Serialize;

use crate::identity::Role;
use crate::ids::UserId;

/// The resolved caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_landlord(&self) -> bool {
        self.role == Role::Landlord
    }

    fn is_landlord_of(&self, owner: &UserId) -> bool {
        self.is_landlord() && self.id == *owner
    }
}

/// Refusal returned by the guards; converts into an unauthorized service error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct AccessDenied {
    pub reason: &'static str,
}

impl AccessDenied {
    const fn because(reason: &'static str) -> Self {
        Self { reason }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAction {
    Create,
    View,
    Update,
    Delete,
    InviteTenant,
    IssueInvoice,
}

/// `owner` is `None` only for [`PropertyAction::Create`], where no property exists yet.
pub fn authorize_property(
    principal: &Principal,
    action: PropertyAction,
    owner: Option<&UserId>,
) -> Result<(), AccessDenied> {
    if action == PropertyAction::Create {
        return if principal.is_landlord() {
            Ok(())
        } else {
            Err(AccessDenied::because("Only landlords can add properties"))
        };
    }

    let owns = owner.is_some_and(|owner| principal.is_landlord_of(owner));
    if owns {
        return Ok(());
    }

    Err(AccessDenied::because(match action {
        PropertyAction::InviteTenant => "Not authorized to add tenant to this property",
        PropertyAction::IssueInvoice => "Property not found or unauthorized",
        _ => "User not authorized",
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenancyAction {
    /// Accept or reject a pending invitation.
    Respond,
    Remove,
    Expire,
}

/// Ownership facts for a tenancy: who occupies it and who owns its property.
#[derive(Debug, Clone, Copy)]
pub struct TenancyFacts<'a> {
    pub occupant: &'a UserId,
    pub property_owner: Option<&'a UserId>,
}

pub fn authorize_tenancy(
    principal: &Principal,
    action: TenancyAction,
    facts: TenancyFacts<'_>,
) -> Result<(), AccessDenied> {
    match action {
        TenancyAction::Respond if principal.id == *facts.occupant => Ok(()),
        TenancyAction::Respond => Err(AccessDenied::because(
            "Not authorized to respond to this invitation",
        )),
        TenancyAction::Remove | TenancyAction::Expire
            if facts
                .property_owner
                .is_some_and(|owner| principal.is_landlord_of(owner)) =>
        {
            Ok(())
        }
        TenancyAction::Remove | TenancyAction::Expire => Err(AccessDenied::because(
            "Not authorized to manage this tenant",
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceAction {
    View,
    UpdateStatus,
    Delete,
}

/// Ownership facts for an invoice: the issuing landlord and the user behind its tenancy.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceFacts<'a> {
    pub landlord: &'a UserId,
    pub occupant: Option<&'a UserId>,
}

pub fn authorize_invoice(
    principal: &Principal,
    action: InvoiceAction,
    facts: InvoiceFacts<'_>,
) -> Result<(), AccessDenied> {
    let issuer = principal.is_landlord_of(facts.landlord);
    match action {
        InvoiceAction::View
            if issuer || facts.occupant.is_some_and(|occupant| *occupant == principal.id) =>
        {
            Ok(())
        }
        InvoiceAction::View => Err(AccessDenied::because(
            "Not authorized to view this invoice",
        )),
        InvoiceAction::UpdateStatus | InvoiceAction::Delete if issuer => Ok(()),
        InvoiceAction::UpdateStatus | InvoiceAction::Delete => {
            Err(AccessDenied::because("Not authorized"))
        }
    }
}

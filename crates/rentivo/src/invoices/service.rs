use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Invoice, InvoiceDraft, InvoiceStatus, InvoiceView, StatusChange};
use super::lifecycle::TransitionPolicy;
use super::repository::InvoiceFilter;
use crate::access::{
    authorize_invoice, authorize_property, AccessDenied, InvoiceAction, InvoiceFacts, Principal,
    PropertyAction,
};
use crate::error::{non_blank, ServiceError};
use crate::identity::Role;
use crate::ids::{InvoiceId, TenancyId};
use crate::store::Repositories;
use crate::tenancies::TenancyFilter;

/// Which references get joined onto an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Perspective {
    /// Landlord listing: tenancy and property.
    Issuer,
    /// Tenant listing: property and issuing landlord.
    Occupant,
    /// Single invoice read: every reference.
    Detail,
}

/// Invoice lifecycle on top of the property, tenancy, and invoice repositories.
pub struct InvoiceService {
    repositories: Repositories,
    policy: TransitionPolicy,
}

impl InvoiceService {
    pub fn new(repositories: Repositories, policy: TransitionPolicy) -> Self {
        Self {
            repositories,
            policy,
        }
    }

    /// Issue an invoice against a tenancy on one of the caller's properties. The issuing
    /// landlord is always the property owner.
    pub fn create(
        &self,
        principal: &Principal,
        draft: InvoiceDraft,
    ) -> Result<Invoice, ServiceError> {
        let missing = || ServiceError::validation("Please fill in all required fields");
        let tenancy_id = draft.tenant_id.ok_or_else(missing)?;
        let property_id = draft.property_id.ok_or_else(missing)?;
        let amount = draft.amount.ok_or_else(missing)?;
        let invoice_type = draft.invoice_type.ok_or_else(missing)?;
        let due_date = draft.due_date.ok_or_else(missing)?;
        if amount == 0 {
            return Err(ServiceError::validation(
                "Invoice amount must be greater than zero",
            ));
        }

        let property = self
            .repositories
            .properties
            .fetch(&property_id)?
            .ok_or_else(|| ServiceError::not_found("Property not found or unauthorized"))?;
        authorize_property(
            principal,
            PropertyAction::IssueInvoice,
            Some(&property.landlord_id),
        )
        .map_err(|denied| denial(principal, denied))?;

        let tenancy = self
            .repositories
            .tenancies
            .fetch(&tenancy_id)?
            .filter(|tenancy| tenancy.property_id == property.id)
            .ok_or_else(|| ServiceError::not_found("Tenant not found in this property"))?;

        let now = Utc::now();
        let invoice = Invoice {
            id: InvoiceId::generate(),
            tenant_id: tenancy.id,
            property_id: property.id,
            landlord_id: property.landlord_id,
            amount,
            invoice_type,
            due_date,
            status: InvoiceStatus::Pending,
            description: non_blank(draft.description),
            created_at: now,
            updated_at: now,
        };

        let stored = self.repositories.invoices.insert(invoice)?;
        info!(
            invoice_id = %stored.id,
            tenancy_id = %stored.tenant_id,
            amount = stored.amount,
            "invoice created"
        );
        Ok(stored)
    }

    /// Landlords see what they issued; tenants see invoices on any of their tenancies.
    pub fn list(&self, principal: &Principal) -> Result<Vec<InvoiceView>, ServiceError> {
        let (filter, perspective) = match principal.role {
            Role::Landlord => (InvoiceFilter::issued_by(principal.id), Perspective::Issuer),
            Role::Tenant => {
                let tenancy_ids: Vec<TenancyId> = self
                    .repositories
                    .tenancies
                    .find(&TenancyFilter::for_user(principal.id))?
                    .into_iter()
                    .map(|tenancy| tenancy.id)
                    .collect();
                (
                    InvoiceFilter::for_tenancies(tenancy_ids),
                    Perspective::Occupant,
                )
            }
        };

        self.repositories
            .invoices
            .find(&filter)?
            .into_iter()
            .map(|invoice| self.join(invoice, perspective))
            .collect()
    }

    pub fn get(&self, principal: &Principal, id: &InvoiceId) -> Result<InvoiceView, ServiceError> {
        let invoice = self.invoice(id)?;
        let occupant = self
            .repositories
            .tenancies
            .fetch(&invoice.tenant_id)?
            .map(|tenancy| tenancy.user_id);

        authorize_invoice(
            principal,
            InvoiceAction::View,
            InvoiceFacts {
                landlord: &invoice.landlord_id,
                occupant: occupant.as_ref(),
            },
        )
        .map_err(|denied| denial(principal, denied))?;

        self.join(invoice, Perspective::Detail)
    }

    pub fn update_status(
        &self,
        principal: &Principal,
        id: &InvoiceId,
        change: StatusChange,
    ) -> Result<Invoice, ServiceError> {
        let target = change
            .status
            .ok_or_else(|| ServiceError::validation("Please provide a status"))?;
        let mut invoice = self.issued(principal, id, InvoiceAction::UpdateStatus)?;

        let previous = invoice.status;
        invoice.status = self.policy.transition(previous, target)?;
        invoice.updated_at = Utc::now();

        let stored = self.repositories.invoices.update(invoice)?;
        info!(
            invoice_id = %stored.id,
            from = previous.label(),
            to = stored.status.label(),
            "invoice status updated"
        );
        Ok(stored)
    }

    pub fn delete(&self, principal: &Principal, id: &InvoiceId) -> Result<(), ServiceError> {
        let invoice = self.issued(principal, id, InvoiceAction::Delete)?;
        self.repositories.invoices.delete(&invoice.id)?;
        info!(invoice_id = %invoice.id, "invoice deleted");
        Ok(())
    }

    fn issued(
        &self,
        principal: &Principal,
        id: &InvoiceId,
        action: InvoiceAction,
    ) -> Result<Invoice, ServiceError> {
        let invoice = self.invoice(id)?;
        authorize_invoice(
            principal,
            action,
            InvoiceFacts {
                landlord: &invoice.landlord_id,
                occupant: None,
            },
        )
        .map_err(|denied| denial(principal, denied))?;
        Ok(invoice)
    }

    fn invoice(&self, id: &InvoiceId) -> Result<Invoice, ServiceError> {
        self.repositories
            .invoices
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("Invoice not found"))
    }

    fn join(&self, invoice: Invoice, perspective: Perspective) -> Result<InvoiceView, ServiceError> {
        let property = self
            .repositories
            .properties
            .fetch(&invoice.property_id)?
            .map(|property| property.summary());

        let tenancy = match perspective {
            Perspective::Issuer | Perspective::Detail => {
                self.repositories.tenancies.fetch(&invoice.tenant_id)?
            }
            Perspective::Occupant => None,
        };

        let landlord = match perspective {
            Perspective::Occupant | Perspective::Detail => self
                .repositories
                .users
                .fetch(&invoice.landlord_id)?
                .map(|user| user.summary()),
            Perspective::Issuer => None,
        };

        Ok(InvoiceView {
            invoice,
            tenancy,
            property,
            landlord,
        })
    }
}

fn denial(principal: &Principal, denied: AccessDenied) -> ServiceError {
    warn!(user_id = %principal.id, reason = denied.reason, "invoice access denied");
    denied.into()
}

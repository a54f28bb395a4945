use chrono::{Local, NaiveDate};
use clap::Args;
use rentivo::access::Principal;
use rentivo::config::DomainConfig;
use rentivo::dates::parse_date;
use rentivo::error::{AppError, ServiceError};
use rentivo::http::ApiState;
use rentivo::identity::{Registration, Role};
use rentivo::invoices::{InvoiceDraft, InvoiceStatus, InvoiceType, StatusChange, TransitionPolicy};
use rentivo::properties::PropertyInput;
use rentivo::store::Repositories;
use rentivo::tenancies::Invitation;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date used for the lease-expiry sweep (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Enforce the strict invoice transition table.
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let policy = if args.strict {
        TransitionPolicy::Strict
    } else {
        TransitionPolicy::Permissive
    };
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let state = ApiState::new(
        Repositories::in_memory(),
        DomainConfig {
            invoice_transitions: policy,
            ..DomainConfig::default()
        },
    );

    println!("Rentivo tenancy demo (invoice transitions: {policy:?})");

    let landlord = register(&state, "Layla Landlord", "landlord@rentivo.test", Role::Landlord)?;
    let tenant = register(&state, "Umar Tenant", "tenant@rentivo.test", Role::Tenant)?;
    let rival = register(&state, "Rafi Rival", "rival@rentivo.test", Role::Landlord)?;

    let property = state.properties.create(
        &landlord,
        PropertyInput {
            title: Some("Garden Court".to_string()),
            address: Some("21 Jail Road, Lahore".to_string()),
            property_type: Some("Apartment".to_string()),
            units: Some(4),
            ..PropertyInput::default()
        },
    )?;
    println!("\nProperty created: {} ({})", property.title, property.id);

    let lease_start = NaiveDate::from_ymd_opt(2024, 1, 1);
    let lease_end = NaiveDate::from_ymd_opt(2024, 12, 31);
    let tenancy = state.tenancies.invite(
        &landlord,
        Invitation {
            email: Some("tenant@rentivo.test".to_string()),
            property_id: Some(property.id),
            lease_start,
            lease_end,
        },
    )?;
    println!(
        "Invitation sent: tenancy {} is {} ({} to {})",
        tenancy.id,
        tenancy.status.label(),
        tenancy.lease_start,
        tenancy.lease_end
    );

    let tenancy = state.tenancies.accept(&tenant, &tenancy.id)?;
    println!("Invitation accepted: tenancy is {}", tenancy.status.label());

    let invoice = state.invoices.create(
        &landlord,
        InvoiceDraft {
            tenant_id: Some(tenancy.id),
            property_id: Some(property.id),
            amount: Some(15000),
            invoice_type: Some(InvoiceType::Rent),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            description: Some("February rent".to_string()),
        },
    )?;
    println!(
        "\nInvoice issued: {} for {} due {} is {}",
        invoice.id,
        invoice.amount,
        invoice.due_date,
        invoice.status.label()
    );

    let paid = state.invoices.update_status(
        &landlord,
        &invoice.id,
        StatusChange {
            status: Some(InvoiceStatus::Paid),
        },
    )?;
    println!("Invoice marked {}", paid.status.label());

    match state.invoices.update_status(
        &landlord,
        &invoice.id,
        StatusChange {
            status: Some(InvoiceStatus::Pending),
        },
    ) {
        Ok(reopened) => println!("Invoice reopened as {}", reopened.status.label()),
        Err(ServiceError::InvalidState(err)) => println!("Reopen refused: {err}"),
        Err(err) => return Err(err.into()),
    }

    println!("\nAccess checks");
    match state.tenancies.remove(&rival, &tenancy.id) {
        Err(ServiceError::Unauthorized(reason)) => {
            println!("  Another landlord removing the tenant: refused ({reason})")
        }
        Ok(()) => println!("  Another landlord removing the tenant: allowed"),
        Err(err) => return Err(err.into()),
    }
    match state.invoices.get(&rival, &invoice.id) {
        Err(ServiceError::Unauthorized(reason)) => {
            println!("  Another landlord reading the invoice: refused ({reason})")
        }
        Ok(_) => println!("  Another landlord reading the invoice: allowed"),
        Err(err) => return Err(err.into()),
    }

    let expired = state.tenancies.expire_leases(&landlord, as_of)?;
    println!("\nLease expiry as of {as_of}: {} tenancies moved to Past", expired.len());

    let stats = state.dashboard.landlord_stats(&landlord)?;
    println!(
        "\nLandlord dashboard: {} properties, {} active tenants, {} pending",
        stats.properties_count, stats.tenants_count, stats.pending_tenants_count
    );
    let stats = state.dashboard.tenant_stats(&tenant)?;
    println!(
        "Tenant dashboard: {} active properties, {} pending invitations",
        stats.active_properties, stats.pending_invitations
    );

    Ok(())
}

fn register(state: &ApiState, name: &str, email: &str, role: Role) -> Result<Principal, AppError> {
    let registered = state.identity.register(Registration {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        password: Some("demo-password".to_string()),
        phone: Some("+92 42 1234567".to_string()),
        role: Some(role.label().to_string()),
    })?;
    Ok(Principal::new(registered.user.id, registered.user.role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_end_to_end_under_both_policies() {
        for strict in [false, true] {
            run_demo(DemoArgs {
                as_of: NaiveDate::from_ymd_opt(2025, 1, 1),
                strict,
            })
            .expect("demo completes");
        }
    }
}

//! Invoices issued by landlords against a tenancy.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Invoice, InvoiceDraft, InvoiceStatus, InvoiceType, InvoiceView, StatusChange};
pub use lifecycle::TransitionPolicy;
pub use repository::{InvoiceFilter, InvoiceRepository};
pub use router::invoice_router;
pub use service::InvoiceService;

//! Sales invoice and credit note import.
//!
//! Fetches upstream payloads, resolves the masters they reference,
//! reconciles tax lines per company and inserts one document per record.
//! Failures are scoped to the record: they are logged, recorded in the
//! [`ImportReport`] and the batch carries on. Only an unreachable upstream
//! or a malformed envelope aborts the run.
//!
//! # Example
//!
//! ```ignore
//! use invoice_bridge::core::ImportContext;
//! use invoice_bridge::import::*;
//! use invoice_bridge::store::InMemoryStore;
//!
//! let config = ImportConfig::from_env();
//! let source = HttpSource::new(&config)?;
//! let mut store = InMemoryStore::new();
//! let report = import_sales_invoices(
//!     &ImportContext::administrator(), &config, &source, &mut store,
//! ).await?;
//! println!("{} inserted, {} skipped", report.inserted(), report.skipped());
//! ```

mod config;
mod pipeline;
mod record;
mod resolve;
mod source;
mod tax;

pub use config::*;
pub use pipeline::{
    DocumentKind, ImportMode, ImportReport, Importer, RecordOutcome, RecordStatus, failure_title,
};
pub use record::{
    Envelope, ExternalInvoiceRecord, ExternalLineItem, parse_envelope, parse_posting_date,
};
pub use resolve::{
    ItemFields, MasterAction, ResolvedCompany, ensure_address, ensure_customer, ensure_item,
    ensure_uom, fallback_billing_address, parsed_billing_address, resolve_company,
};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{InvoiceSource, JsonSource};
pub use tax::{TaxReconciliation, TaxSource, reconcile_taxes};

use tracing::error;

use crate::core::{ImportContext, ImportError};
use crate::store::Store;

/// Fetch a batch from `source` and import it.
///
/// # Errors
///
/// Returns the batch-fatal error if the fetch fails; record failures are
/// reported in the returned [`ImportReport`].
pub async fn run_import<R, S>(
    context: &ImportContext,
    config: &ImportConfig,
    source: &R,
    store: &mut S,
    kind: DocumentKind,
    mode: ImportMode,
) -> Result<ImportReport, ImportError>
where
    R: InvoiceSource,
    S: Store + ?Sized,
{
    let payloads = source.fetch(kind).await.inspect_err(|e| {
        error!(kind = kind.label(), error = %e, "fetch failed, batch aborted");
    })?;
    let importer = Importer::new(config.clone(), context.clone());
    Ok(importer.import_payloads(store, &payloads, kind, mode))
}

/// Import sales invoices as drafts.
pub async fn import_sales_invoices<R, S>(
    context: &ImportContext,
    config: &ImportConfig,
    source: &R,
    store: &mut S,
) -> Result<ImportReport, ImportError>
where
    R: InvoiceSource,
    S: Store + ?Sized,
{
    run_import(
        context,
        config,
        source,
        store,
        DocumentKind::SalesInvoice,
        ImportMode::Draft,
    )
    .await
}

/// Import sales invoices and submit each one after insert.
pub async fn import_and_submit_sales_invoices<R, S>(
    context: &ImportContext,
    config: &ImportConfig,
    source: &R,
    store: &mut S,
) -> Result<ImportReport, ImportError>
where
    R: InvoiceSource,
    S: Store + ?Sized,
{
    run_import(
        context,
        config,
        source,
        store,
        DocumentKind::SalesInvoice,
        ImportMode::Submit,
    )
    .await
}

/// Import credit notes (returns) as drafts.
pub async fn import_credit_notes<R, S>(
    context: &ImportContext,
    config: &ImportConfig,
    source: &R,
    store: &mut S,
) -> Result<ImportReport, ImportError>
where
    R: InvoiceSource,
    S: Store + ?Sized,
{
    run_import(
        context,
        config,
        source,
        store,
        DocumentKind::CreditNote,
        ImportMode::Draft,
    )
    .await
}

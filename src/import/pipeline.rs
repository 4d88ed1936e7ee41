//! Per-record import pipeline.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{error, info, info_span, warn};

use super::config::ImportConfig;
use super::record::{ExternalInvoiceRecord, non_empty, parse_posting_date, raw_field};
use super::resolve::{self, ItemFields};
use super::tax::{TaxSource, reconcile_taxes};
use crate::core::{
    DocumentBuilder, DocumentLine, DocumentLineBuilder, ImportContext, ImportError, NewAddress,
};
use crate::store::Store;

/// Kind of document produced from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    SalesInvoice,
    /// A return against an earlier invoice.
    CreditNote,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SalesInvoice => "sales invoice",
            Self::CreditNote => "credit note",
        }
    }
}

/// Whether inserted drafts are submitted straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Draft,
    Submit,
}

/// Outcome of one record.
#[derive(Debug)]
pub enum RecordStatus {
    /// Inserted as draft.
    Inserted,
    /// Inserted and submitted.
    Submitted,
    /// Inserted as draft; the submit transition failed.
    SubmitFailed(ImportError),
    /// A document with this name already exists.
    SkippedDuplicate,
    /// Nothing was inserted.
    Failed(ImportError),
}

#[derive(Debug)]
pub struct RecordOutcome {
    /// Upstream naming key, if present.
    pub name: Option<String>,
    /// Where the document's tax lines came from, once reconciled.
    pub tax_source: Option<TaxSource>,
    pub status: RecordStatus,
}

/// Per-record outcomes of one batch, in input order.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl ImportReport {
    /// Records that produced a document (draft or submitted).
    pub fn inserted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    RecordStatus::Inserted | RecordStatus::Submitted | RecordStatus::SubmitFailed(_)
                )
            })
            .count()
    }

    pub fn submitted(&self) -> usize {
        self.count(|s| matches!(s, RecordStatus::Submitted))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RecordStatus::SkippedDuplicate))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RecordStatus::Failed(_)))
    }

    pub fn outcome(&self, name: &str) -> Option<&RecordOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.name.as_deref() == Some(name))
    }

    fn count(&self, pred: impl Fn(&RecordStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Title used when logging a failed record: naming key (20 chars) and
/// customer (40 chars).
pub fn failure_title(name: &str, customer: &str) -> String {
    let name: String = name.chars().take(20).collect();
    let customer: String = customer.chars().take(40).collect();
    format!("Import Error: {name} - {customer}")
}

/// Runs records through resolution, reconciliation, assembly and
/// persistence against a [`Store`].
#[derive(Debug, Clone)]
pub struct Importer {
    config: ImportConfig,
    context: ImportContext,
}

impl Importer {
    pub fn new(config: ImportConfig, context: ImportContext) -> Self {
        Self { config, context }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn context(&self) -> &ImportContext {
        &self.context
    }

    /// Import undecoded payloads. A payload that fails to decode fails only
    /// its own record.
    pub fn import_payloads<S>(
        &self,
        store: &mut S,
        payloads: &[Value],
        kind: DocumentKind,
        mode: ImportMode,
    ) -> ImportReport
    where
        S: Store + ?Sized,
    {
        let span = info_span!(
            "import",
            kind = kind.label(),
            ?mode,
            actor = %self.context.actor,
            records = payloads.len()
        );
        let _guard = span.enter();

        let mut report = ImportReport::default();
        for payload in payloads {
            let outcome = match ExternalInvoiceRecord::from_value(payload) {
                Ok(record) => self.import_one(store, &record, kind, mode),
                Err(e) => {
                    let name = raw_field(payload, "Naming Series");
                    error!(
                        title = %failure_title(name, raw_field(payload, "Customer Name")),
                        error = %e,
                        "record import failed"
                    );
                    RecordOutcome {
                        name: Some(name.to_string()).filter(|n| !n.is_empty()),
                        tax_source: None,
                        status: RecordStatus::Failed(e),
                    }
                }
            };
            report.outcomes.push(outcome);
        }
        log_summary(&report);
        report
    }

    /// Import decoded records.
    pub fn import_records<S>(
        &self,
        store: &mut S,
        records: &[ExternalInvoiceRecord],
        kind: DocumentKind,
        mode: ImportMode,
    ) -> ImportReport
    where
        S: Store + ?Sized,
    {
        let span = info_span!(
            "import",
            kind = kind.label(),
            ?mode,
            actor = %self.context.actor,
            records = records.len()
        );
        let _guard = span.enter();

        let outcomes = records
            .iter()
            .map(|record| self.import_one(store, record, kind, mode))
            .collect();
        let report = ImportReport { outcomes };
        log_summary(&report);
        report
    }

    /// Import one record, logging instead of propagating failures.
    pub fn import_one<S>(
        &self,
        store: &mut S,
        record: &ExternalInvoiceRecord,
        kind: DocumentKind,
        mode: ImportMode,
    ) -> RecordOutcome
    where
        S: Store + ?Sized,
    {
        let name = non_empty(&record.naming_series).map(str::to_string);
        let mut tax_source = None;

        let status = match self.process(store, record, kind, mode, &mut tax_source) {
            Ok(status) => status,
            Err(e) => {
                error!(
                    title = %failure_title(
                        record.naming_series.as_deref().unwrap_or(""),
                        record.customer_name.as_deref().unwrap_or(""),
                    ),
                    error = %e,
                    details = ?e,
                    "record import failed"
                );
                RecordStatus::Failed(e)
            }
        };

        RecordOutcome {
            name,
            tax_source,
            status,
        }
    }

    fn process<S>(
        &self,
        store: &mut S,
        record: &ExternalInvoiceRecord,
        kind: DocumentKind,
        mode: ImportMode,
        tax_source: &mut Option<TaxSource>,
    ) -> Result<RecordStatus, ImportError>
    where
        S: Store + ?Sized,
    {
        let name =
            non_empty(&record.naming_series).ok_or(ImportError::MissingField("Naming Series"))?;

        if store.invoice_exists(name)? {
            info!(invoice = %name, kind = kind.label(), "skipping duplicate");
            return Ok(RecordStatus::SkippedDuplicate);
        }

        let company_name = non_empty(&record.company_name).unwrap_or("");
        let company = resolve::resolve_company(&*store, company_name, &self.config)?;
        let customer =
            non_empty(&record.customer_name).ok_or(ImportError::MissingField("Customer Name"))?;
        let tax_id = non_empty(&record.tax_id);
        let posting_date =
            parse_posting_date(record.posting_date.as_deref(), self.context.run_date)?;

        resolve::ensure_customer(store, customer, tax_id)?;
        if let Some(address) = self.billing_address(record, customer, kind) {
            resolve::ensure_address(store, customer, address)?;
        }

        let mut lines: Vec<DocumentLine> = Vec::with_capacity(record.items.len());
        for item in &record.items {
            let code = non_empty(&item.item_code).ok_or(ImportError::MissingField("Item_Code"))?;
            let item_name = non_empty(&item.item_name).unwrap_or(code);
            let description = non_empty(&item.description).unwrap_or(item_name);
            let uom = non_empty(&item.uom).unwrap_or(self.config.default_uom.as_str());

            let mut qty = item.qty_or_default();
            if kind == DocumentKind::CreditNote && (item.qty_is_null() || qty.is_zero()) {
                warn!(item = %code, invoice = %name, "zero or null quantity on credit note, using -1");
                qty = Decimal::NEGATIVE_ONE;
            }

            resolve::ensure_uom(store, uom)?;
            resolve::ensure_item(
                store,
                &company.name,
                &ItemFields {
                    code,
                    name: item_name,
                    description,
                    uom,
                    tax_template: non_empty(&item.tax_template),
                },
                &self.config,
            )?;

            lines.push(
                DocumentLineBuilder::new(code, item_name, qty, item.rate_or_default())
                    .description(description)
                    .uom(uom)
                    .income_account(&company.income_account)
                    .build(),
            );
        }

        let taxes = reconcile_taxes(
            &*store,
            &company.name,
            record.items.iter().map(|i| non_empty(&i.tax_template)),
        )?;
        *tax_source = Some(taxes.source);
        if taxes.source == TaxSource::None {
            warn!(invoice = %name, company = %company.name, "document has no tax lines");
        }

        let mut builder = DocumentBuilder::new(name, posting_date)
            .due_date(self.context.run_date)
            .customer(customer)
            .company(&company.name)
            .tax_id(tax_id.map(str::to_string))
            .currency(&company.currency)
            .debit_to(&company.receivable_account)
            .lines(lines)
            .taxes(taxes.lines);
        if kind == DocumentKind::CreditNote {
            builder = builder
                .return_against(non_empty(&record.return_against).map(str::to_string))
                .return_reason(non_empty(&record.return_reason).map(str::to_string));
        }
        let doc = builder.build()?;

        store.insert_invoice(doc)?;
        store.commit()?;
        info!(invoice = %name, kind = kind.label(), "inserted draft");

        if mode == ImportMode::Draft {
            return Ok(RecordStatus::Inserted);
        }

        match store.submit_invoice(name).and_then(|()| store.commit()) {
            Ok(()) => {
                info!(invoice = %name, "submitted");
                Ok(RecordStatus::Submitted)
            }
            Err(e) => {
                warn!(invoice = %name, error = %e, "submit failed, draft kept");
                Ok(RecordStatus::SubmitFailed(e.into()))
            }
        }
    }

    /// The billing address to ensure for this record, if any.
    ///
    /// Sales invoices need a title and a display string and are parsed.
    /// Credit notes need only a title and use the fallback layout unless
    /// credit-note parsing is switched on.
    fn billing_address(
        &self,
        record: &ExternalInvoiceRecord,
        customer: &str,
        kind: DocumentKind,
    ) -> Option<NewAddress> {
        let title = non_empty(&record.address_title)?;
        let display = non_empty(&record.address_display);
        match (kind, display) {
            (DocumentKind::SalesInvoice, Some(display)) => Some(resolve::parsed_billing_address(
                title,
                display,
                customer,
                &self.config,
            )),
            (DocumentKind::SalesInvoice, None) => None,
            (DocumentKind::CreditNote, Some(display)) if self.config.parse_credit_note_addresses => {
                Some(resolve::parsed_billing_address(
                    title,
                    display,
                    customer,
                    &self.config,
                ))
            }
            (DocumentKind::CreditNote, _) => Some(resolve::fallback_billing_address(
                title,
                customer,
                &self.config,
            )),
        }
    }
}

fn log_summary(report: &ImportReport) {
    info!(
        inserted = report.inserted(),
        submitted = report.submitted(),
        skipped = report.skipped(),
        failed = report.failed(),
        "import finished"
    );
}

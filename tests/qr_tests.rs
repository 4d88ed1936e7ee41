//! Submitted-invoice listing with ZATCA QR payloads.
//!
//! Run with: `cargo test --features zatca --test qr_tests`

#![cfg(feature = "zatca")]

use chrono::NaiveDate;
use invoice_bridge::core::*;
use invoice_bridge::import::*;
use invoice_bridge::qr::*;
use invoice_bridge::store::{CompanyRepo, InMemoryStore, InvoiceRepo};
use rust_decimal_macros::dec;
use serde_json::{Value, json};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn store(seller_vat: Option<&str>) -> InMemoryStore {
    let mut company = Company::new("Acme KSA")
        .income_account("Sales - AK")
        .receivable_account("Debtors - AK");
    if let Some(vat) = seller_vat {
        company = company.tax_id(vat);
    }
    InMemoryStore::new()
        .with_company(company)
        .with_account("VAT 15% - AK", "Acme KSA")
        .with_item_tax_template(ItemTaxTemplate {
            name: "VAT 15%".into(),
            company: "Acme KSA".into(),
            rows: vec![ItemTaxRow {
                tax_type: "VAT 15% - AK".into(),
                tax_rate: dec!(15),
            }],
        })
}

fn invoice(name: &str, posting_date: &str) -> Value {
    json!({
        "Naming Series": name,
        "Customer Name": "Al Noor Trading",
        "Company Name": "Acme KSA",
        "Posting Date": posting_date,
        "Items": [{"Item_Code": "SRV", "Qty": 1, "Rate": "100", "Item_Tax_Template": "VAT 15%"}]
    })
}

fn import(store: &mut InMemoryStore, payloads: &[Value], mode: ImportMode) {
    let importer = Importer::new(
        ImportConfig::default(),
        ImportContext::new(ADMINISTRATOR, date(2024, 6, 1)),
    );
    importer.import_payloads(store, payloads, DocumentKind::SalesInvoice, mode);
}

#[test]
fn lists_submitted_newest_first() {
    let mut store = store(Some("300000000000003"));
    import(
        &mut store,
        &[invoice("SINV-0001", "2024-05-01"), invoice("SINV-0002", "2024-05-20")],
        ImportMode::Submit,
    );
    import(&mut store, &[invoice("SINV-0003", "2024-05-30")], ImportMode::Draft);

    let report = submitted_invoices_with_qr(&store, &ZatcaTlvProvider);

    assert!(report.is_success());
    let names: Vec<_> = report.invoices().iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["SINV-0002", "SINV-0001"]);
    assert!(report.invoices().iter().all(|i| i.qr_code.is_some()));
}

#[test]
fn zatca_payload_snapshot() {
    let mut store = store(Some("300000000000003"));
    import(&mut store, &[invoice("SINV-0001", "2024-05-01")], ImportMode::Submit);

    let report = submitted_invoices_with_qr(&store, &ZatcaTlvProvider);
    let entry = &report.invoices()[0];

    assert_eq!(entry.grand_total, dec!(115.00));
    assert_eq!(entry.total_taxes_and_charges, dec!(15.00));
    insta::assert_snapshot!(
        entry.qr_code.as_deref().unwrap(),
        @"AQhBY21lIEtTQQIPMzAwMDAwMDAwMDAwMDAzAxQyMDI0LTA1LTAxVDAwOjAwOjAwWgQGMTE1LjAwBQUxNS4wMA=="
    );
}

#[test]
fn missing_seller_vat_keeps_invoice_without_qr() {
    let mut store = store(None);
    import(&mut store, &[invoice("SINV-0001", "2024-05-01")], ImportMode::Submit);

    let report = submitted_invoices_with_qr(&store, &ZatcaTlvProvider);

    assert_eq!(report.invoices().len(), 1);
    assert!(report.invoices()[0].qr_code.is_none());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["count"], 1);
    assert!(json["invoices"][0]["qr_code"].is_null());
}

#[test]
fn empty_ledger_is_success() {
    let store = store(Some("300000000000003"));
    let report = submitted_invoices_with_qr(&store, &ZatcaTlvProvider);
    assert_eq!(
        report,
        QrReport::Success {
            count: 0,
            invoices: vec![]
        }
    );
}

struct FailingProvider;

impl QrProvider for FailingProvider {
    fn qr_code(
        &self,
        _invoice: &InvoiceSummary,
        _seller: Option<&Company>,
    ) -> Result<Option<String>, QrError> {
        Err(QrError::Provider("signing service unavailable".into()))
    }
}

#[test]
fn provider_failure_is_isolated() {
    let mut store = store(Some("300000000000003"));
    import(
        &mut store,
        &[invoice("SINV-0001", "2024-05-01"), invoice("SINV-0002", "2024-05-02")],
        ImportMode::Submit,
    );

    let report = submitted_invoices_with_qr(&store, &FailingProvider);

    assert_eq!(report.invoices().len(), 2);
    assert!(report.invoices().iter().all(|i| i.qr_code.is_none()));
}

/// Ledger whose invoice listing is unavailable.
struct OfflineLedger;

impl CompanyRepo for OfflineLedger {
    fn get_company(&self, _name: &str) -> Result<Option<Company>, StoreError> {
        Ok(None)
    }
}

impl InvoiceRepo for OfflineLedger {
    fn invoice_exists(&self, _name: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn insert_invoice(&mut self, _doc: AccountingDocument) -> Result<(), StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    fn submit_invoice(&mut self, _name: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    fn submitted_invoices(&self) -> Result<Vec<InvoiceSummary>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn listing_failure_returns_error_envelope() {
    let report = submitted_invoices_with_qr(&OfflineLedger, &ZatcaTlvProvider);

    assert!(!report.is_success());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Failed to fetch submitted invoices");
}

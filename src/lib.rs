//! # invoice-bridge
//!
//! Imports sales invoices and credit notes from a line-of-business REST API
//! into an ERP ledger. Masters referenced by a record (customer, billing
//! address, unit of measure, item) are created on the fly, tax lines are
//! reconciled per company, and submitted invoices can be listed with
//! ZATCA phase-1 QR payloads.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use invoice_bridge::core::*;
//! use invoice_bridge::import::*;
//! use invoice_bridge::store::InMemoryStore;
//! use rust_decimal_macros::dec;
//!
//! let mut store = InMemoryStore::new()
//!     .with_company(
//!         Company::new("Acme KSA")
//!             .income_account("Sales - AK")
//!             .receivable_account("Debtors - AK"),
//!     )
//!     .with_account("VAT 15% - AK", "Acme KSA")
//!     .with_item_tax_template(ItemTaxTemplate {
//!         name: "VAT 15%".into(),
//!         company: "Acme KSA".into(),
//!         rows: vec![ItemTaxRow { tax_type: "VAT 15% - AK".into(), tax_rate: dec!(15) }],
//!     });
//!
//! let payloads = parse_envelope(r#"{
//!     "status": "success",
//!     "payloads": [{
//!         "Naming Series": "SINV-0001",
//!         "Customer Name": "Al Noor Trading",
//!         "Company Name": "Acme KSA",
//!         "Posting Date": "2024-05-01",
//!         "Items": [{"Item_Code": "SRV", "Qty": 2, "Rate": "100", "Item_Tax_Template": "VAT 15%"}]
//!     }]
//! }"#).unwrap();
//!
//! let context = ImportContext::new("Administrator", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
//! let importer = Importer::new(ImportConfig::default(), context);
//! let report = importer.import_payloads(&mut store, &payloads, DocumentKind::SalesInvoice, ImportMode::Draft);
//!
//! assert_eq!(report.inserted(), 1);
//! let invoice = store.invoice("SINV-0001").unwrap();
//! assert_eq!(invoice.totals.as_ref().unwrap().grand_total, dec!(230.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, address parsing, import pipeline, in-memory store |
//! | `http` | [`import::HttpSource`] fetching envelopes over HTTPS |
//! | `zatca` | ZATCA phase-1 TLV QR provider |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod store;

#[cfg(feature = "core")]
pub mod import;

#[cfg(feature = "core")]
pub mod qr;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

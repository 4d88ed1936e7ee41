#![no_main]

use chrono::NaiveDate;
use invoice_bridge::core::{Company, ImportContext};
use invoice_bridge::import::{DocumentKind, ImportConfig, ImportMode, Importer};
use invoice_bridge::store::InMemoryStore;
use libfuzzer_sys::fuzz_target;

// Arbitrary payloads must fail their own record, never the process.
fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let mut store = InMemoryStore::new().with_company(
        Company::new("AC")
            .income_account("Sales - AC")
            .receivable_account("Debtors - AC"),
    );
    let Some(run_date) = NaiveDate::from_ymd_opt(2024, 1, 1) else {
        return;
    };
    let importer = Importer::new(ImportConfig::default(), ImportContext::new("fuzz", run_date));
    for kind in [DocumentKind::SalesInvoice, DocumentKind::CreditNote] {
        let _ = importer.import_payloads(&mut store, std::slice::from_ref(&payload), kind, ImportMode::Submit);
    }
});

//! Submitted-invoice listing with compliance QR codes.
//!
//! QR payloads come from a [`QrProvider`]. A provider failure never drops
//! an invoice from the listing: the entry is kept with `qr_code: null`.

#[cfg(feature = "zatca")]
mod tlv;

#[cfg(feature = "zatca")]
pub use tlv::{ZatcaTag, ZatcaTlvProvider, encode_tlv, zatca_phase1_payload};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::core::{Company, InvoiceSummary, StoreError};
use crate::store::{CompanyRepo, InvoiceRepo};

/// Errors raised while computing a QR payload.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QrError {
    /// The seller company has no VAT registration number.
    #[error("seller {0} has no VAT number")]
    MissingSellerVat(String),

    /// A TLV value exceeds 255 bytes.
    #[error("TLV value for tag {tag} is {len} bytes, max 255")]
    ValueTooLong { tag: u8, len: usize },

    /// The provider's backend failed.
    #[error("QR provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Computes the QR payload of a submitted invoice.
pub trait QrProvider {
    /// The value to publish as `qr_code`, or `None` if the invoice has no QR.
    fn qr_code(
        &self,
        invoice: &InvoiceSummary,
        seller: Option<&Company>,
    ) -> Result<Option<String>, QrError>;
}

/// One submitted invoice in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceQrEntry {
    pub name: String,
    pub customer: String,
    pub posting_date: NaiveDate,
    pub grand_total: Decimal,
    pub total_taxes_and_charges: Decimal,
    pub qr_code: Option<String>,
}

/// Status envelope returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QrReport {
    Success {
        count: usize,
        invoices: Vec<InvoiceQrEntry>,
    },
    Error {
        message: String,
    },
}

impl QrReport {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The entries of a successful report; empty for an error report.
    pub fn invoices(&self) -> &[InvoiceQrEntry] {
        match self {
            Self::Success { invoices, .. } => invoices,
            Self::Error { .. } => &[],
        }
    }
}

/// List all submitted invoices, newest first, each with a best-effort QR code.
pub fn submitted_invoices_with_qr<S, P>(store: &S, provider: &P) -> QrReport
where
    S: InvoiceRepo + CompanyRepo + ?Sized,
    P: QrProvider + ?Sized,
{
    let summaries = match store.submitted_invoices() {
        Ok(list) => list,
        Err(e) => {
            error!(error = %e, "error fetching submitted invoices");
            return QrReport::Error {
                message: "Failed to fetch submitted invoices".into(),
            };
        }
    };

    let invoices: Vec<InvoiceQrEntry> = summaries
        .into_iter()
        .map(|summary| {
            let qr_code = qr_for(store, provider, &summary).unwrap_or_else(|e| {
                error!(invoice = %summary.name, error = %e, "QR generation failed");
                None
            });
            InvoiceQrEntry {
                name: summary.name,
                customer: summary.customer,
                posting_date: summary.posting_date,
                grand_total: summary.grand_total,
                total_taxes_and_charges: summary.total_taxes_and_charges,
                qr_code,
            }
        })
        .collect();

    QrReport::Success {
        count: invoices.len(),
        invoices,
    }
}

fn qr_for<S, P>(store: &S, provider: &P, summary: &InvoiceSummary) -> Result<Option<String>, QrError>
where
    S: CompanyRepo + ?Sized,
    P: QrProvider + ?Sized,
{
    let seller = store.get_company(&summary.company)?;
    provider.qr_code(summary, seller.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn report_serializes_with_status_tag() {
        let report = QrReport::Success {
            count: 1,
            invoices: vec![InvoiceQrEntry {
                name: "SINV-1".into(),
                customer: "Al Noor".into(),
                posting_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                grand_total: dec!(115),
                total_taxes_and_charges: dec!(15),
                qr_code: None,
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["count"], 1);
        assert!(json["invoices"][0]["qr_code"].is_null());

        let err = serde_json::to_value(QrReport::Error {
            message: "Failed to fetch submitted invoices".into(),
        })
        .unwrap();
        assert_eq!(err["status"], "error");
    }
}

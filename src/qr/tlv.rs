//! ZATCA phase-1 simplified-invoice QR payloads.
//!
//! The payload is a sequence of TLV fields, each `tag (1 byte)`,
//! `length (1 byte)`, `value (UTF-8)`, base64-encoded as a whole.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{QrError, QrProvider};
use crate::core::{Company, InvoiceSummary};

/// Phase-1 field tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ZatcaTag {
    SellerName = 1,
    SellerVat = 2,
    Timestamp = 3,
    InvoiceTotal = 4,
    VatTotal = 5,
}

/// Encode `(tag, value)` pairs as TLV bytes.
///
/// # Errors
///
/// [`QrError::ValueTooLong`] if a value exceeds 255 bytes once UTF-8 encoded.
pub fn encode_tlv(fields: &[(u8, &str)]) -> Result<Vec<u8>, QrError> {
    let mut out = Vec::with_capacity(fields.iter().map(|(_, v)| v.len() + 2).sum());
    for &(tag, value) in fields {
        let len = u8::try_from(value.len())
            .map_err(|_| QrError::ValueTooLong { tag, len: value.len() })?;
        out.push(tag);
        out.push(len);
        out.extend_from_slice(value.as_bytes());
    }
    Ok(out)
}

fn amount(value: Decimal) -> String {
    let mut v = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    v.rescale(2);
    v.to_string()
}

/// Base64 phase-1 payload for `invoice` issued by `seller`.
///
/// # Errors
///
/// [`QrError::MissingSellerVat`] if the seller has no tax id.
pub fn zatca_phase1_payload(invoice: &InvoiceSummary, seller: &Company) -> Result<String, QrError> {
    let vat = seller
        .tax_id
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| QrError::MissingSellerVat(seller.name.clone()))?;

    let timestamp = invoice.posting_date.format("%Y-%m-%dT00:00:00Z").to_string();
    let total = amount(invoice.grand_total);
    let vat_total = amount(invoice.total_taxes_and_charges);

    let bytes = encode_tlv(&[
        (ZatcaTag::SellerName as u8, seller.name.as_str()),
        (ZatcaTag::SellerVat as u8, vat),
        (ZatcaTag::Timestamp as u8, timestamp.as_str()),
        (ZatcaTag::InvoiceTotal as u8, total.as_str()),
        (ZatcaTag::VatTotal as u8, vat_total.as_str()),
    ])?;
    Ok(STANDARD.encode(bytes))
}

/// [`QrProvider`] producing ZATCA phase-1 payloads.
///
/// An invoice whose company cannot be found gets no QR code.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZatcaTlvProvider;

impl QrProvider for ZatcaTlvProvider {
    fn qr_code(
        &self,
        invoice: &InvoiceSummary,
        seller: Option<&Company>,
    ) -> Result<Option<String>, QrError> {
        match seller {
            Some(seller) => zatca_phase1_payload(invoice, seller).map(Some),
            None => Ok(None),
        }
    }
}

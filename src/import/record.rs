//! Upstream payload shapes.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::ImportError;

/// Response envelope returned by the upstream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Option<String>,
    #[serde(default)]
    pub payloads: Vec<Value>,
}

/// Decode an envelope body and return its raw payloads.
///
/// Individual payloads stay undecoded so that one malformed record does
/// not take the batch down with it.
///
/// # Errors
///
/// Returns [`ImportError::Envelope`] if the body is not JSON of the
/// expected shape or the status is not `success`.
pub fn parse_envelope(body: &str) -> Result<Vec<Value>, ImportError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| ImportError::Envelope(e.to_string()))?;
    match envelope.status.as_deref() {
        Some("success") => Ok(envelope.payloads),
        other => Err(ImportError::Envelope(format!(
            "unexpected status {}",
            other.unwrap_or("<missing>")
        ))),
    }
}

/// One sales invoice or credit note as sent upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalInvoiceRecord {
    #[serde(rename = "Naming Series", default)]
    pub naming_series: Option<String>,
    #[serde(rename = "Customer Name", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "Company Name", default)]
    pub company_name: Option<String>,
    #[serde(rename = "Tax ID", default)]
    pub tax_id: Option<String>,
    #[serde(rename = "Posting Date", default)]
    pub posting_date: Option<String>,
    #[serde(rename = "Customer Address", default)]
    pub address_title: Option<String>,
    #[serde(rename = "Address Display", default)]
    pub address_display: Option<String>,
    #[serde(rename = "Items", default)]
    pub items: Vec<ExternalLineItem>,
    /// Credit notes only.
    #[serde(rename = "Against Invoice", default)]
    pub return_against: Option<String>,
    /// Credit notes only.
    #[serde(rename = "CUSTOMER_RETURN_REASON", default)]
    pub return_reason: Option<String>,
}

/// One line of an upstream record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalLineItem {
    #[serde(rename = "Item_Code", default)]
    pub item_code: Option<String>,
    #[serde(rename = "Item_Name", default)]
    pub item_name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    /// Signed quantity. `None` when the key is absent, `Some(None)` when it
    /// is present but null.
    #[serde(
        rename = "Qty",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub qty: Option<Option<Decimal>>,
    /// Unit rate; defaults to 0.
    #[serde(rename = "Rate", default)]
    pub rate: Option<Decimal>,
    #[serde(rename = "Uom", default)]
    pub uom: Option<String>,
    #[serde(rename = "Item_Tax_Template", default)]
    pub tax_template: Option<String>,
}

impl ExternalInvoiceRecord {
    /// Decode a raw payload.
    pub fn from_value(value: &Value) -> Result<Self, ImportError> {
        Self::deserialize(value).map_err(|e| ImportError::Payload(e.to_string()))
    }
}

impl ExternalLineItem {
    /// The sent quantity, 1 when absent or null.
    pub fn qty_or_default(&self) -> Decimal {
        self.qty.flatten().unwrap_or(Decimal::ONE)
    }

    /// True if `Qty` was sent as an explicit null.
    pub fn qty_is_null(&self) -> bool {
        matches!(self.qty, Some(None))
    }

    pub fn rate_or_default(&self) -> Decimal {
        self.rate.unwrap_or(Decimal::ZERO)
    }
}

/// Keeps a present-but-null field apart from a missing one.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Treat empty and whitespace-only strings as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Read a string field from an undecoded payload, for error titles.
pub(crate) fn raw_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an upstream posting date, falling back to `default` when absent.
pub fn parse_posting_date(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate, ImportError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date());
        }
    }
    Err(ImportError::InvalidDate(raw.to_string()))
}

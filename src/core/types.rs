use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Company master — owns accounts, tax templates and documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Company name (primary key).
    pub name: String,
    /// Default currency (ISO 4217). Importers fall back to SAR when unset.
    pub default_currency: Option<String>,
    /// Income account injected into every document line.
    pub default_income_account: Option<String>,
    /// Receivable account used as the document's `debit_to`.
    pub default_receivable_account: Option<String>,
    /// Seller VAT registration number, printed in compliance QR codes.
    pub tax_id: Option<String>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_currency: None,
            default_income_account: None,
            default_receivable_account: None,
            tax_id: None,
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.default_currency = Some(code.into());
        self
    }

    pub fn income_account(mut self, account: impl Into<String>) -> Self {
        self.default_income_account = Some(account.into());
        self
    }

    pub fn receivable_account(mut self, account: impl Into<String>) -> Self {
        self.default_receivable_account = Some(account.into());
        self
    }

    pub fn tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }
}

/// Customer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerType {
    Company,
    Individual,
}

/// Customer master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub customer_type: CustomerType,
    pub tax_id: Option<String>,
}

/// Address classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressType {
    Billing,
    Shipping,
}

impl AddressType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Billing => "Billing",
            Self::Shipping => "Shipping",
        }
    }
}

/// Address master, linked to one or more customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Store-assigned name.
    pub name: String,
    pub title: String,
    pub address_type: AddressType,
    pub line1: String,
    pub city: String,
    pub pincode: String,
    pub district: String,
    pub building_number: String,
    pub country: String,
    /// Names of the customers this address is linked to.
    pub customer_links: Vec<String>,
}

/// Address fields before the store assigns a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub title: String,
    pub address_type: AddressType,
    pub line1: String,
    pub city: String,
    pub pincode: String,
    pub district: String,
    pub building_number: String,
    pub country: String,
    pub customer_links: Vec<String>,
}

/// Item master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub code: String,
    pub name: String,
    pub description: String,
    pub stock_uom: String,
    pub item_group: String,
    pub is_sales_item: bool,
    pub is_stock_item: bool,
    /// Item tax templates attached to the item.
    pub tax_templates: Vec<String>,
}

/// General ledger account, scoped to one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub company: String,
}

/// A row of an item tax template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTaxRow {
    /// Tax account.
    pub tax_type: String,
    /// Rate in percent.
    pub tax_rate: Decimal,
}

/// Company-scoped item tax template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTaxTemplate {
    pub name: String,
    pub company: String,
    pub rows: Vec<ItemTaxRow>,
}

/// How a tax line's amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeType {
    /// Rate percent of the document net total.
    #[serde(rename = "On Net Total")]
    OnNetTotal,
    /// Fixed amount taken from the tax row.
    #[serde(rename = "Actual")]
    Actual,
    /// Rate percent of the previous row's tax amount.
    #[serde(rename = "On Previous Row Amount")]
    OnPreviousRowAmount,
    /// Rate percent of the running total up to the previous row.
    #[serde(rename = "On Previous Row Total")]
    OnPreviousRowTotal,
    /// Rate per unit of total quantity.
    #[serde(rename = "On Item Quantity")]
    OnItemQuantity,
}

impl ChargeType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OnNetTotal => "On Net Total",
            Self::Actual => "Actual",
            Self::OnPreviousRowAmount => "On Previous Row Amount",
            Self::OnPreviousRowTotal => "On Previous Row Total",
            Self::OnItemQuantity => "On Item Quantity",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "On Net Total" => Some(Self::OnNetTotal),
            "Actual" => Some(Self::Actual),
            "On Previous Row Amount" => Some(Self::OnPreviousRowAmount),
            "On Previous Row Total" => Some(Self::OnPreviousRowTotal),
            "On Item Quantity" => Some(Self::OnItemQuantity),
            _ => None,
        }
    }
}

/// A row of a sales taxes and charges template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTaxRow {
    pub charge_type: ChargeType,
    pub account_head: String,
    pub rate: Decimal,
    /// Fixed amount for [`ChargeType::Actual`] rows.
    pub tax_amount: Option<Decimal>,
}

/// Company-scoped sales taxes and charges template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTaxTemplate {
    pub name: String,
    pub company: String,
    /// At most one template per company should carry this flag.
    pub is_default: bool,
    pub rows: Vec<SalesTaxRow>,
}

/// Deduplication key for tax lines within one document.
///
/// Rates compare by value, so `15` and `15.00` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaxLineKey {
    pub account: String,
    pub rate: Decimal,
}

/// A tax line on an accounting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTaxLine {
    pub charge_type: ChargeType,
    pub account_head: String,
    pub rate: Decimal,
    /// Fixed amount, only meaningful for [`ChargeType::Actual`].
    pub tax_amount: Option<Decimal>,
    /// Provenance, e.g. "From template VAT 15%".
    pub description: String,
}

impl AggregatedTaxLine {
    pub fn key(&self) -> TaxLineKey {
        TaxLineKey {
            account: self.account_head.clone(),
            rate: self.rate,
        }
    }
}

/// A line on an accounting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    pub item_code: String,
    pub item_name: String,
    pub description: String,
    /// Signed quantity; negative on returns.
    pub qty: Decimal,
    pub rate: Decimal,
    pub uom: String,
    pub income_account: String,
    /// `qty * rate`, set when totals are calculated.
    pub amount: Option<Decimal>,
}

/// Document lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocStatus {
    Draft,
    Submitted,
}

impl DocStatus {
    /// Numeric docstatus (0 draft, 1 submitted).
    pub fn code(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Submitted => 1,
        }
    }
}

/// Document totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line amounts.
    pub net_total: Decimal,
    /// Tax amount per tax line, in tax line order.
    pub tax_amounts: Vec<Decimal>,
    /// Sum of all tax amounts.
    pub total_taxes_and_charges: Decimal,
    /// `net_total + total_taxes_and_charges`.
    pub grand_total: Decimal,
}

/// A sales invoice or credit note ready for the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingDocument {
    /// Identity, taken verbatim from the upstream naming key.
    pub name: String,
    pub customer: String,
    pub company: String,
    pub tax_id: Option<String>,
    pub currency: String,
    /// Always 1; documents are booked in company currency.
    pub conversion_rate: Decimal,
    pub posting_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Receivable account.
    pub debit_to: String,
    pub lines: Vec<DocumentLine>,
    pub taxes: Vec<AggregatedTaxLine>,
    pub is_return: bool,
    /// Original invoice for a credit note.
    pub return_against: Option<String>,
    pub return_reason: Option<String>,
    pub status: DocStatus,
    pub totals: Option<DocumentTotals>,
}

/// Listing row for submitted documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub name: String,
    pub customer: String,
    pub company: String,
    pub posting_date: NaiveDate,
    pub grand_total: Decimal,
    pub total_taxes_and_charges: Decimal,
}

impl AccountingDocument {
    pub fn summary(&self) -> InvoiceSummary {
        let (grand_total, total_taxes_and_charges) = match &self.totals {
            Some(t) => (t.grand_total, t.total_taxes_and_charges),
            None => (Decimal::ZERO, Decimal::ZERO),
        };
        InvoiceSummary {
            name: self.name.clone(),
            customer: self.customer.clone(),
            company: self.company.clone(),
            posting_date: self.posting_date,
            grand_total,
            total_taxes_and_charges,
        }
    }
}

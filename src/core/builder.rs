use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ImportError;
use super::totals;
use super::types::*;

/// Builder for accounting documents.
///
/// ```
/// use invoice_bridge::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// let doc = DocumentBuilder::new("SINV-0001", date)
///     .customer("Al Noor Trading")
///     .company("Acme KSA")
///     .debit_to("Debtors - AK")
///     .add_line(DocumentLineBuilder::new("SRV-1", "Consulting", dec!(2), dec!(500))
///         .income_account("Sales - AK")
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(doc.totals.unwrap().grand_total, dec!(1000));
/// ```
pub struct DocumentBuilder {
    name: String,
    posting_date: NaiveDate,
    due_date: Option<NaiveDate>,
    customer: Option<String>,
    company: Option<String>,
    tax_id: Option<String>,
    currency: String,
    debit_to: Option<String>,
    lines: Vec<DocumentLine>,
    taxes: Vec<AggregatedTaxLine>,
    is_return: bool,
    return_against: Option<String>,
    return_reason: Option<String>,
}

impl DocumentBuilder {
    pub fn new(name: impl Into<String>, posting_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            posting_date,
            due_date: None,
            customer: None,
            company: None,
            tax_id: None,
            currency: "SAR".to_string(),
            debit_to: None,
            lines: Vec::new(),
            taxes: Vec::new(),
            is_return: false,
            return_against: None,
            return_reason: None,
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn tax_id(mut self, tax_id: Option<String>) -> Self {
        self.tax_id = tax_id;
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn debit_to(mut self, account: impl Into<String>) -> Self {
        self.debit_to = Some(account.into());
        self
    }

    pub fn add_line(mut self, line: DocumentLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = DocumentLine>) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn taxes(mut self, taxes: impl IntoIterator<Item = AggregatedTaxLine>) -> Self {
        self.taxes.extend(taxes);
        self
    }

    /// Mark the document as a return (credit note) against `original`.
    pub fn return_against(mut self, original: Option<String>) -> Self {
        self.is_return = true;
        self.return_against = original;
        self
    }

    pub fn return_reason(mut self, reason: Option<String>) -> Self {
        self.return_reason = reason;
        self
    }

    /// Build the draft document and calculate its totals.
    pub fn build(self) -> Result<AccountingDocument, ImportError> {
        if self.name.trim().is_empty() {
            return Err(ImportError::Builder("document name is required".into()));
        }
        let customer = self
            .customer
            .ok_or_else(|| ImportError::Builder("customer is required".into()))?;
        let company = self
            .company
            .ok_or_else(|| ImportError::Builder("company is required".into()))?;
        let debit_to = self
            .debit_to
            .ok_or_else(|| ImportError::Builder("receivable account is required".into()))?;

        if self.lines.is_empty() {
            return Err(ImportError::Builder(
                "at least one line item is required".into(),
            ));
        }

        let mut doc = AccountingDocument {
            name: self.name,
            customer,
            company,
            tax_id: self.tax_id,
            currency: self.currency,
            conversion_rate: Decimal::ONE,
            posting_date: self.posting_date,
            due_date: self.due_date.unwrap_or(self.posting_date),
            debit_to,
            lines: self.lines,
            taxes: self.taxes,
            is_return: self.is_return,
            return_against: self.return_against,
            return_reason: self.return_reason,
            status: DocStatus::Draft,
            totals: None,
        };

        totals::calculate_totals(&mut doc)?;
        Ok(doc)
    }
}

/// Builder for document lines.
pub struct DocumentLineBuilder {
    item_code: String,
    item_name: String,
    description: Option<String>,
    qty: Decimal,
    rate: Decimal,
    uom: String,
    income_account: String,
}

impl DocumentLineBuilder {
    pub fn new(
        item_code: impl Into<String>,
        item_name: impl Into<String>,
        qty: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            item_code: item_code.into(),
            item_name: item_name.into(),
            description: None,
            qty,
            rate,
            uom: "Nos".to_string(),
            income_account: String::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn uom(mut self, uom: impl Into<String>) -> Self {
        self.uom = uom.into();
        self
    }

    pub fn income_account(mut self, account: impl Into<String>) -> Self {
        self.income_account = account.into();
        self
    }

    pub fn build(self) -> DocumentLine {
        DocumentLine {
            description: self.description.unwrap_or_else(|| self.item_name.clone()),
            item_code: self.item_code,
            item_name: self.item_name,
            qty: self.qty,
            rate: self.rate,
            uom: self.uom,
            income_account: self.income_account,
            amount: None,
        }
    }
}

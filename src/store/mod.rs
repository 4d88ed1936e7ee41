//! Repository traits over the ERP ledger.
//!
//! The importer depends only on these traits, so any backend (a REST
//! client for the ERP, a SQL database, the bundled [`InMemoryStore`]) can
//! be plugged in. Each trait covers one entity family; [`Store`] joins
//! them for the pipeline.

mod memory;

pub use memory::InMemoryStore;

use crate::core::{
    AccountingDocument, Company, Customer, InvoiceSummary, Item, ItemTaxTemplate, NewAddress,
    SalesTaxTemplate, StoreError,
};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Company masters.
pub trait CompanyRepo {
    fn get_company(&self, name: &str) -> Result<Option<Company>>;
}

/// Customer masters.
pub trait CustomerRepo {
    fn get_customer(&self, name: &str) -> Result<Option<Customer>>;

    fn create_customer(&mut self, customer: Customer) -> Result<()>;

    /// Replace the stored tax id of an existing customer.
    fn update_customer_tax_id(&mut self, name: &str, tax_id: &str) -> Result<()>;
}

/// Address masters and their customer links.
pub trait AddressRepo {
    /// Names of all addresses carrying this title.
    fn addresses_by_title(&self, title: &str) -> Result<Vec<String>>;

    /// Whether `address` is linked to `customer`.
    fn is_linked_to_customer(&self, address: &str, customer: &str) -> Result<bool>;

    /// Insert an address and return its store-assigned name.
    fn create_address(&mut self, address: NewAddress) -> Result<String>;

    /// Whether an address with this title is already linked to the customer.
    fn address_linked(&self, title: &str, customer: &str) -> Result<bool> {
        for name in self.addresses_by_title(title)? {
            if self.is_linked_to_customer(&name, customer)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Units of measure and item masters.
pub trait ItemRepo {
    fn uom_exists(&self, name: &str) -> Result<bool>;

    fn create_uom(&mut self, name: &str) -> Result<()>;

    fn item_exists(&self, code: &str) -> Result<bool>;

    fn create_item(&mut self, item: Item) -> Result<()>;
}

/// Tax templates and account ownership.
pub trait TaxRepo {
    /// The item tax template `name`, only if it belongs to `company`.
    fn item_tax_template(&self, name: &str, company: &str) -> Result<Option<ItemTaxTemplate>>;

    /// Owning company of a ledger account.
    fn account_company(&self, account: &str) -> Result<Option<String>>;

    /// The company's default sales taxes and charges template.
    fn default_sales_tax_template(&self, company: &str) -> Result<Option<SalesTaxTemplate>>;
}

/// Sales invoices and credit notes.
pub trait InvoiceRepo {
    fn invoice_exists(&self, name: &str) -> Result<bool>;

    /// Insert a draft under `doc.name`. Fails with [`StoreError::Duplicate`]
    /// if the name is taken.
    fn insert_invoice(&mut self, doc: AccountingDocument) -> Result<()>;

    /// Move a draft to the submitted state.
    fn submit_invoice(&mut self, name: &str) -> Result<()>;

    /// All submitted documents, newest posting date first.
    fn submitted_invoices(&self) -> Result<Vec<InvoiceSummary>>;

    /// Make everything written so far durable.
    fn commit(&mut self) -> Result<()>;
}

/// Everything the import pipeline needs from the ledger.
pub trait Store: CompanyRepo + CustomerRepo + AddressRepo + ItemRepo + TaxRepo + InvoiceRepo {}

impl<T> Store for T where
    T: CompanyRepo + CustomerRepo + AddressRepo + ItemRepo + TaxRepo + InvoiceRepo
{
}

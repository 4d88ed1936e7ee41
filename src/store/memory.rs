//! In-memory ledger.

use std::collections::{BTreeMap, BTreeSet};

use super::*;
use crate::core::{Account, Address, DocStatus};

/// A ledger held entirely in memory.
///
/// Useful for dry runs and tests. Masters are seeded through the `with_*`
/// and `add_*` methods; the import pipeline fills in the rest through the
/// repository traits.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    companies: BTreeMap<String, Company>,
    customers: BTreeMap<String, Customer>,
    addresses: BTreeMap<String, Address>,
    uoms: BTreeSet<String>,
    items: BTreeMap<String, Item>,
    accounts: BTreeMap<String, Account>,
    item_tax_templates: BTreeMap<String, ItemTaxTemplate>,
    sales_tax_templates: BTreeMap<String, SalesTaxTemplate>,
    invoices: BTreeMap<String, AccountingDocument>,
    commits: usize,
    reject_untaxed_submissions: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to submit documents without tax lines, the way a ledger with
    /// mandatory VAT would.
    pub fn reject_untaxed_submissions(mut self, reject: bool) -> Self {
        self.reject_untaxed_submissions = reject;
        self
    }

    pub fn with_company(mut self, company: Company) -> Self {
        self.add_company(company);
        self
    }

    pub fn with_account(mut self, account: impl Into<String>, company: impl Into<String>) -> Self {
        self.add_account(account, company);
        self
    }

    pub fn with_item_tax_template(mut self, template: ItemTaxTemplate) -> Self {
        self.add_item_tax_template(template);
        self
    }

    pub fn with_sales_tax_template(mut self, template: SalesTaxTemplate) -> Self {
        self.add_sales_tax_template(template);
        self
    }

    pub fn add_company(&mut self, company: Company) {
        self.companies.insert(company.name.clone(), company);
    }

    pub fn add_account(&mut self, account: impl Into<String>, company: impl Into<String>) {
        let account = Account {
            name: account.into(),
            company: company.into(),
        };
        self.accounts.insert(account.name.clone(), account);
    }

    pub fn add_item_tax_template(&mut self, template: ItemTaxTemplate) {
        self.item_tax_templates
            .insert(template.name.clone(), template);
    }

    pub fn add_sales_tax_template(&mut self, template: SalesTaxTemplate) {
        self.sales_tax_templates
            .insert(template.name.clone(), template);
    }

    pub fn customer(&self, name: &str) -> Option<&Customer> {
        self.customers.get(name)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.addresses.values()
    }

    pub fn item(&self, code: &str) -> Option<&Item> {
        self.items.get(code)
    }

    pub fn has_uom(&self, name: &str) -> bool {
        self.uoms.contains(name)
    }

    pub fn invoice(&self, name: &str) -> Option<&AccountingDocument> {
        self.invoices.get(name)
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.len()
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    fn next_address_name(&self, address: &NewAddress) -> String {
        let base = format!("{}-{}", address.title, address.address_type.label());
        if !self.addresses.contains_key(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.addresses.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl CompanyRepo for InMemoryStore {
    fn get_company(&self, name: &str) -> Result<Option<Company>> {
        Ok(self.companies.get(name).cloned())
    }
}

impl CustomerRepo for InMemoryStore {
    fn get_customer(&self, name: &str) -> Result<Option<Customer>> {
        Ok(self.customers.get(name).cloned())
    }

    fn create_customer(&mut self, customer: Customer) -> Result<()> {
        if self.customers.contains_key(&customer.name) {
            return Err(StoreError::duplicate("Customer", customer.name));
        }
        self.customers.insert(customer.name.clone(), customer);
        Ok(())
    }

    fn update_customer_tax_id(&mut self, name: &str, tax_id: &str) -> Result<()> {
        let customer = self
            .customers
            .get_mut(name)
            .ok_or_else(|| StoreError::not_found("Customer", name))?;
        customer.tax_id = Some(tax_id.to_string());
        Ok(())
    }
}

impl AddressRepo for InMemoryStore {
    fn addresses_by_title(&self, title: &str) -> Result<Vec<String>> {
        Ok(self
            .addresses
            .values()
            .filter(|a| a.title == title)
            .map(|a| a.name.clone())
            .collect())
    }

    fn is_linked_to_customer(&self, address: &str, customer: &str) -> Result<bool> {
        Ok(self
            .addresses
            .get(address)
            .is_some_and(|a| a.customer_links.iter().any(|c| c == customer)))
    }

    fn create_address(&mut self, address: NewAddress) -> Result<String> {
        let name = self.next_address_name(&address);
        self.addresses.insert(
            name.clone(),
            Address {
                name: name.clone(),
                title: address.title,
                address_type: address.address_type,
                line1: address.line1,
                city: address.city,
                pincode: address.pincode,
                district: address.district,
                building_number: address.building_number,
                country: address.country,
                customer_links: address.customer_links,
            },
        );
        Ok(name)
    }
}

impl ItemRepo for InMemoryStore {
    fn uom_exists(&self, name: &str) -> Result<bool> {
        Ok(self.uoms.contains(name))
    }

    fn create_uom(&mut self, name: &str) -> Result<()> {
        if !self.uoms.insert(name.to_string()) {
            return Err(StoreError::duplicate("UOM", name));
        }
        Ok(())
    }

    fn item_exists(&self, code: &str) -> Result<bool> {
        Ok(self.items.contains_key(code))
    }

    fn create_item(&mut self, item: Item) -> Result<()> {
        if self.items.contains_key(&item.code) {
            return Err(StoreError::duplicate("Item", item.code));
        }
        if !self.uoms.contains(&item.stock_uom) {
            return Err(StoreError::not_found("UOM", item.stock_uom));
        }
        self.items.insert(item.code.clone(), item);
        Ok(())
    }
}

impl TaxRepo for InMemoryStore {
    fn item_tax_template(&self, name: &str, company: &str) -> Result<Option<ItemTaxTemplate>> {
        Ok(self
            .item_tax_templates
            .get(name)
            .filter(|t| t.company == company)
            .cloned())
    }

    fn account_company(&self, account: &str) -> Result<Option<String>> {
        Ok(self.accounts.get(account).map(|a| a.company.clone()))
    }

    fn default_sales_tax_template(&self, company: &str) -> Result<Option<SalesTaxTemplate>> {
        Ok(self
            .sales_tax_templates
            .values()
            .find(|t| t.company == company && t.is_default)
            .cloned())
    }
}

impl InvoiceRepo for InMemoryStore {
    fn invoice_exists(&self, name: &str) -> Result<bool> {
        Ok(self.invoices.contains_key(name))
    }

    fn insert_invoice(&mut self, doc: AccountingDocument) -> Result<()> {
        if self.invoices.contains_key(&doc.name) {
            return Err(StoreError::duplicate("Sales Invoice", doc.name));
        }
        if !self.companies.contains_key(&doc.company) {
            return Err(StoreError::not_found("Company", doc.company));
        }
        if !self.customers.contains_key(&doc.customer) {
            return Err(StoreError::not_found("Customer", doc.customer));
        }
        for line in &doc.lines {
            if !self.items.contains_key(&line.item_code) {
                return Err(StoreError::not_found("Item", line.item_code.clone()));
            }
        }
        let mut doc = doc;
        doc.status = DocStatus::Draft;
        self.invoices.insert(doc.name.clone(), doc);
        Ok(())
    }

    fn submit_invoice(&mut self, name: &str) -> Result<()> {
        let reject_untaxed = self.reject_untaxed_submissions;
        let doc = self
            .invoices
            .get_mut(name)
            .ok_or_else(|| StoreError::not_found("Sales Invoice", name))?;
        if doc.status != DocStatus::Draft {
            return Err(StoreError::Rejected(format!(
                "{name} is not a draft (docstatus {})",
                doc.status.code()
            )));
        }
        if reject_untaxed && doc.taxes.is_empty() {
            return Err(StoreError::Rejected(format!(
                "{name} has no taxes and charges"
            )));
        }
        doc.status = DocStatus::Submitted;
        Ok(())
    }

    fn submitted_invoices(&self) -> Result<Vec<InvoiceSummary>> {
        let mut list: Vec<InvoiceSummary> = self
            .invoices
            .values()
            .filter(|d| d.status == DocStatus::Submitted)
            .map(|d| d.summary())
            .collect();
        list.sort_by(|a, b| b.posting_date.cmp(&a.posting_date));
        Ok(list)
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AddressType, CustomerType};

    fn address(title: &str, customer: &str) -> NewAddress {
        NewAddress {
            title: title.into(),
            address_type: AddressType::Billing,
            line1: title.into(),
            city: "Riyadh".into(),
            pincode: String::new(),
            district: String::new(),
            building_number: String::new(),
            country: "Saudi Arabia".into(),
            customer_links: vec![customer.into()],
        }
    }

    #[test]
    fn address_names_are_unique() {
        let mut store = InMemoryStore::new();
        let a = store.create_address(address("HQ", "A")).unwrap();
        let b = store.create_address(address("HQ", "B")).unwrap();
        assert_eq!(a, "HQ-Billing");
        assert_eq!(b, "HQ-Billing-1");
        assert!(store.address_linked("HQ", "A").unwrap());
        assert!(store.address_linked("HQ", "B").unwrap());
        assert!(!store.address_linked("HQ", "C").unwrap());
    }

    #[test]
    fn customer_tax_id_update() {
        let mut store = InMemoryStore::new();
        store
            .create_customer(Customer {
                name: "Al Noor".into(),
                customer_type: CustomerType::Company,
                tax_id: Some("300000000000003".into()),
            })
            .unwrap();
        store
            .update_customer_tax_id("Al Noor", "311111111111113")
            .unwrap();
        assert_eq!(
            store.customer("Al Noor").unwrap().tax_id.as_deref(),
            Some("311111111111113")
        );
        assert!(store.update_customer_tax_id("Missing", "1").is_err());
    }

    #[test]
    fn item_template_scoped_to_company() {
        let store = InMemoryStore::new().with_item_tax_template(ItemTaxTemplate {
            name: "VAT 15".into(),
            company: "Acme".into(),
            rows: vec![],
        });
        assert!(store.item_tax_template("VAT 15", "Acme").unwrap().is_some());
        assert!(store.item_tax_template("VAT 15", "Other").unwrap().is_none());
    }

    #[test]
    fn item_requires_uom() {
        let mut store = InMemoryStore::new();
        let item = Item {
            code: "SRV".into(),
            name: "Service".into(),
            description: "Service".into(),
            stock_uom: "Hour".into(),
            item_group: "Services".into(),
            is_sales_item: true,
            is_stock_item: false,
            tax_templates: vec![],
        };
        assert!(store.create_item(item.clone()).is_err());
        store.create_uom("Hour").unwrap();
        store.create_item(item).unwrap();
        assert!(store.item_exists("SRV").unwrap());
    }
}

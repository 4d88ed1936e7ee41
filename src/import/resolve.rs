//! Reference and catalog resolution.
//!
//! Guarantees that the masters a document points at exist before it is
//! assembled: company (must pre-exist), customer, billing address, unit of
//! measure and item (created lazily).

use tracing::{debug, info};

use super::config::ImportConfig;
use crate::core::{
    AddressType, Customer, CustomerType, ImportError, Item, NewAddress, parse_address_display,
};
use crate::store::{AddressRepo, CompanyRepo, CustomerRepo, ItemRepo, TaxRepo};

/// What happened to a master record during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterAction {
    Created,
    Updated,
    Unchanged,
}

/// Company settings needed to assemble a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCompany {
    pub name: String,
    pub currency: String,
    pub income_account: String,
    pub receivable_account: String,
}

/// Look up the company and its posting accounts.
///
/// # Errors
///
/// [`ImportError::CompanyNotFound`] if the company does not exist,
/// [`ImportError::MissingAccounts`] if it lacks an income or receivable
/// account.
pub fn resolve_company<S>(
    store: &S,
    name: &str,
    config: &ImportConfig,
) -> Result<ResolvedCompany, ImportError>
where
    S: CompanyRepo + ?Sized,
{
    let company = store
        .get_company(name)?
        .ok_or_else(|| ImportError::CompanyNotFound(name.to_string()))?;

    let account = |a: &Option<String>| a.clone().filter(|s| !s.trim().is_empty());
    let (Some(income_account), Some(receivable_account)) = (
        account(&company.default_income_account),
        account(&company.default_receivable_account),
    ) else {
        return Err(ImportError::MissingAccounts(company.name));
    };

    let currency = company
        .default_currency
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| config.default_currency.clone());

    Ok(ResolvedCompany {
        name: company.name,
        currency,
        income_account,
        receivable_account,
    })
}

/// Create the customer, or bring its tax id in line with the payload.
///
/// An empty or absent incoming tax id never overwrites a stored one.
pub fn ensure_customer<S>(
    store: &mut S,
    name: &str,
    tax_id: Option<&str>,
) -> Result<MasterAction, ImportError>
where
    S: CustomerRepo + ?Sized,
{
    match store.get_customer(name)? {
        Some(existing) => match tax_id {
            Some(tax_id) if existing.tax_id.as_deref() != Some(tax_id) => {
                store.update_customer_tax_id(name, tax_id)?;
                info!(customer = %name, %tax_id, "updated customer tax id");
                Ok(MasterAction::Updated)
            }
            _ => Ok(MasterAction::Unchanged),
        },
        None => {
            store.create_customer(Customer {
                name: name.to_string(),
                customer_type: CustomerType::Company,
                tax_id: tax_id.map(str::to_string),
            })?;
            info!(customer = %name, "created customer");
            Ok(MasterAction::Created)
        }
    }
}

/// Billing address built from a parsed display string.
pub fn parsed_billing_address(
    title: &str,
    display: &str,
    customer: &str,
    config: &ImportConfig,
) -> NewAddress {
    let parsed = parse_address_display(display);
    NewAddress {
        title: title.to_string(),
        address_type: AddressType::Billing,
        line1: parsed.address_line1,
        city: parsed.city,
        pincode: parsed.pincode,
        district: parsed.district,
        building_number: parsed.building_number,
        country: config.country.clone(),
        customer_links: vec![customer.to_string()],
    }
}

/// Billing address without parsing: the title doubles as line 1 and the
/// city is the configured fallback.
pub fn fallback_billing_address(title: &str, customer: &str, config: &ImportConfig) -> NewAddress {
    NewAddress {
        title: title.to_string(),
        address_type: AddressType::Billing,
        line1: title.to_string(),
        city: config.fallback_city.clone(),
        pincode: String::new(),
        district: String::new(),
        building_number: String::new(),
        country: config.country.clone(),
        customer_links: vec![customer.to_string()],
    }
}

/// Create the address unless one with the same title is already linked to
/// `customer`.
pub fn ensure_address<S>(
    store: &mut S,
    customer: &str,
    address: NewAddress,
) -> Result<MasterAction, ImportError>
where
    S: AddressRepo + ?Sized,
{
    if store.address_linked(&address.title, customer)? {
        return Ok(MasterAction::Unchanged);
    }
    let title = address.title.clone();
    let name = store.create_address(address)?;
    info!(address = %name, %title, %customer, "created address");
    Ok(MasterAction::Created)
}

/// Create the unit of measure if missing. Empty codes are ignored.
pub fn ensure_uom<S>(store: &mut S, uom: &str) -> Result<MasterAction, ImportError>
where
    S: ItemRepo + ?Sized,
{
    if uom.is_empty() || store.uom_exists(uom)? {
        return Ok(MasterAction::Unchanged);
    }
    store.create_uom(uom)?;
    debug!(%uom, "created UOM");
    Ok(MasterAction::Created)
}

/// Item fields taken from one upstream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub uom: &'a str,
    pub tax_template: Option<&'a str>,
}

/// Create a service item if missing. Existing items are never touched.
///
/// The line's tax template is attached at creation time when it resolves
/// for `company`.
pub fn ensure_item<S>(
    store: &mut S,
    company: &str,
    fields: &ItemFields<'_>,
    config: &ImportConfig,
) -> Result<MasterAction, ImportError>
where
    S: ItemRepo + TaxRepo + ?Sized,
{
    if store.item_exists(fields.code)? {
        return Ok(MasterAction::Unchanged);
    }

    let mut tax_templates = Vec::new();
    if let Some(reference) = fields.tax_template {
        if let Some(template) = store.item_tax_template(reference, company)? {
            tax_templates.push(template.name);
        }
    }

    store.create_item(Item {
        code: fields.code.to_string(),
        name: fields.name.to_string(),
        description: fields.description.to_string(),
        stock_uom: fields.uom.to_string(),
        item_group: config.item_group.clone(),
        is_sales_item: true,
        is_stock_item: false,
        tax_templates,
    })?;
    info!(item = %fields.code, "created item");
    Ok(MasterAction::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Company, ItemTaxTemplate};
    use crate::store::InMemoryStore;

    fn config() -> ImportConfig {
        ImportConfig::default()
    }

    #[test]
    fn company_currency_fallback() {
        let store = InMemoryStore::new().with_company(
            Company::new("AC")
                .income_account("Sales - AC")
                .receivable_account("Debtors - AC"),
        );
        let c = resolve_company(&store, "AC", &config()).unwrap();
        assert_eq!(c.currency, "SAR");
        assert_eq!(c.income_account, "Sales - AC");
    }

    #[test]
    fn company_missing_accounts() {
        let store =
            InMemoryStore::new().with_company(Company::new("AC").income_account("Sales - AC"));
        assert!(matches!(
            resolve_company(&store, "AC", &config()),
            Err(ImportError::MissingAccounts(_))
        ));
        assert!(matches!(
            resolve_company(&store, "Nope", &config()),
            Err(ImportError::CompanyNotFound(_))
        ));
    }

    #[test]
    fn customer_lifecycle() {
        let mut store = InMemoryStore::new();
        assert_eq!(
            ensure_customer(&mut store, "Al Noor", Some("300")).unwrap(),
            MasterAction::Created
        );
        assert_eq!(
            ensure_customer(&mut store, "Al Noor", Some("300")).unwrap(),
            MasterAction::Unchanged
        );
        assert_eq!(
            ensure_customer(&mut store, "Al Noor", None).unwrap(),
            MasterAction::Unchanged
        );
        assert_eq!(
            ensure_customer(&mut store, "Al Noor", Some("311")).unwrap(),
            MasterAction::Updated
        );
        assert_eq!(
            store.customer("Al Noor").unwrap().customer_type,
            CustomerType::Company
        );
    }

    #[test]
    fn address_created_once_per_customer() {
        let mut store = InMemoryStore::new();
        let addr = fallback_billing_address("HQ", "A", &config());
        assert_eq!(
            ensure_address(&mut store, "A", addr.clone()).unwrap(),
            MasterAction::Created
        );
        assert_eq!(
            ensure_address(&mut store, "A", addr).unwrap(),
            MasterAction::Unchanged
        );
        let other = fallback_billing_address("HQ", "B", &config());
        assert_eq!(
            ensure_address(&mut store, "B", other).unwrap(),
            MasterAction::Created
        );
        assert_eq!(store.addresses().count(), 2);
    }

    #[test]
    fn parsed_address_fields() {
        let a = parsed_billing_address(
            "HQ",
            "Building No 1234, King Fahd Rd, P.C: 12345, Al Olaya Dist, Riyadh, Kingdom of Saudi Arabia",
            "A",
            &config(),
        );
        assert_eq!(a.line1, "Building No 1234, King Fahd Rd");
        assert_eq!(a.building_number, "1234");
        assert_eq!(a.country, "Saudi Arabia");
        assert_eq!(a.customer_links, vec!["A".to_string()]);
    }

    #[test]
    fn item_gets_template_only_for_owning_company() {
        let mut store = InMemoryStore::new().with_item_tax_template(ItemTaxTemplate {
            name: "VAT 15".into(),
            company: "AC".into(),
            rows: vec![],
        });
        ensure_uom(&mut store, "Nos").unwrap();
        let fields = ItemFields {
            code: "SRV",
            name: "Service",
            description: "Service",
            uom: "Nos",
            tax_template: Some("VAT 15"),
        };
        ensure_item(&mut store, "Other", &fields, &config()).unwrap();
        assert!(store.item("SRV").unwrap().tax_templates.is_empty());

        let fields = ItemFields { code: "SRV-2", ..fields };
        ensure_item(&mut store, "AC", &fields, &config()).unwrap();
        assert_eq!(store.item("SRV-2").unwrap().tax_templates, vec!["VAT 15"]);
        assert_eq!(
            ensure_item(&mut store, "AC", &fields, &config()).unwrap(),
            MasterAction::Unchanged
        );
    }

    #[test]
    fn empty_uom_ignored() {
        let mut store = InMemoryStore::new();
        assert_eq!(ensure_uom(&mut store, "").unwrap(), MasterAction::Unchanged);
        assert_eq!(ensure_uom(&mut store, "Box").unwrap(), MasterAction::Created);
        assert!(store.has_uom("Box"));
    }
}

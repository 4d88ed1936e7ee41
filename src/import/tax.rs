//! Tax line reconciliation.
//!
//! Item tax templates are resolved per company, their rows filtered to
//! accounts owned by that company and merged by (account, rate). When no
//! item contributes a line, the company's default sales taxes and charges
//! template is copied instead.

use std::collections::HashSet;

use tracing::warn;

use crate::core::{AggregatedTaxLine, ChargeType, StoreError, TaxLineKey};
use crate::store::TaxRepo;

/// Where the reconciled tax lines came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxSource {
    /// Item tax templates referenced by the lines.
    ItemTemplates,
    /// The company's default sales taxes and charges template.
    CompanyDefault,
    /// Nothing resolved; the document carries no tax lines.
    None,
}

/// Deduplicated tax lines for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxReconciliation {
    pub lines: Vec<AggregatedTaxLine>,
    pub source: TaxSource,
}

/// Insertion-ordered tax lines, unique by [`TaxLineKey`]. First insert wins.
#[derive(Debug, Default)]
struct TaxLineSet {
    seen: HashSet<TaxLineKey>,
    lines: Vec<AggregatedTaxLine>,
}

impl TaxLineSet {
    fn insert(&mut self, line: AggregatedTaxLine) -> bool {
        if self.seen.insert(line.key()) {
            self.lines.push(line);
            true
        } else {
            false
        }
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn provenance(template: &str) -> String {
    format!("From template {template}")
}

/// Reconcile the tax lines of one document.
///
/// `templates` are the item tax template references of the document lines,
/// in line order; `None` entries (lines without a template) are skipped.
/// Unresolvable templates and rows whose account belongs to another company
/// are logged and dropped.
///
/// # Errors
///
/// Only store failures are returned; every data problem degrades to fewer
/// tax lines.
pub fn reconcile_taxes<'a, S, I>(
    store: &S,
    company: &str,
    templates: I,
) -> Result<TaxReconciliation, StoreError>
where
    S: TaxRepo + ?Sized,
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut set = TaxLineSet::default();

    for reference in templates.into_iter().flatten() {
        let Some(template) = store.item_tax_template(reference, company)? else {
            warn!(template = %reference, %company, "item tax template not found for company");
            continue;
        };
        for row in &template.rows {
            let owner = store.account_company(&row.tax_type)?;
            if owner.as_deref() != Some(company) {
                warn!(
                    account = %row.tax_type,
                    owner = owner.as_deref().unwrap_or("<unknown>"),
                    %company,
                    "tax account skipped, belongs to another company"
                );
                continue;
            }
            set.insert(AggregatedTaxLine {
                charge_type: ChargeType::OnNetTotal,
                account_head: row.tax_type.clone(),
                rate: row.tax_rate,
                tax_amount: None,
                description: provenance(&template.name),
            });
        }
    }

    if !set.is_empty() {
        return Ok(TaxReconciliation {
            lines: set.lines,
            source: TaxSource::ItemTemplates,
        });
    }

    match store.default_sales_tax_template(company)? {
        Some(template) => {
            for row in &template.rows {
                set.insert(AggregatedTaxLine {
                    charge_type: row.charge_type,
                    account_head: row.account_head.clone(),
                    rate: row.rate,
                    tax_amount: row.tax_amount,
                    description: provenance(&template.name),
                });
            }
            Ok(TaxReconciliation {
                lines: set.lines,
                source: TaxSource::CompanyDefault,
            })
        }
        None => {
            warn!(
                %company,
                "no default sales taxes and charges template, document will likely fail validation"
            );
            Ok(TaxReconciliation {
                lines: Vec::new(),
                source: TaxSource::None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ItemTaxRow, ItemTaxTemplate, SalesTaxRow, SalesTaxTemplate};
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;

    fn template(name: &str, company: &str, rows: &[(&str, rust_decimal::Decimal)]) -> ItemTaxTemplate {
        ItemTaxTemplate {
            name: name.into(),
            company: company.into(),
            rows: rows
                .iter()
                .map(|(account, rate)| ItemTaxRow {
                    tax_type: (*account).into(),
                    tax_rate: *rate,
                })
                .collect(),
        }
    }

    #[test]
    fn first_occurrence_wins() {
        let store = InMemoryStore::new()
            .with_account("VAT - AC", "AC")
            .with_item_tax_template(template("VAT A", "AC", &[("VAT - AC", dec!(15))]))
            .with_item_tax_template(template("VAT B", "AC", &[("VAT - AC", dec!(15.00))]));

        let r = reconcile_taxes(&store, "AC", [Some("VAT A"), Some("VAT B")]).unwrap();
        assert_eq!(r.source, TaxSource::ItemTemplates);
        assert_eq!(r.lines.len(), 1);
        assert_eq!(r.lines[0].description, "From template VAT A");
        assert_eq!(r.lines[0].charge_type, ChargeType::OnNetTotal);
    }

    #[test]
    fn same_account_different_rates_are_distinct() {
        let store = InMemoryStore::new()
            .with_account("VAT - AC", "AC")
            .with_item_tax_template(template("Std", "AC", &[("VAT - AC", dec!(15))]))
            .with_item_tax_template(template("Reduced", "AC", &[("VAT - AC", dec!(5))]));

        let r = reconcile_taxes(&store, "AC", [Some("Std"), None, Some("Reduced")]).unwrap();
        assert_eq!(r.lines.len(), 2);
        assert_eq!(r.lines[0].rate, dec!(15));
        assert_eq!(r.lines[1].rate, dec!(5));
    }

    #[test]
    fn cross_company_rows_dropped() {
        let store = InMemoryStore::new()
            .with_account("VAT - AC", "AC")
            .with_account("VAT - OT", "Other")
            .with_item_tax_template(template(
                "Mixed",
                "AC",
                &[("VAT - OT", dec!(15)), ("VAT - AC", dec!(15))],
            ));

        let r = reconcile_taxes(&store, "AC", [Some("Mixed")]).unwrap();
        assert_eq!(r.lines.len(), 1);
        assert_eq!(r.lines[0].account_head, "VAT - AC");
    }

    #[test]
    fn falls_back_to_company_default() {
        let store = InMemoryStore::new().with_sales_tax_template(SalesTaxTemplate {
            name: "KSA VAT".into(),
            company: "AC".into(),
            is_default: true,
            rows: vec![SalesTaxRow {
                charge_type: ChargeType::Actual,
                account_head: "Fee - AC".into(),
                rate: dec!(0),
                tax_amount: Some(dec!(10)),
            }],
        });

        let r = reconcile_taxes(&store, "AC", [Some("Unknown")]).unwrap();
        assert_eq!(r.source, TaxSource::CompanyDefault);
        assert_eq!(r.lines[0].charge_type, ChargeType::Actual);
        assert_eq!(r.lines[0].tax_amount, Some(dec!(10)));
        assert_eq!(r.lines[0].description, "From template KSA VAT");
    }

    #[test]
    fn no_template_anywhere() {
        let store = InMemoryStore::new();
        let r = reconcile_taxes(&store, "AC", std::iter::empty()).unwrap();
        assert_eq!(r.source, TaxSource::None);
        assert!(r.lines.is_empty());
    }
}

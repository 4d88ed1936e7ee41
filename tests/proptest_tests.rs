//! Property-based tests for address parsing and tax reconciliation.
//!
//! Run with: `cargo test --test proptest_tests`

use std::collections::HashSet;

use invoice_bridge::core::*;
use invoice_bridge::import::reconcile_taxes;
use invoice_bridge::store::InMemoryStore;
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    #[test]
    fn address_parser_never_panics(s in "\\PC*") {
        let _ = parse_address_display(&s);
    }

    #[test]
    fn parsed_fields_are_trimmed(
        street in "[A-Za-z ]{1,20}",
        number in "[0-9]{4}",
        pin in "[0-9]{5}",
        city in "[A-Za-z]{1,12}",
    ) {
        let display = format!(
            "Building No {number}, {street}, P.C: {pin}, {city}, Kingdom of Saudi Arabia"
        );
        let p = parse_address_display(&display);
        prop_assert_eq!(&p.building_number, &number);
        prop_assert_eq!(&p.pincode, &pin);
        prop_assert_eq!(p.city.trim(), p.city.as_str());
        prop_assert_eq!(p.address_line1.trim(), p.address_line1.as_str());
    }

    #[test]
    fn reconciled_lines_are_unique(
        rows in prop::collection::vec((0usize..3, 0u32..3), 1..12),
        refs in prop::collection::vec(0usize..4, 0..8),
    ) {
        let accounts = ["VAT - AC", "Excise - AC", "Other - XY"];
        let rates = [Decimal::from(5), Decimal::from(15), Decimal::new(1500, 2)];

        let mut store = InMemoryStore::new();
        store.add_account(accounts[0], "AC");
        store.add_account(accounts[1], "AC");
        store.add_account(accounts[2], "XY");
        for t in 0..4 {
            store.add_item_tax_template(ItemTaxTemplate {
                name: format!("T{t}"),
                company: "AC".into(),
                rows: rows
                    .iter()
                    .skip(t)
                    .map(|&(a, r)| ItemTaxRow {
                        tax_type: accounts[a].into(),
                        tax_rate: rates[r as usize],
                    })
                    .collect(),
            });
        }

        let names: Vec<String> = refs.iter().map(|r| format!("T{r}")).collect();
        let result = reconcile_taxes(&store, "AC", names.iter().map(|n| Some(n.as_str()))).unwrap();

        let keys: HashSet<_> = result.lines.iter().map(AggregatedTaxLine::key).collect();
        prop_assert_eq!(keys.len(), result.lines.len());
        prop_assert!(result.lines.iter().all(|l| l.account_head != "Other - XY"));
    }
}

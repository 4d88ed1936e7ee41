use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ImportError;
use super::types::*;

/// Calculate line amounts and document totals in place.
///
/// Line amounts are `qty * rate`; tax lines are evaluated in order so that
/// previous-row charge types see the rows before them. All amounts are
/// rounded half away from zero to two decimals.
///
/// # Errors
///
/// [`ImportError::Builder`] if any amount overflows the decimal range. The
/// document is left without totals in that case.
pub fn calculate_totals(doc: &mut AccountingDocument) -> Result<(), ImportError> {
    let mut net_total = Decimal::ZERO;
    let mut total_qty = Decimal::ZERO;
    for line in &mut doc.lines {
        let amount = round_half_up(checked(line.qty.checked_mul(line.rate), &line.item_code)?, 2);
        line.amount = Some(amount);
        net_total = checked(net_total.checked_add(amount), "net total")?;
        total_qty = checked(total_qty.checked_add(line.qty), "total quantity")?;
    }

    let mut tax_amounts = Vec::with_capacity(doc.taxes.len());
    let mut running_total = net_total;
    let mut total_taxes_and_charges = Decimal::ZERO;
    let mut previous = Decimal::ZERO;

    for tax in &doc.taxes {
        let amount = match tax.charge_type {
            ChargeType::OnNetTotal => percent(net_total, tax.rate),
            ChargeType::Actual => Some(tax.tax_amount.unwrap_or(Decimal::ZERO)),
            ChargeType::OnPreviousRowAmount => percent(previous, tax.rate),
            ChargeType::OnPreviousRowTotal => percent(running_total, tax.rate),
            ChargeType::OnItemQuantity => total_qty.checked_mul(tax.rate),
        };
        let amount = round_half_up(checked(amount, &tax.account_head)?, 2);
        tax_amounts.push(amount);
        running_total = checked(running_total.checked_add(amount), "running total")?;
        total_taxes_and_charges =
            checked(total_taxes_and_charges.checked_add(amount), "total taxes")?;
        previous = amount;
    }

    let grand_total = checked(net_total.checked_add(total_taxes_and_charges), "grand total")?;

    doc.totals = Some(DocumentTotals {
        net_total,
        tax_amounts,
        total_taxes_and_charges,
        grand_total,
    });
    Ok(())
}

fn percent(base: Decimal, rate: Decimal) -> Option<Decimal> {
    base.checked_mul(rate)?.checked_div(dec!(100))
}

fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal, ImportError> {
    value.ok_or_else(|| ImportError::Builder(format!("amount overflow in {what}")))
}

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

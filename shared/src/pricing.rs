//! Tax-inclusive price resolution

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::{is_no_tax_id, TaxKind, TaxRule};

/// Parse a user-entered amount; anything non-numeric is `None`
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Final price for a selling price under the selected tax rule
///
/// * no tax id, `no_tax`, an unknown id or a zero-valued rule: price unchanged
/// * percent: `price + price * value / 100`
/// * flat: `price + value`
///
/// A non-numeric selling price counts as zero. If the taxed amount would
/// overflow `Decimal`, the untaxed price is returned.
pub fn compute_final_price(selling_price: &str, tax_id: Option<&str>, rules: &[TaxRule]) -> Decimal {
    let price = parse_amount(selling_price).unwrap_or(Decimal::ZERO);
    if is_no_tax_id(tax_id) {
        return price;
    }

    let Some(rule) = tax_id.and_then(|id| rules.iter().find(|r| r.id == id)) else {
        return price;
    };
    let value = parse_amount(&rule.value).unwrap_or(Decimal::ZERO);
    if value.is_zero() {
        return price;
    }

    let taxed = match rule.kind {
        TaxKind::Percent => price
            .checked_mul(value)
            .and_then(|tax| tax.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|tax| price.checked_add(tax)),
        TaxKind::Flat => price.checked_add(value),
    };
    taxed.unwrap_or(price)
}

//! Submit-time validation for intake forms
//!
//! Rules run in a fixed order and accumulate into a field-keyed error map;
//! a form may be submitted only when the map is empty. Everything here is
//! local and synchronous.

use rust_decimal::Decimal;

use crate::intake::{IntakeFormState, IntakeMode};
use crate::pricing::parse_amount;
use crate::types::{fields, Category, FieldErrors, MAX_QUANTITY, MIN_QUANTITY};

// ============================================================================
// Field Validations
// ============================================================================

/// Validate a required money amount: present, numeric, greater than zero
pub fn validate_amount(value: &str) -> Result<Decimal, &'static str> {
    if value.trim().is_empty() {
        return Err("is required");
    }
    match parse_amount(value) {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        Some(_) => Err("must be greater than 0"),
        None => Err("must be a number"),
    }
}

/// Validate an optional low-stock threshold (non-negative whole number)
pub fn validate_low_stock_threshold(value: &str) -> Result<Option<u32>, &'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| "Low stock threshold must be a whole number of 0 or more")
}

/// Validate that a quantity is within the supported range
pub fn validate_quantity(quantity: u32) -> Result<(), &'static str> {
    if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        return Err("Quantity must be between 1 and 100");
    }
    Ok(())
}

// ============================================================================
// Form Validation
// ============================================================================

/// Check the whole form and return every problem found
pub fn validate_intake(state: &IntakeFormState) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let selection = state.selection();

    // 1. Brand
    if selection.brand().map_or(true, |b| b.id.trim().is_empty()) {
        errors.insert(fields::BRAND, "Brand is required");
    }

    // 2. Model: typed text that matched nothing does not count, except for
    // an accessory whose catalog lookup came back empty
    if selection.model().is_none() && manual_accessory_name(state).is_none() {
        let message = if selection.model_text().trim().is_empty() {
            "Model is required"
        } else {
            "Select a model from the catalog"
        };
        errors.insert(fields::MODEL, message);
    }

    // 3. Color (mobile only)
    if state.category() == Category::Mobile {
        if selection.has_catalog_colors() {
            if selection.color().is_none() {
                let message = if selection.color_text().trim().is_empty() {
                    "Color is required"
                } else {
                    "Select a color from the list"
                };
                errors.insert(fields::COLOR, message);
            }
        } else if selection.color_text().trim().is_empty() {
            errors.insert(fields::COLOR, "Color is required");
        }
    }

    // 4-5. Prices
    if let Err(reason) = validate_amount(state.purchase_price()) {
        errors.insert(fields::PURCHASE_PRICE, format!("Purchase price {}", reason));
    }
    if let Err(reason) = validate_amount(state.selling_price()) {
        errors.insert(fields::SELLING_PRICE, format!("Selling price {}", reason));
    }

    // 6-7. Serial identities; accessories have none
    if state.category() == Category::Mobile {
        validate_identities(state, &mut errors);
    }

    // 8. Quantity bounds
    if let Err(message) = validate_quantity(state.quantity()) {
        errors.insert(fields::QUANTITY, message);
    }

    // 9. Optional low-stock threshold
    if let Err(message) = validate_low_stock_threshold(state.low_stock_threshold()) {
        errors.insert(fields::LOW_STOCK_THRESHOLD, message);
    }

    errors
}

/// Typed accessory name accepted without a catalog match
///
/// Only when the brand's accessory list is empty or failed to load.
pub(crate) fn manual_accessory_name(state: &IntakeFormState) -> Option<&str> {
    let selection = state.selection();
    let name = selection.model_text().trim();
    (state.category() == Category::Accessory && selection.model_is_manual() && !name.is_empty()).then_some(name)
}

fn validate_identities(state: &IntakeFormState, errors: &mut FieldErrors) {
    match state.mode() {
        IntakeMode::Editing | IntakeMode::Single => {
            if state.imei().trim().is_empty() {
                errors.insert(fields::IMEI, "IMEI is required");
            }
        }
        IntakeMode::Batch => {
            let expected = state.quantity() as usize;
            if state.identities().len() != expected {
                errors.insert(
                    fields::IMEI_LIST,
                    format!(
                        "Expected {} IMEI entries for quantity {}, found {}",
                        expected,
                        state.quantity(),
                        state.identities().len()
                    ),
                );
            }
            for (index, entry) in state.identities().iter().enumerate().take(expected) {
                if entry.imei1.trim().is_empty() {
                    errors.insert(
                        fields::unit_imei(index),
                        format!("IMEI 1 is required for unit {}", index + 1),
                    );
                }
            }
        }
    }
}

//! Turns a validated intake form into submission payloads

use rust_decimal::Decimal;
use thiserror::Error;

use crate::intake::{IntakeFormState, IntakeMode};
use crate::models::{
    is_no_tax_id, AccessoryStockPayload, Brand, CatalogVariant, IntakePayload, MobileUnitPayload, TaxRule,
};
use crate::validation::{manual_accessory_name, validate_amount, validate_low_stock_threshold};

/// Raised when the form is not in a submittable shape
///
/// The validator reports the same problems per field; this guards callers
/// that assemble without validating first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("no brand selected")]
    MissingBrand,

    #[error("no catalog entry resolved")]
    UnresolvedVariant,

    #[error("no color given")]
    MissingColor,

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: &'static str },

    #[error("missing IMEI for unit {0}")]
    MissingImei(usize),

    #[error("identity list holds {found} entries but quantity is {expected}")]
    IdentityDrift { expected: usize, found: usize },
}

/// Build every downstream create (or update) operation for the form
///
/// Mobiles in batch mode yield one payload per identity record, in order;
/// everything else yields exactly one payload.
pub fn build_payloads(state: &IntakeFormState, rules: &[TaxRule]) -> Result<Vec<IntakePayload>, AssembleError> {
    let common = Common::from_state(state, rules)?;
    let selection = state.selection();

    let model = match selection.model() {
        Some(CatalogVariant::Mobile(model)) => model,
        Some(CatalogVariant::Accessory(accessory)) => {
            let linkage_id = selection.linkage_id().ok_or(AssembleError::UnresolvedVariant)?;
            return Ok(vec![accessory_payload(
                state,
                common,
                accessory.name.clone(),
                accessory.memory.clone(),
                Some((accessory.product_id.clone(), linkage_id.to_string())),
            )]);
        }
        None => {
            let name = manual_accessory_name(state).ok_or(AssembleError::UnresolvedVariant)?;
            return Ok(vec![accessory_payload(state, common, name.to_string(), None, None)]);
        }
    };

    let linkage_id = selection
        .linkage_id()
        .ok_or(AssembleError::UnresolvedVariant)?
        .to_string();
    let color = selection.effective_color().ok_or(AssembleError::MissingColor)?;
    let build = |imei: &str, imei2: &str| {
        IntakePayload::Mobile(MobileUnitPayload {
            brand_id: common.brand.id.clone(),
            brand: common.brand.name.clone(),
            model: model.name.clone(),
            memory: model.memory.clone(),
            product_id: model.product_id.clone(),
            mobile_catalog_id: linkage_id.clone(),
            color: color.clone(),
            imei: imei.trim().to_string(),
            imei2: non_empty(imei2),
            purchase_price: common.purchase_price,
            selling_price: common.selling_price,
            final_price: common.final_price,
            tax_id: common.tax_id.clone(),
            vendor_id: common.vendor_id.clone(),
            barcode: common.barcode.clone(),
            notes: common.notes.clone(),
            low_stock_threshold: common.low_stock_threshold,
        })
    };

    match state.mode() {
        IntakeMode::Editing | IntakeMode::Single => {
            if state.imei().trim().is_empty() {
                return Err(AssembleError::MissingImei(0));
            }
            Ok(vec![build(state.imei(), state.imei2())])
        }
        IntakeMode::Batch => {
            let identities = state.identities();
            let expected = state.quantity() as usize;
            if identities.len() != expected {
                return Err(AssembleError::IdentityDrift {
                    expected,
                    found: identities.len(),
                });
            }
            identities
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    if entry.imei1.trim().is_empty() {
                        Err(AssembleError::MissingImei(index))
                    } else {
                        Ok(build(&entry.imei1, &entry.imei2))
                    }
                })
                .collect()
        }
    }
}

/// `linkage` is the `(product id, accessory catalog id)` of a catalog match
fn accessory_payload(
    state: &IntakeFormState,
    common: Common,
    name: String,
    memory: Option<String>,
    linkage: Option<(String, String)>,
) -> IntakePayload {
    let (product_id, accessory_catalog_id) = linkage.unzip();
    IntakePayload::Accessory(AccessoryStockPayload {
        brand_id: common.brand.id,
        brand: common.brand.name,
        name,
        memory,
        product_id,
        accessory_catalog_id,
        quantity: state.quantity(),
        purchase_price: common.purchase_price,
        selling_price: common.selling_price,
        final_price: common.final_price,
        tax_id: common.tax_id,
        vendor_id: common.vendor_id,
        barcode: common.barcode,
        notes: common.notes,
        low_stock_threshold: common.low_stock_threshold,
    })
}

/// Fields every payload of one submission shares
struct Common {
    brand: Brand,
    purchase_price: Decimal,
    selling_price: Decimal,
    final_price: Decimal,
    tax_id: Option<String>,
    vendor_id: Option<String>,
    barcode: Option<String>,
    notes: Option<String>,
    low_stock_threshold: Option<u32>,
}

impl Common {
    fn from_state(state: &IntakeFormState, rules: &[TaxRule]) -> Result<Self, AssembleError> {
        let brand = state
            .selection()
            .brand()
            .filter(|b| !b.id.trim().is_empty())
            .cloned()
            .ok_or(AssembleError::MissingBrand)?;
        let purchase_price = validate_amount(state.purchase_price()).map_err(|reason| AssembleError::InvalidField {
            field: "purchase price",
            reason,
        })?;
        let selling_price = validate_amount(state.selling_price()).map_err(|reason| AssembleError::InvalidField {
            field: "selling price",
            reason,
        })?;
        let low_stock_threshold =
            validate_low_stock_threshold(state.low_stock_threshold()).map_err(|reason| AssembleError::InvalidField {
                field: "low stock threshold",
                reason,
            })?;
        let tax_id = (!is_no_tax_id(Some(state.tax_id()))).then(|| state.tax_id().trim().to_string());

        Ok(Self {
            brand,
            purchase_price,
            selling_price,
            final_price: state.final_price(rules),
            tax_id,
            vendor_id: non_empty(state.vendor_id()),
            barcode: non_empty(state.barcode()),
            notes: non_empty(state.notes()),
            low_stock_threshold,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{with_no_tax, AccessoryVariant, ColorVariant, ModelVariant, TaxKind, NO_TAX_ID};
    use crate::types::{Category, IdentityField};

    fn rules() -> Vec<TaxRule> {
        with_no_tax(vec![TaxRule {
            id: "vat10".to_string(),
            name: "VAT".to_string(),
            kind: TaxKind::Percent,
            value: "10".to_string(),
            is_active: true,
        }])
    }

    fn apple_iphone(colors: Vec<ColorVariant>) -> IntakeFormState {
        let mut state = IntakeFormState::new(Category::Mobile);
        state.select_brand(Brand::new("b1", "Apple"));
        state.apply_models("b1", vec![ModelVariant::new("m1", "iPhone 15", Some("128GB"), "p1")]);
        state.select_model_text("iPhone 15 128GB").unwrap();
        let key = state.selection().current_color_key().unwrap();
        state.apply_colors(&key, colors);
        state.set_purchase_price("800");
        state.set_selling_price("950");
        state
    }

    #[test]
    fn test_free_text_color_end_to_end() {
        let mut state = apple_iphone(Vec::new());
        state.select_color_text("Black").unwrap();
        state.set_tax_id(NO_TAX_ID);
        state.set_quantity(1);
        state.set_imei(IdentityField::Imei1, "111111111111111");
        assert!(state.validate());

        let payloads = build_payloads(&state, &rules()).unwrap();
        assert_eq!(payloads.len(), 1);
        let IntakePayload::Mobile(payload) = &payloads[0] else {
            panic!("expected a mobile payload");
        };
        assert_eq!(payload.mobile_catalog_id, "m1");
        assert_eq!(payload.color, "Black");
        assert_eq!(payload.tax_id, None);
        assert_eq!(payload.imei, "111111111111111");
        assert_eq!(payload.imei2, None);
        assert_eq!(payload.final_price, Decimal::from(950));

        let json = serde_json::to_value(&payloads[0]).unwrap();
        assert_eq!(json["mobileCatalogId"], "m1");
        assert!(json.get("taxId").is_none());
        assert!(json.get("imei2").is_none());
    }

    #[test]
    fn test_catalog_color_id_is_linkage() {
        let mut state = apple_iphone(vec![ColorVariant::new("c9", "Blue")]);
        state.select_color_text("blue").unwrap();
        state.set_tax_id("vat10");
        state.set_imei(IdentityField::Imei1, "111111111111111");
        state.set_imei(IdentityField::Imei2, "111111111111112");

        let payloads = build_payloads(&state, &rules()).unwrap();
        let IntakePayload::Mobile(payload) = &payloads[0] else {
            panic!("expected a mobile payload");
        };
        assert_eq!(payload.mobile_catalog_id, "c9");
        assert_eq!(payload.color, "Blue");
        assert_eq!(payload.tax_id.as_deref(), Some("vat10"));
        assert_eq!(payload.final_price, Decimal::from(1045));
        assert_eq!(payload.imei2.as_deref(), Some("111111111111112"));
    }

    #[test]
    fn test_batch_yields_one_payload_per_unit_in_order() {
        let mut state = apple_iphone(Vec::new());
        state.select_color_text("Black").unwrap();
        state.set_vendor_id("v1");
        state.set_notes("  shipment 42 ");
        state.set_quantity(3);
        for (index, imei) in ["A1", "B2", "C3"].iter().enumerate() {
            state.update_identity(index, IdentityField::Imei1, *imei);
        }
        state.set_imei(IdentityField::Imei1, "ignored-in-batch");
        assert!(state.validate());

        let payloads = build_payloads(&state, &rules()).unwrap();
        let imeis: Vec<String> = payloads
            .iter()
            .map(|p| match p {
                IntakePayload::Mobile(m) => m.imei.clone(),
                IntakePayload::Accessory(_) => unreachable!(),
            })
            .collect();
        assert_eq!(imeis, vec!["A1", "B2", "C3"]);
        for payload in &payloads {
            let IntakePayload::Mobile(m) = payload else { unreachable!() };
            assert_eq!(m.vendor_id.as_deref(), Some("v1"));
            assert_eq!(m.notes.as_deref(), Some("shipment 42"));
            assert_eq!(m.brand, "Apple");
        }
    }

    #[test]
    fn test_accessory_single_payload_with_quantity() {
        let mut state = IntakeFormState::new(Category::Accessory);
        state.select_brand(Brand::new("b4", "Anker"));
        state.apply_accessories("b4", vec![AccessoryVariant::new("a1", "PowerCore", Some("10000mAh"), "p5")]);
        state.select_model_text("PowerCore 10000mAh").unwrap();
        state.set_purchase_price("20");
        state.set_selling_price("35");
        state.set_quantity(12);
        state.set_low_stock_threshold("3");

        let payloads = build_payloads(&state, &rules()).unwrap();
        assert_eq!(payloads.len(), 1);
        let IntakePayload::Accessory(payload) = &payloads[0] else {
            panic!("expected an accessory payload");
        };
        assert_eq!(payload.quantity, 12);
        assert_eq!(payload.accessory_catalog_id.as_deref(), Some("a1"));
        assert_eq!(payload.product_id.as_deref(), Some("p5"));
        assert_eq!(payload.low_stock_threshold, Some(3));

        let json = serde_json::to_value(&payloads[0]).unwrap();
        assert!(json.get("imei").is_none());
        assert_eq!(json["quantity"], 12);
    }

    #[test]
    fn test_accessory_typed_name_without_catalog() {
        let mut state = IntakeFormState::new(Category::Accessory);
        state.select_brand(Brand::new("b4", "Generic"));
        state.apply_accessories("b4", Vec::new());
        state.select_model_text("  Generic USB-C Cable ").unwrap();
        state.set_purchase_price("2");
        state.set_selling_price("5");
        state.set_quantity(30);
        assert!(state.validate());

        let payloads = build_payloads(&state, &rules()).unwrap();
        let IntakePayload::Accessory(payload) = &payloads[0] else {
            panic!("expected an accessory payload");
        };
        assert_eq!(payload.name, "Generic USB-C Cable");
        assert_eq!(payload.accessory_catalog_id, None);
        assert_eq!(payload.quantity, 30);

        let json = serde_json::to_value(&payloads[0]).unwrap();
        assert!(json.get("accessoryCatalogId").is_none());
        assert!(json.get("productId").is_none());
    }

    #[test]
    fn test_refuses_unvalidated_state() {
        let state = IntakeFormState::new(Category::Mobile);
        assert_eq!(build_payloads(&state, &rules()), Err(AssembleError::MissingBrand));

        let mut state = apple_iphone(Vec::new());
        state.select_color_text("Black").unwrap();
        state.set_quantity(2);
        state.update_identity(0, IdentityField::Imei1, "A1");
        assert_eq!(build_payloads(&state, &rules()), Err(AssembleError::MissingImei(1)));
    }
}

//! WebAssembly bindings for the POS intake form
//!
//! The browser owns networking; this module owns the form. JavaScript feeds
//! catalog responses in and reads JSON back out:
//! - Cascading brand/model/color selection with lookup requests
//! - Quantity and per-unit IMEI handling
//! - Tax-inclusive price preview
//! - Submit-time validation and payload assembly

use std::fmt::Display;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{
    build_payloads, with_no_tax, Brand, Category, ColorKey, IdentityField, IntakeFormState, LookupRequest,
    ModelVariant, ScanTarget, TaxRule, Unit,
};

/// JSON shape of a lookup the host should perform
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Lookup<'a> {
    Models { brand: &'a Brand },
    Accessories { brand: &'a Brand },
    Colors { brand: &'a Brand, model: &'a ModelVariant },
}

fn lookup_json(request: Option<LookupRequest>) -> Result<String, String> {
    let lookup = request.as_ref().map(|request| match request {
        LookupRequest::Models { brand } => Lookup::Models { brand },
        LookupRequest::Accessories { brand } => Lookup::Accessories { brand },
        LookupRequest::Colors { brand, model } => Lookup::Colors { brand, model },
    });
    to_json(&lookup)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn from_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn js_err(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn identity_field(name: &str) -> Result<IdentityField, String> {
    match name {
        "imei1" | "imei" => Ok(IdentityField::Imei1),
        "imei2" => Ok(IdentityField::Imei2),
        other => Err(format!("unknown identity field '{}'", other)),
    }
}

#[cfg(target_arch = "wasm32")]
fn log_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_warn(_message: &str) {}

/// Selling price including tax, as a decimal string
///
/// `rules_json` is the tax rule list as served by the API.
#[wasm_bindgen]
pub fn compute_final_price(selling_price: &str, tax_id: &str, rules_json: &str) -> Result<String, JsValue> {
    let rules: Vec<TaxRule> = from_json("tax rules", rules_json).map_err(js_err)?;
    Ok(shared::compute_final_price(selling_price, Some(tax_id), &rules).to_string())
}

/// One open intake dialog
#[wasm_bindgen]
pub struct IntakeForm {
    state: IntakeFormState,
    tax_rules: Vec<TaxRule>,
}

impl IntakeForm {
    fn create(category: &str) -> Result<Self, String> {
        let category: Category = category.parse()?;
        Ok(Self {
            state: IntakeFormState::new(category),
            tax_rules: with_no_tax(Vec::new()),
        })
    }

    fn create_for_edit(unit_json: &str) -> Result<Self, String> {
        let unit: Unit = from_json("unit", unit_json)?;
        Ok(Self {
            state: IntakeFormState::for_edit(&unit),
            tax_rules: with_no_tax(Vec::new()),
        })
    }

    fn load_tax_rules(&mut self, rules_json: &str) -> Result<usize, String> {
        let rules: Vec<TaxRule> = from_json("tax rules", rules_json)?;
        self.tax_rules = with_no_tax(rules);
        Ok(self.tax_rules.len())
    }

    fn choose_brand(&mut self, brand_json: &str) -> Result<String, String> {
        let brand: Brand = from_json("brand", brand_json)?;
        lookup_json(self.state.select_brand(brand))
    }

    fn choose_model_text(&mut self, text: &str) -> Result<String, String> {
        let request = self.state.select_model_text(text).map_err(|e| e.to_string())?;
        lookup_json(request)
    }

    fn receive_models(&mut self, brand_id: &str, models_json: &str) -> Result<bool, String> {
        let models = from_json("models", models_json)?;
        Ok(self.state.apply_models(brand_id, models))
    }

    fn receive_accessories(&mut self, brand_id: &str, accessories_json: &str) -> Result<bool, String> {
        let accessories = from_json("accessories", accessories_json)?;
        Ok(self.state.apply_accessories(brand_id, accessories))
    }

    fn receive_colors(&mut self, brand_id: &str, model_json: &str, colors_json: &str) -> Result<bool, String> {
        let model: ModelVariant = from_json("model", model_json)?;
        let colors = from_json("colors", colors_json)?;
        Ok(self.state.apply_colors(&ColorKey::new(brand_id, &model), colors))
    }

    fn write_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        let state = &mut self.state;
        match field {
            "purchase_price" => state.set_purchase_price(value),
            "selling_price" => state.set_selling_price(value),
            "tax_id" => state.set_tax_id(value),
            "vendor_id" => state.set_vendor_id(value),
            "barcode" => state.set_barcode(value),
            "notes" => state.set_notes(value),
            "low_stock_threshold" => state.set_low_stock_threshold(value),
            "imei" => state.set_imei(IdentityField::Imei1, value),
            "imei2" => state.set_imei(IdentityField::Imei2, value),
            other => return Err(format!("unknown field '{}'", other)),
        }
        Ok(())
    }

    fn write_identity(&mut self, index: usize, field: &str, value: &str) -> Result<bool, String> {
        Ok(self.state.update_identity(index, identity_field(field)?, value))
    }

    fn arm(&mut self, target_json: &str) -> Result<(), String> {
        let target: ScanTarget = from_json("scan target", target_json)?;
        self.state.arm_scan(target).map_err(|e| e.to_string())
    }

    fn scanned(&mut self, decoded: &str) -> Result<String, String> {
        let target = self.state.apply_scan(decoded).map_err(|e| e.to_string())?;
        to_json(&target)
    }

    fn validated(&mut self) -> Result<String, String> {
        self.state.validate();
        to_json(self.state.errors())
    }

    fn payloads(&mut self) -> Result<String, String> {
        if !self.state.validate() {
            return Err(format!("Validation failed: {}", self.state.errors()));
        }
        let payloads = build_payloads(&self.state, &self.tax_rules).map_err(|e| e.to_string())?;
        to_json(&payloads)
    }

    fn keep_units(&mut self, indices_json: &str) -> Result<u32, String> {
        let indices: Vec<usize> = from_json("unit indices", indices_json)?;
        self.state.retain_units(&indices);
        Ok(self.state.quantity())
    }
}

#[wasm_bindgen]
impl IntakeForm {
    /// New form for `"mobile"` or `"accessory"`
    #[wasm_bindgen(constructor)]
    pub fn new(category: &str) -> Result<IntakeForm, JsValue> {
        Self::create(category).map_err(js_err)
    }

    /// Form prefilled from a stored unit; call `pendingLookup` next
    #[wasm_bindgen(js_name = forEdit)]
    pub fn for_edit(unit_json: &str) -> Result<IntakeForm, JsValue> {
        Self::create_for_edit(unit_json).map_err(js_err)
    }

    /// Replace the tax rules; returns the option count including "no tax"
    #[wasm_bindgen(js_name = setTaxRules)]
    pub fn set_tax_rules(&mut self, rules_json: &str) -> Result<usize, JsValue> {
        self.load_tax_rules(rules_json).map_err(js_err)
    }

    /// Returns the lookup to perform as JSON, or `null`
    #[wasm_bindgen(js_name = selectBrand)]
    pub fn select_brand(&mut self, brand_json: &str) -> Result<String, JsValue> {
        self.choose_brand(brand_json).map_err(js_err)
    }

    #[wasm_bindgen(js_name = selectModelText)]
    pub fn select_model_text(&mut self, text: &str) -> Result<String, JsValue> {
        self.choose_model_text(text).map_err(js_err)
    }

    #[wasm_bindgen(js_name = selectColorText)]
    pub fn select_color_text(&mut self, text: &str) -> Result<(), JsValue> {
        self.state.select_color_text(text).map_err(js_err)
    }

    #[wasm_bindgen(js_name = pendingLookup)]
    pub fn pending_lookup(&self) -> Result<String, JsValue> {
        lookup_json(self.state.selection().pending_lookup()).map_err(js_err)
    }

    /// Returns false when the response is stale and was dropped
    #[wasm_bindgen(js_name = applyModels)]
    pub fn apply_models(&mut self, brand_id: &str, models_json: &str) -> Result<bool, JsValue> {
        let applied = self.receive_models(brand_id, models_json).map_err(js_err)?;
        if !applied {
            log_warn("discarded stale model list");
        }
        Ok(applied)
    }

    #[wasm_bindgen(js_name = applyAccessories)]
    pub fn apply_accessories(&mut self, brand_id: &str, accessories_json: &str) -> Result<bool, JsValue> {
        let applied = self.receive_accessories(brand_id, accessories_json).map_err(js_err)?;
        if !applied {
            log_warn("discarded stale accessory list");
        }
        Ok(applied)
    }

    #[wasm_bindgen(js_name = applyColors)]
    pub fn apply_colors(&mut self, brand_id: &str, model_json: &str, colors_json: &str) -> Result<bool, JsValue> {
        let applied = self.receive_colors(brand_id, model_json, colors_json).map_err(js_err)?;
        if !applied {
            log_warn("discarded stale color list");
        }
        Ok(applied)
    }

    #[wasm_bindgen(js_name = modelSuggestions)]
    pub fn model_suggestions(&self, text: &str) -> Result<String, JsValue> {
        to_json(&self.state.selection().model_suggestions(text)).map_err(js_err)
    }

    #[wasm_bindgen(js_name = colorSuggestions)]
    pub fn color_suggestions(&self, text: &str) -> Result<String, JsValue> {
        to_json(&self.state.selection().color_suggestions(text)).map_err(js_err)
    }

    /// Clamp and apply a quantity; returns the effective value
    #[wasm_bindgen(js_name = setQuantity)]
    pub fn set_quantity(&mut self, quantity: f64) -> u32 {
        // JS numbers may be fractional or out of range
        self.state.set_quantity(quantity.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    }

    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), JsValue> {
        self.write_field(field, value).map_err(js_err)
    }

    #[wasm_bindgen(js_name = updateIdentity)]
    pub fn update_identity(&mut self, index: usize, field: &str, value: &str) -> Result<bool, JsValue> {
        self.write_identity(index, field, value).map_err(js_err)
    }

    #[wasm_bindgen(js_name = armScan)]
    pub fn arm_scan(&mut self, target_json: &str) -> Result<(), JsValue> {
        self.arm(target_json).map_err(js_err)
    }

    #[wasm_bindgen(js_name = applyScan)]
    pub fn apply_scan(&mut self, decoded: &str) -> Result<String, JsValue> {
        self.scanned(decoded).map_err(js_err)
    }

    #[wasm_bindgen(js_name = cancelScan)]
    pub fn cancel_scan(&mut self) {
        self.state.cancel_scan();
    }

    #[wasm_bindgen(js_name = finalPrice)]
    pub fn final_price(&self) -> String {
        self.state.final_price(&self.tax_rules).to_string()
    }

    /// Field errors as a JSON object; `{}` when the form is valid
    pub fn validate(&mut self) -> Result<String, JsValue> {
        self.validated().map_err(js_err)
    }

    /// Validated payloads as a JSON array, one entry per API call
    #[wasm_bindgen(js_name = buildPayloads)]
    pub fn build_payloads(&mut self) -> Result<String, JsValue> {
        self.payloads().map_err(js_err)
    }

    /// Keep only the units at the given positions after a partial failure
    #[wasm_bindgen(js_name = retainUnits)]
    pub fn retain_units(&mut self, indices_json: &str) -> Result<u32, JsValue> {
        self.keep_units(indices_json).map_err(js_err)
    }

    /// Full form state as JSON
    pub fn state(&self) -> Result<String, JsValue> {
        to_json(&self.state).map_err(js_err)
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const MODELS: &str = r#"[
        {"id":"m1","name":"iPhone 15","memory":"128GB","displayName":"iPhone 15 128GB","productId":"p1"},
        {"id":"m2","name":"iPhone 15","memory":"256GB","displayName":"iPhone 15 256GB","productId":"p2"}
    ]"#;

    const TAXES: &str = r#"[{"id":"t1","name":"GST","type":"percent","value":"10"}]"#;

    fn form_with_model() -> IntakeForm {
        let mut form = IntakeForm::create("mobile").unwrap();
        let lookup = form.choose_brand(r#"{"id":"b1","name":"Apple"}"#).unwrap();
        assert!(lookup.contains(r#""kind":"models""#));
        assert!(form.receive_models("b1", MODELS).unwrap());
        form
    }

    #[test]
    fn test_compute_final_price_helper() {
        let rules: Vec<TaxRule> = from_json("tax rules", TAXES).unwrap();
        assert_eq!(
            shared::compute_final_price("950", Some("t1"), &rules),
            Decimal::from(1045)
        );
    }

    #[test]
    fn test_unknown_category() {
        assert!(IntakeForm::create("tablet").is_err());
    }

    #[test]
    fn test_model_resolution_requests_colors() {
        let mut form = form_with_model();
        let lookup = form.choose_model_text("iphone 15 256gb").unwrap();
        assert!(lookup.contains(r#""kind":"colors""#));
        assert!(lookup.contains(r#""id":"m2""#));

        // Colors for another model are stale
        let m1 = r#"{"id":"m1","name":"iPhone 15","memory":"128GB","productId":"p1"}"#;
        assert!(!form.receive_colors("b1", m1, r#"[{"id":"c1","color":"Black"}]"#).unwrap());
        let m2 = r#"{"id":"m2","name":"iPhone 15","memory":"256GB","productId":"p2"}"#;
        assert!(form.receive_colors("b1", m2, r#"[{"id":"c2","color":"Blue"}]"#).unwrap());
    }

    #[test]
    fn test_unmatched_model_text_needs_no_lookup() {
        let mut form = form_with_model();
        assert_eq!(form.choose_model_text("Galaxy S24").unwrap(), "null");
    }

    #[test]
    fn test_validate_then_build_batch() {
        let mut form = form_with_model();
        form.choose_model_text("iPhone 15 128GB").unwrap();
        form.receive_colors(
            "b1",
            r#"{"id":"m1","name":"iPhone 15","memory":"128GB","productId":"p1"}"#,
            "[]",
        )
        .unwrap();
        form.state.select_color_text("Black").unwrap();
        form.load_tax_rules(TAXES).unwrap();
        form.write_field("purchase_price", "800").unwrap();
        form.write_field("selling_price", "950").unwrap();
        form.write_field("tax_id", "t1").unwrap();
        assert_eq!(form.set_quantity(2.7), 2);

        let errors = form.validated().unwrap();
        assert!(errors.contains("imei_0"));
        assert!(form.payloads().is_err());

        assert!(form.write_identity(0, "imei1", "111").unwrap());
        assert!(form.write_identity(1, "imei1", "222").unwrap());
        assert_eq!(form.validated().unwrap(), "{}");
        assert_eq!(form.final_price().parse::<Decimal>().unwrap(), Decimal::from(1045));

        let payloads = form.payloads().unwrap();
        assert!(payloads.contains(r#""imei":"111""#));
        assert!(payloads.contains(r#""imei":"222""#));
        assert!(payloads.contains(r#""taxId":"t1""#));
    }

    #[test]
    fn test_scan_into_barcode() {
        let mut form = IntakeForm::create("accessory").unwrap();
        assert!(form.arm(r#"{"kind":"imei","field":"imei1"}"#).is_err());
        form.arm(r#"{"kind":"barcode"}"#).unwrap();
        assert_eq!(form.scanned(" 8901234567890 ").unwrap(), r#"{"kind":"barcode"}"#);
        assert_eq!(form.state.barcode(), "8901234567890");
    }

    #[test]
    fn test_unknown_field() {
        let mut form = IntakeForm::create("mobile").unwrap();
        assert!(form.write_field("price", "1").is_err());
        assert!(form.write_identity(0, "serial", "1").is_err());
    }
}

//! Intake form state and its transitions
//!
//! [`IntakeFormState`] is the single source of truth for one open intake
//! dialog. Every mutation goes through a method here so that the identity
//! list stays in step with the quantity and a field's error disappears as
//! soon as its value changes. Validation runs only on submit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    compose_display_name, AccessoryVariant, Brand, CatalogVariant, ColorVariant, ModelVariant, TaxRule, Unit, NO_TAX_ID,
};
use crate::pricing::compute_final_price;
use crate::identity::{clamp_quantity, UnitIdentitySet};
use crate::catalog::ColorKey;
use crate::selector::{CascadingSelector, LookupRequest, SelectorError};
use crate::types::{fields, Category, FieldErrors, IdentityField};

/// Which identity representation a form is using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeMode {
    /// Updating an existing unit; one imei/imei2 pair
    Editing,
    /// New intake of one unit (or an accessory stock count); one pair
    Single,
    /// New intake of several mobiles; the identity list
    Batch,
}

/// Where the next scanned string goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanTarget {
    /// The single imei/imei2 pair
    Imei { field: IdentityField },
    /// One record of the identity list
    Unit { index: usize, field: IdentityField },
    Barcode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("no scan target was armed")]
    NotArmed,

    #[error("scanner returned an empty value")]
    EmptyScan,

    #[error("unit {index} is out of range for quantity {quantity}")]
    IndexOutOfRange { index: usize, quantity: u32 },

    #[error("{0} intake has no serial identities")]
    NoIdentity(Category),

    #[error("the identity list is only used for new multi-unit intake")]
    NotBatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakeFormState {
    category: Category,
    /// Id of the unit being edited; `None` for new intake
    #[serde(default)]
    editing_unit_id: Option<String>,
    #[serde(default)]
    selection: CascadingSelector,
    quantity: u32,
    #[serde(default)]
    purchase_price: String,
    #[serde(default)]
    selling_price: String,
    #[serde(default = "default_tax_id")]
    tax_id: String,
    #[serde(default)]
    identities: UnitIdentitySet,
    #[serde(default)]
    imei: String,
    #[serde(default)]
    imei2: String,
    #[serde(default)]
    vendor_id: String,
    #[serde(default)]
    barcode: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    low_stock_threshold: String,
    #[serde(default)]
    errors: FieldErrors,
    #[serde(skip)]
    scan_target: Option<ScanTarget>,
}

fn default_tax_id() -> String {
    NO_TAX_ID.to_string()
}

impl IntakeFormState {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            editing_unit_id: None,
            selection: CascadingSelector::new(category),
            quantity: 1,
            purchase_price: String::new(),
            selling_price: String::new(),
            tax_id: default_tax_id(),
            identities: UnitIdentitySet::new(),
            imei: String::new(),
            imei2: String::new(),
            vendor_id: String::new(),
            barcode: String::new(),
            notes: String::new(),
            low_stock_threshold: String::new(),
            errors: FieldErrors::new(),
            scan_target: None,
        }
    }

    /// Prefill a form for editing an existing unit
    ///
    /// Brand, model text and color text are restored but the model is left
    /// unresolved; the caller loads the brand's candidates (see
    /// [`CascadingSelector::pending_lookup`]) and re-resolves the text.
    pub fn for_edit(unit: &Unit) -> Self {
        let mut state = Self::new(unit.category);
        state.editing_unit_id = Some(unit.id.clone());
        state
            .selection
            .select_brand(Brand::new(unit.brand_id.clone(), unit.brand.clone()));
        let label = compose_display_name(&unit.model, unit.memory.as_deref());
        state.selection.restore_text(&label, unit.color.as_deref());

        state.quantity = match unit.category {
            Category::Mobile => 1,
            Category::Accessory => clamp_quantity(unit.quantity as i64),
        };
        state.purchase_price = unit.purchase_price.to_string();
        state.selling_price = unit.selling_price.to_string();
        state.tax_id = unit.tax_id.clone().unwrap_or_else(default_tax_id);
        state.imei = unit.imei.clone().unwrap_or_default();
        state.imei2 = unit.imei2.clone().unwrap_or_default();
        state.vendor_id = unit.vendor_id.clone().unwrap_or_default();
        state.barcode = unit.barcode.clone().unwrap_or_default();
        state.notes = unit.notes.clone().unwrap_or_default();
        state.low_stock_threshold = unit
            .low_stock_threshold
            .map(|t| t.to_string())
            .unwrap_or_default();
        state
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Id of the unit being edited; `None` for new intake
    pub fn editing_unit_id(&self) -> Option<&str> {
        self.editing_unit_id.as_deref()
    }

    pub fn selection(&self) -> &CascadingSelector {
        &self.selection
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn purchase_price(&self) -> &str {
        &self.purchase_price
    }

    pub fn selling_price(&self) -> &str {
        &self.selling_price
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    /// Per-unit identities; only meaningful in [`IntakeMode::Batch`]
    pub fn identities(&self) -> &UnitIdentitySet {
        &self.identities
    }

    pub fn imei(&self) -> &str {
        &self.imei
    }

    pub fn imei2(&self) -> &str {
        &self.imei2
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn low_stock_threshold(&self) -> &str {
        &self.low_stock_threshold
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn is_editing(&self) -> bool {
        self.editing_unit_id.is_some()
    }

    pub fn mode(&self) -> IntakeMode {
        if self.is_editing() {
            IntakeMode::Editing
        } else if self.category == Category::Mobile && self.quantity > 1 {
            IntakeMode::Batch
        } else {
            IntakeMode::Single
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select_brand(&mut self, brand: Brand) -> Option<LookupRequest> {
        self.clear_errors(&[fields::BRAND, fields::MODEL, fields::COLOR]);
        self.selection.select_brand(brand)
    }

    pub fn select_model(
        &mut self,
        model: Option<CatalogVariant>,
        raw_text: &str,
    ) -> Result<Option<LookupRequest>, SelectorError> {
        let request = self.selection.select_model(model, raw_text)?;
        self.clear_errors(&[fields::MODEL, fields::COLOR]);
        Ok(request)
    }

    pub fn select_model_text(&mut self, raw_text: &str) -> Result<Option<LookupRequest>, SelectorError> {
        let request = self.selection.select_model_text(raw_text)?;
        self.clear_errors(&[fields::MODEL, fields::COLOR]);
        Ok(request)
    }

    pub fn select_color(&mut self, color: Option<ColorVariant>, raw_text: &str) -> Result<(), SelectorError> {
        self.selection.select_color(color, raw_text)?;
        self.errors.remove(fields::COLOR);
        Ok(())
    }

    pub fn select_color_text(&mut self, raw_text: &str) -> Result<(), SelectorError> {
        self.selection.select_color_text(raw_text)?;
        self.errors.remove(fields::COLOR);
        Ok(())
    }

    /// Deliver a brand's models; see [`CascadingSelector::apply_models`]
    pub fn apply_models(&mut self, brand_id: &str, models: Vec<ModelVariant>) -> bool {
        self.selection.apply_models(brand_id, models)
    }

    pub fn apply_accessories(&mut self, brand_id: &str, accessories: Vec<AccessoryVariant>) -> bool {
        self.selection.apply_accessories(brand_id, accessories)
    }

    pub fn apply_colors(&mut self, key: &ColorKey, colors: Vec<ColorVariant>) -> bool {
        self.selection.apply_colors(key, colors)
    }

    // ------------------------------------------------------------------
    // Quantity and identities
    // ------------------------------------------------------------------

    /// Apply a new quantity (clamped to 1..=100) and return it
    ///
    /// A mobile being edited stays at one unit. For new mobile intake the
    /// identity list follows the quantity; growing out of a single unit
    /// carries the single imei/imei2 pair into an empty first record.
    pub fn set_quantity(&mut self, requested: i64) -> u32 {
        if self.is_editing() && self.category == Category::Mobile {
            self.quantity = 1;
            return self.quantity;
        }

        let previous = self.quantity;
        self.quantity = match self.category {
            Category::Mobile => self.identities.set_quantity(requested),
            Category::Accessory => clamp_quantity(requested),
        };
        if self.category == Category::Mobile && previous == 1 && self.quantity > 1 {
            self.seed_first_identity();
        }

        self.clear_errors(&[fields::QUANTITY, fields::IMEI_LIST]);
        for dropped in self.quantity..previous.max(self.quantity) {
            self.errors.remove(&fields::unit_imei(dropped as usize));
        }
        if let Some(ScanTarget::Unit { index, .. }) = self.scan_target {
            if index >= self.quantity as usize {
                self.scan_target = None;
            }
        }
        self.quantity
    }

    /// Set a field of the single imei/imei2 pair
    pub fn set_imei(&mut self, field: IdentityField, value: impl Into<String>) {
        match field {
            IdentityField::Imei1 => {
                self.imei = value.into();
                self.errors.remove(fields::IMEI);
            }
            IdentityField::Imei2 => {
                self.imei2 = value.into();
                self.errors.remove(fields::IMEI2);
            }
        }
    }

    /// Set a field of one identity record
    pub fn update_identity(&mut self, index: usize, field: IdentityField, value: impl Into<String>) -> bool {
        let updated = self.identities.update_identity(index, field, value);
        if updated && field == IdentityField::Imei1 {
            self.errors.remove(&fields::unit_imei(index));
        }
        updated
    }

    /// Shrink a batch to the units at `indices`, in order
    ///
    /// Used after a partially failed batch submission so that only the
    /// units that were not created remain. When one unit is left the form
    /// falls back to the single imei/imei2 pair.
    pub fn retain_units(&mut self, indices: &[usize]) {
        if self.mode() != IntakeMode::Batch {
            return;
        }
        self.identities.retain_indices(indices);
        self.quantity = self.identities.len() as u32;
        if self.quantity == 1 {
            if let Some(entry) = self.identities.get(0).cloned() {
                self.imei = entry.imei1;
                self.imei2 = entry.imei2;
            }
            self.identities.clear();
        }
        self.errors.clear();
    }

    // ------------------------------------------------------------------
    // Plain fields
    // ------------------------------------------------------------------

    pub fn set_purchase_price(&mut self, value: impl Into<String>) {
        self.purchase_price = value.into();
        self.errors.remove(fields::PURCHASE_PRICE);
    }

    pub fn set_selling_price(&mut self, value: impl Into<String>) {
        self.selling_price = value.into();
        self.errors.remove(fields::SELLING_PRICE);
    }

    pub fn set_tax_id(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.tax_id = if value.trim().is_empty() {
            default_tax_id()
        } else {
            value
        };
        self.errors.remove(fields::TAX);
    }

    pub fn set_vendor_id(&mut self, value: impl Into<String>) {
        self.vendor_id = value.into();
        self.errors.remove(fields::VENDOR);
    }

    pub fn set_barcode(&mut self, value: impl Into<String>) {
        self.barcode = value.into();
        self.errors.remove(fields::BARCODE);
    }

    pub fn set_notes(&mut self, value: impl Into<String>) {
        self.notes = value.into();
        self.errors.remove(fields::NOTES);
    }

    pub fn set_low_stock_threshold(&mut self, value: impl Into<String>) {
        self.low_stock_threshold = value.into();
        self.errors.remove(fields::LOW_STOCK_THRESHOLD);
    }

    // ------------------------------------------------------------------
    // Scanner
    // ------------------------------------------------------------------

    /// Choose the one field the next scan fills
    pub fn arm_scan(&mut self, target: ScanTarget) -> Result<(), ScanError> {
        match target {
            ScanTarget::Imei { .. } | ScanTarget::Unit { .. } if self.category != Category::Mobile => {
                return Err(ScanError::NoIdentity(self.category));
            }
            ScanTarget::Unit { index, .. } => {
                if self.mode() != IntakeMode::Batch {
                    return Err(ScanError::NotBatch);
                }
                if index >= self.identities.len() {
                    return Err(ScanError::IndexOutOfRange {
                        index,
                        quantity: self.quantity,
                    });
                }
            }
            ScanTarget::Imei { .. } | ScanTarget::Barcode => {}
        }
        self.scan_target = Some(target);
        Ok(())
    }

    pub fn scan_target(&self) -> Option<ScanTarget> {
        self.scan_target
    }

    pub fn cancel_scan(&mut self) {
        self.scan_target = None;
    }

    /// Write a decoded scan into the armed target and disarm it
    pub fn apply_scan(&mut self, decoded: &str) -> Result<ScanTarget, ScanError> {
        let target = self.scan_target.take().ok_or(ScanError::NotArmed)?;
        let value = decoded.trim();
        if value.is_empty() {
            return Err(ScanError::EmptyScan);
        }
        match target {
            ScanTarget::Imei { field } => self.set_imei(field, value),
            ScanTarget::Unit { index, field } => {
                if !self.update_identity(index, field, value) {
                    return Err(ScanError::IndexOutOfRange {
                        index,
                        quantity: self.quantity,
                    });
                }
            }
            ScanTarget::Barcode => self.set_barcode(value),
        }
        Ok(target)
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    /// Selling price including the selected tax
    pub fn final_price(&self, rules: &[TaxRule]) -> Decimal {
        compute_final_price(&self.selling_price, Some(&self.tax_id), rules)
    }

    /// Run the submit-time validation and store its errors
    pub fn validate(&mut self) -> bool {
        self.errors = crate::validation::validate_intake(self);
        self.errors.is_empty()
    }

    /// Back to an empty form of the same category
    pub fn reset(&mut self) {
        *self = Self::new(self.category);
    }

    /// Replace quantity and identities without the transitions that keep
    /// them in step
    #[cfg(test)]
    pub(crate) fn overwrite_units(&mut self, quantity: u32, identities: UnitIdentitySet) {
        self.quantity = quantity;
        self.identities = identities;
    }

    fn seed_first_identity(&mut self) {
        if self.identities.get(0).map_or(false, |entry| entry.is_empty()) {
            self.identities.update_identity(0, IdentityField::Imei1, self.imei.clone());
            self.identities.update_identity(0, IdentityField::Imei2, self.imei2.clone());
        }
    }

    fn clear_errors(&mut self, keys: &[&str]) {
        for key in keys {
            self.errors.remove(key);
        }
    }
}

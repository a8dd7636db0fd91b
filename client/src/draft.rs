//! File-based intake drafts
//!
//! A draft is the JSON equivalent of filling in the intake dialog by hand.
//! Applying it drives the session through the same transitions a user
//! would, so the cascading lookups and validation behave identically.

use serde::{Deserialize, Serialize};

use shared::{Category, IdentityField, UnitIdentity};

use crate::error::ClientResult;
use crate::session::IntakeSession;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakeDraft {
    #[serde(default)]
    pub category: Category,
    /// Brand name as listed in the catalog
    pub brand: String,
    /// Model (or accessory) display name, e.g. "iPhone 15 128GB"
    pub model: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Ignored for mobiles when `units` is given
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub purchase_price: String,
    pub selling_price: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub imei: Option<String>,
    #[serde(default)]
    pub imei2: Option<String>,
    /// One entry per physical unit for multi-unit mobile intake
    #[serde(default)]
    pub units: Vec<UnitIdentity>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub low_stock_threshold: Option<u32>,
}

fn default_quantity() -> i64 {
    1
}

impl IntakeDraft {
    pub fn from_json(text: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Fill the session's form from this draft
    ///
    /// Unknown brands are an error; unknown model or color text is kept as
    /// typed and left for validation to report.
    pub async fn apply(&self, session: &mut IntakeSession) -> ClientResult<()> {
        session.select_brand_by_name(&self.brand).await?;
        session.select_model_text(&self.model).await?;
        if let Some(color) = &self.color {
            if session.state().category().has_color_level() {
                session.select_color_text(color)?;
            }
        }

        let state = session.state_mut();
        let batch = state.category() == Category::Mobile && self.units.len() > 1;
        let quantity = match (state.category(), self.units.len()) {
            (Category::Mobile, n) if n > 0 => n as i64,
            _ => self.quantity,
        };
        state.set_quantity(quantity);

        if batch {
            for (index, unit) in self.units.iter().enumerate() {
                state.update_identity(index, IdentityField::Imei1, unit.imei1.clone());
                state.update_identity(index, IdentityField::Imei2, unit.imei2.clone());
            }
        } else if let Some(unit) = self.units.first() {
            state.set_imei(IdentityField::Imei1, unit.imei1.clone());
            state.set_imei(IdentityField::Imei2, unit.imei2.clone());
        } else {
            state.set_imei(IdentityField::Imei1, self.imei.clone().unwrap_or_default());
            state.set_imei(IdentityField::Imei2, self.imei2.clone().unwrap_or_default());
        }

        state.set_purchase_price(self.purchase_price.clone());
        state.set_selling_price(self.selling_price.clone());
        state.set_tax_id(self.tax_id.clone().unwrap_or_default());
        state.set_vendor_id(self.vendor_id.clone().unwrap_or_default());
        state.set_barcode(self.barcode.clone().unwrap_or_default());
        state.set_notes(self.notes.clone().unwrap_or_default());
        state.set_low_stock_threshold(
            self.low_stock_threshold
                .map(|t| t.to_string())
                .unwrap_or_default(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_draft_defaults() {
        let draft = IntakeDraft::from_json(
            r#"{"brand":"Apple","model":"iPhone 15 128GB","purchasePrice":"800","sellingPrice":"950"}"#,
        )
        .unwrap();
        assert_eq!(draft.category, Category::Mobile);
        assert_eq!(draft.quantity, 1);
        assert!(draft.units.is_empty());
        assert!(draft.tax_id.is_none());
    }

    #[test]
    fn test_batch_draft() {
        let draft = IntakeDraft::from_json(
            r#"{
                "category": "mobile", "brand": "Apple", "model": "iPhone 15 128GB",
                "color": "Black", "purchasePrice": "800", "sellingPrice": "950",
                "units": [{"imei1": "111"}, {"imei1": "222", "imei2": "333"}]
            }"#,
        )
        .unwrap();
        assert_eq!(draft.units.len(), 2);
        assert_eq!(draft.units[0].imei2, "");
        assert_eq!(draft.units[1].imei2, "333");
    }

    #[test]
    fn test_invalid_json() {
        let err = IntakeDraft::from_json("{").unwrap_err();
        assert_eq!(err.code(), "SERIALIZATION_ERROR");
    }
}

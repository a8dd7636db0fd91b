//! Inventory unit models and submission payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Category, IdentityField};

/// Serial identity of one physical mobile unit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitIdentity {
    pub imei1: String,
    #[serde(default)]
    pub imei2: String,
}

impl UnitIdentity {
    pub fn new(imei1: impl Into<String>, imei2: impl Into<String>) -> Self {
        Self {
            imei1: imei1.into(),
            imei2: imei2.into(),
        }
    }

    pub fn get(&self, field: IdentityField) -> &str {
        match field {
            IdentityField::Imei1 => &self.imei1,
            IdentityField::Imei2 => &self.imei2,
        }
    }

    pub fn set(&mut self, field: IdentityField, value: String) {
        match field {
            IdentityField::Imei1 => self.imei1 = value,
            IdentityField::Imei2 => self.imei2 = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imei1.trim().is_empty() && self.imei2.trim().is_empty()
    }
}

/// An inventory record as returned by the inventory API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub category: Category,
    pub brand_id: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Color id, or model id when the model has no catalog colors
    #[serde(default)]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub imei: Option<String>,
    #[serde(default)]
    pub imei2: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    #[serde(default)]
    pub final_price: Option<Decimal>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub low_stock_threshold: Option<u32>,
    pub created_at: DateTime<Utc>,
}

fn default_quantity() -> u32 {
    1
}

/// Create/update body for one mobile unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MobileUnitPayload {
    pub brand_id: String,
    pub brand: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    pub product_id: String,
    pub mobile_catalog_id: String,
    pub color: String,
    pub imei: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei2: Option<String>,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub final_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<u32>,
}

/// Create/update body for an accessory stock entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryStockPayload {
    pub brand_id: String,
    pub brand: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Catalog linkage; both omitted for a typed name with no catalog entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory_catalog_id: Option<String>,
    pub quantity: u32,
    pub purchase_price: Decimal,
    pub selling_price: Decimal,
    pub final_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<u32>,
}

/// One downstream create (or update) operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IntakePayload {
    Mobile(MobileUnitPayload),
    Accessory(AccessoryStockPayload),
}

impl IntakePayload {
    pub fn category(&self) -> Category {
        match self {
            IntakePayload::Mobile(_) => Category::Mobile,
            IntakePayload::Accessory(_) => Category::Accessory,
        }
    }

    /// Short label for logs and notifications
    pub fn describe(&self) -> String {
        match self {
            IntakePayload::Mobile(p) => format!("{} {} (IMEI {})", p.brand, p.model, p.imei),
            IntakePayload::Accessory(p) => format!("{} {} x{}", p.brand, p.name, p.quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_field_access() {
        let mut identity = UnitIdentity::default();
        assert!(identity.is_empty());
        identity.set(IdentityField::Imei2, "222".to_string());
        assert_eq!(identity.get(IdentityField::Imei2), "222");
        assert_eq!(identity.get(IdentityField::Imei1), "");
        assert!(!identity.is_empty());
    }

    #[test]
    fn test_unit_deserializes_with_defaults() {
        let json = r#"{
            "id": "u1", "category": "mobile", "brandId": "b1", "brand": "Apple",
            "model": "iPhone 15", "purchasePrice": "800", "sellingPrice": "950",
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let unit: Unit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.quantity, 1);
        assert_eq!(unit.purchase_price, Decimal::from(800));
        assert!(unit.imei.is_none());
    }
}

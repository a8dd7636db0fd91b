//! Common types used across the intake core

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Hard bounds for the quantity field of an intake form
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 100;

/// Product category an intake form is opened for
///
/// Fixed for the lifetime of a form instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Mobile,
    Accessory,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mobile => "mobile",
            Category::Accessory => "accessory",
        }
    }

    /// Mobiles resolve down to a color; accessories stop at the model
    pub fn has_color_level(&self) -> bool {
        matches!(self, Category::Mobile)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(Category::Mobile),
            "accessory" => Ok(Category::Accessory),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Which serial identifier of an IMEI pair is addressed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    Imei1,
    Imei2,
}

/// Field keys used in [`FieldErrors`]
///
/// Batch entries use `imei_<index>`, see [`fields::unit_imei`].
pub mod fields {
    pub const BRAND: &str = "brand";
    pub const MODEL: &str = "model";
    pub const COLOR: &str = "color";
    pub const QUANTITY: &str = "quantity";
    pub const PURCHASE_PRICE: &str = "purchase_price";
    pub const SELLING_PRICE: &str = "selling_price";
    pub const TAX: &str = "tax_id";
    pub const IMEI: &str = "imei";
    pub const IMEI2: &str = "imei2";
    pub const IMEI_LIST: &str = "imei_list";
    pub const VENDOR: &str = "vendor_id";
    pub const BARCODE: &str = "barcode";
    pub const NOTES: &str = "notes";
    pub const LOW_STOCK_THRESHOLD: &str = "low_stock_threshold";

    pub fn unit_imei(index: usize) -> String {
        format!("imei_{}", index)
    }
}

/// Field-keyed validation errors
///
/// Ordered by key so rendering and serialization are stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("Mobile".parse::<Category>().unwrap(), Category::Mobile);
        assert_eq!(" accessory ".parse::<Category>().unwrap(), Category::Accessory);
        assert!("tablet".parse::<Category>().is_err());
    }

    #[test]
    fn test_field_errors_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.insert(fields::BRAND, "Brand is required");
        errors.insert(fields::BRAND, "something else");
        assert_eq!(errors.get(fields::BRAND), Some("Brand is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_field_errors_serialize_flat() {
        let mut errors = FieldErrors::new();
        errors.insert(fields::unit_imei(2), "IMEI 1 is required");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"imei_2":"IMEI 1 is required"}"#);
    }
}

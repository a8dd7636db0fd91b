//! Catalog reference models (brands, variants, colors, vendors)

use serde::{Deserialize, Serialize};

use crate::types::Category;

/// A brand in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brand {
    pub id: String,
    pub name: String,
}

impl Brand {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A concrete sellable mobile model (name + memory) for a brand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelVariant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Searchable composite of name and memory
    #[serde(default)]
    pub display_name: String,
    pub product_id: String,
}

impl ModelVariant {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        memory: Option<&str>,
        product_id: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let memory = memory.map(str::to_string);
        Self {
            id: id.into(),
            display_name: compose_display_name(&name, memory.as_deref()),
            name,
            memory,
            product_id: product_id.into(),
        }
    }

    /// Display name, falling back to the composite when the API omitted it
    pub fn label(&self) -> String {
        if self.display_name.trim().is_empty() {
            compose_display_name(&self.name, self.memory.as_deref())
        } else {
            self.display_name.clone()
        }
    }
}

/// A color offered for one `(brand, model name, memory)` triple
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorVariant {
    pub id: String,
    pub color: String,
}

impl ColorVariant {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
        }
    }
}

/// A catalog accessory; granularity stops here, there is no color level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryVariant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default)]
    pub display_name: String,
    pub product_id: String,
}

impl AccessoryVariant {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        memory: Option<&str>,
        product_id: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let memory = memory.map(str::to_string);
        Self {
            id: id.into(),
            display_name: compose_display_name(&name, memory.as_deref()),
            name,
            memory,
            product_id: product_id.into(),
        }
    }

    pub fn label(&self) -> String {
        if self.display_name.trim().is_empty() {
            compose_display_name(&self.name, self.memory.as_deref())
        } else {
            self.display_name.clone()
        }
    }
}

/// A resolved second-level catalog entry, discriminated by form category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum CatalogVariant {
    Mobile(ModelVariant),
    Accessory(AccessoryVariant),
}

impl CatalogVariant {
    pub fn category(&self) -> Category {
        match self {
            CatalogVariant::Mobile(_) => Category::Mobile,
            CatalogVariant::Accessory(_) => Category::Accessory,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CatalogVariant::Mobile(m) => &m.id,
            CatalogVariant::Accessory(a) => &a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogVariant::Mobile(m) => &m.name,
            CatalogVariant::Accessory(a) => &a.name,
        }
    }

    pub fn memory(&self) -> Option<&str> {
        match self {
            CatalogVariant::Mobile(m) => m.memory.as_deref(),
            CatalogVariant::Accessory(a) => a.memory.as_deref(),
        }
    }

    pub fn product_id(&self) -> &str {
        match self {
            CatalogVariant::Mobile(m) => &m.product_id,
            CatalogVariant::Accessory(a) => &a.product_id,
        }
    }

    pub fn label(&self) -> String {
        match self {
            CatalogVariant::Mobile(m) => m.label(),
            CatalogVariant::Accessory(a) => a.label(),
        }
    }

    pub fn as_mobile(&self) -> Option<&ModelVariant> {
        match self {
            CatalogVariant::Mobile(m) => Some(m),
            CatalogVariant::Accessory(_) => None,
        }
    }
}

/// A supplier that stock is purchased from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// "iPhone 15" + "128GB" -> "iPhone 15 128GB"
pub fn compose_display_name(name: &str, memory: Option<&str>) -> String {
    match memory.map(str::trim).filter(|m| !m.is_empty()) {
        Some(memory) => format!("{} {}", name.trim(), memory),
        None => name.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_composition() {
        assert_eq!(compose_display_name("iPhone 15", Some("128GB")), "iPhone 15 128GB");
        assert_eq!(compose_display_name("Pixel 8 ", Some("  ")), "Pixel 8");
        assert_eq!(compose_display_name("Galaxy A15", None), "Galaxy A15");
    }

    #[test]
    fn test_model_variant_deserializes_camel_case() {
        let json = r#"{"id":"m1","name":"iPhone 15","memory":"128GB","displayName":"iPhone 15 128GB","productId":"p1"}"#;
        let model: ModelVariant = serde_json::from_str(json).unwrap();
        assert_eq!(model.product_id, "p1");
        assert_eq!(model.label(), "iPhone 15 128GB");
    }

    #[test]
    fn test_label_falls_back_when_display_name_missing() {
        let json = r#"{"id":"a1","name":"USB-C Cable","productId":"p9"}"#;
        let accessory: AccessoryVariant = serde_json::from_str(json).unwrap();
        assert_eq!(accessory.label(), "USB-C Cable");
    }
}

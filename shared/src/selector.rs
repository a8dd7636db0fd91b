//! Cascading brand -> model [-> color] selection
//!
//! Selecting a level invalidates every level below it. Candidate lists for a
//! level are requested lazily once its parent is chosen; the selector hands
//! out a [`LookupRequest`] and accepts the answer only while that parent is
//! still the current one, so late responses for an abandoned brand or model
//! are dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{find_exact, suggest, ColorKey};
use crate::models::{AccessoryVariant, Brand, CatalogVariant, ColorVariant, ModelVariant};
use crate::types::Category;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("{0} selections have no color level")]
    NoColorLevel(Category),

    #[error("expected a {expected} variant, got a {found} variant")]
    CategoryMismatch { expected: Category, found: Category },

    #[error("a brand must be selected first")]
    BrandNotSelected,

    #[error("a catalog model must be resolved before picking a catalog color")]
    ModelNotResolved,
}

/// A catalog lookup the caller should dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    Models { brand: Brand },
    Accessories { brand: Brand },
    Colors { brand: Brand, model: ModelVariant },
}

/// How the color level is currently entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorEntry {
    /// Category has no color level
    NotApplicable,
    /// No resolved model yet, or colors still loading
    Pending,
    /// Pick from catalog colors
    Catalog,
    /// Catalog has no colors for the model; free text
    Manual,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CascadingSelector {
    category: Category,
    brand: Option<Brand>,
    model: Option<CatalogVariant>,
    model_text: String,
    color: Option<ColorVariant>,
    color_text: String,
    /// `None` until the lookup for the current brand has been applied
    models: Option<Vec<ModelVariant>>,
    accessories: Option<Vec<AccessoryVariant>>,
    colors: Option<Vec<ColorVariant>>,
}

impl CascadingSelector {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Default::default()
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn brand(&self) -> Option<&Brand> {
        self.brand.as_ref()
    }

    pub fn model(&self) -> Option<&CatalogVariant> {
        self.model.as_ref()
    }

    pub fn model_text(&self) -> &str {
        &self.model_text
    }

    pub fn color(&self) -> Option<&ColorVariant> {
        self.color.as_ref()
    }

    pub fn color_text(&self) -> &str {
        &self.color_text
    }

    /// Choose a brand; model and color state is always cleared
    ///
    /// Returns the lookup for the brand's models or accessories, or `None`
    /// when the brand has a blank id.
    pub fn select_brand(&mut self, brand: Brand) -> Option<LookupRequest> {
        self.clear_model();
        self.models = None;
        self.accessories = None;

        let request = if brand.id.trim().is_empty() {
            None
        } else {
            Some(match self.category {
                Category::Mobile => LookupRequest::Models {
                    brand: brand.clone(),
                },
                Category::Accessory => LookupRequest::Accessories {
                    brand: brand.clone(),
                },
            })
        };
        self.brand = Some(brand);
        request
    }

    /// Record a model choice: a catalog match, or raw text that matched nothing
    ///
    /// Color state is cleared either way. A resolved mobile model yields the
    /// color lookup for it.
    pub fn select_model(
        &mut self,
        model: Option<CatalogVariant>,
        raw_text: &str,
    ) -> Result<Option<LookupRequest>, SelectorError> {
        if let Some(variant) = &model {
            if variant.category() != self.category {
                return Err(SelectorError::CategoryMismatch {
                    expected: self.category,
                    found: variant.category(),
                });
            }
            if self.brand.is_none() {
                return Err(SelectorError::BrandNotSelected);
            }
        }

        self.clear_color();
        self.model_text = raw_text.to_string();
        self.model = model;

        let request = match (&self.brand, &self.model) {
            (Some(brand), Some(CatalogVariant::Mobile(m)))
                if !brand.id.trim().is_empty() && !m.name.trim().is_empty() =>
            {
                Some(LookupRequest::Colors {
                    brand: brand.clone(),
                    model: m.clone(),
                })
            }
            _ => None,
        };
        Ok(request)
    }

    /// Resolve typed text against the loaded candidates, then select
    pub fn select_model_text(&mut self, raw_text: &str) -> Result<Option<LookupRequest>, SelectorError> {
        let matched = match self.category {
            Category::Mobile => self
                .models
                .as_deref()
                .and_then(|models| find_exact(models, raw_text))
                .cloned()
                .map(CatalogVariant::Mobile),
            Category::Accessory => self
                .accessories
                .as_deref()
                .and_then(|items| find_exact(items, raw_text))
                .cloned()
                .map(CatalogVariant::Accessory),
        };
        self.select_model(matched, raw_text)
    }

    /// Record a color choice: a catalog match, or raw text
    pub fn select_color(&mut self, color: Option<ColorVariant>, raw_text: &str) -> Result<(), SelectorError> {
        if !self.category.has_color_level() {
            return Err(SelectorError::NoColorLevel(self.category));
        }
        if color.is_some() && self.model.is_none() {
            return Err(SelectorError::ModelNotResolved);
        }
        self.color = color;
        self.color_text = raw_text.to_string();
        Ok(())
    }

    /// Resolve typed color text against the loaded colors, then select
    pub fn select_color_text(&mut self, raw_text: &str) -> Result<(), SelectorError> {
        let matched = self
            .colors
            .as_deref()
            .and_then(|colors| find_exact(colors, raw_text))
            .cloned();
        self.select_color(matched, raw_text)
    }

    /// Accept a model list if it answers the currently selected brand
    pub fn apply_models(&mut self, brand_id: &str, models: Vec<ModelVariant>) -> bool {
        if self.category != Category::Mobile || !self.is_current_brand(brand_id) {
            return false;
        }
        self.models = Some(models);
        true
    }

    /// Accept an accessory list if it answers the currently selected brand
    pub fn apply_accessories(&mut self, brand_id: &str, accessories: Vec<AccessoryVariant>) -> bool {
        if self.category != Category::Accessory || !self.is_current_brand(brand_id) {
            return false;
        }
        self.accessories = Some(accessories);
        true
    }

    /// Accept a color list if it answers the currently resolved model
    pub fn apply_colors(&mut self, key: &ColorKey, colors: Vec<ColorVariant>) -> bool {
        if self.current_color_key().as_ref() != Some(key) {
            return false;
        }
        self.colors = Some(colors);
        true
    }

    /// The lookup the current selection is still waiting on, if any
    ///
    /// Lets a caller that restored or prefilled a selection catch up on the
    /// candidate lists it never received.
    pub fn pending_lookup(&self) -> Option<LookupRequest> {
        let brand = self.brand.as_ref().filter(|b| !b.id.trim().is_empty())?;
        match self.category {
            Category::Mobile if self.models.is_none() => Some(LookupRequest::Models {
                brand: brand.clone(),
            }),
            Category::Accessory if self.accessories.is_none() => Some(LookupRequest::Accessories {
                brand: brand.clone(),
            }),
            Category::Mobile if self.colors.is_none() => {
                let model = self.model.as_ref()?.as_mobile()?;
                (!model.name.trim().is_empty()).then(|| LookupRequest::Colors {
                    brand: brand.clone(),
                    model: model.clone(),
                })
            }
            _ => None,
        }
    }

    /// Key of the color list the current selection needs, if any
    pub fn current_color_key(&self) -> Option<ColorKey> {
        let brand = self.brand.as_ref()?;
        let model = self.model.as_ref()?.as_mobile()?;
        Some(ColorKey::new(&brand.id, model))
    }

    pub fn model_suggestions(&self, text: &str) -> Vec<CatalogVariant> {
        match self.category {
            Category::Mobile => suggest(self.models.as_deref().unwrap_or_default(), text)
                .into_iter()
                .cloned()
                .map(CatalogVariant::Mobile)
                .collect(),
            Category::Accessory => suggest(self.accessories.as_deref().unwrap_or_default(), text)
                .into_iter()
                .cloned()
                .map(CatalogVariant::Accessory)
                .collect(),
        }
    }

    pub fn color_suggestions(&self, text: &str) -> Vec<&ColorVariant> {
        suggest(self.colors.as_deref().unwrap_or_default(), text)
    }

    /// Model input falls back to free text when the brand has no catalog entries
    pub fn model_is_manual(&self) -> bool {
        match self.category {
            Category::Mobile => matches!(self.models.as_deref(), Some([])),
            Category::Accessory => matches!(self.accessories.as_deref(), Some([])),
        }
    }

    pub fn color_entry(&self) -> ColorEntry {
        if !self.category.has_color_level() {
            return ColorEntry::NotApplicable;
        }
        match (&self.model, self.colors.as_deref()) {
            (None, _) | (_, None) => ColorEntry::Pending,
            (Some(_), Some([])) => ColorEntry::Manual,
            (Some(_), Some(_)) => ColorEntry::Catalog,
        }
    }

    /// Whether the resolved model has at least one catalog color
    pub fn has_catalog_colors(&self) -> bool {
        self.model.is_some() && self.colors.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Catalog linkage id: the resolved color's id, else the model's own id
    pub fn linkage_id(&self) -> Option<&str> {
        match (&self.color, &self.model) {
            (Some(color), Some(_)) => Some(color.id.as_str()),
            (None, Some(model)) => Some(model.id()),
            _ => None,
        }
    }

    /// The color to put on a payload: catalog name if resolved, else the typed text
    pub fn effective_color(&self) -> Option<String> {
        if let Some(color) = &self.color {
            return Some(color.color.clone());
        }
        let text = self.color_text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn is_current_brand(&self, brand_id: &str) -> bool {
        self.brand.as_ref().is_some_and(|b| b.id == brand_id)
    }

    /// Put back unresolved model and color text, as saved on an existing unit
    ///
    /// Color text is dropped for categories without a color level.
    pub(crate) fn restore_text(&mut self, model_text: &str, color_text: Option<&str>) {
        self.clear_model();
        self.model_text = model_text.to_string();
        if self.category.has_color_level() {
            self.color_text = color_text.unwrap_or_default().to_string();
        }
    }

    fn clear_model(&mut self) {
        self.model = None;
        self.model_text.clear();
        self.clear_color();
    }

    fn clear_color(&mut self) {
        self.color = None;
        self.color_text.clear();
        self.colors = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> Brand {
        Brand::new("b1", "Apple")
    }

    fn iphone() -> ModelVariant {
        ModelVariant::new("m1", "iPhone 15", Some("128GB"), "p1")
    }

    fn selected_with_colors() -> CascadingSelector {
        let mut selector = CascadingSelector::new(Category::Mobile);
        selector.select_brand(apple());
        selector.apply_models("b1", vec![iphone()]);
        selector.select_model_text("iPhone 15 128GB").unwrap();
        let key = selector.current_color_key().unwrap();
        selector.apply_colors(&key, vec![ColorVariant::new("c1", "Black"), ColorVariant::new("c2", "Blue")]);
        selector.select_color_text("black").unwrap();
        selector
    }

    #[test]
    fn test_select_brand_requests_models_for_category() {
        let mut mobile = CascadingSelector::new(Category::Mobile);
        assert_eq!(
            mobile.select_brand(apple()),
            Some(LookupRequest::Models { brand: apple() })
        );

        let mut accessory = CascadingSelector::new(Category::Accessory);
        assert_eq!(
            accessory.select_brand(apple()),
            Some(LookupRequest::Accessories { brand: apple() })
        );
    }

    #[test]
    fn test_blank_parent_never_requests() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        assert_eq!(selector.select_brand(Brand::new("  ", "Unknown")), None);

        let mut selector = CascadingSelector::new(Category::Mobile);
        selector.select_brand(apple());
        let nameless = ModelVariant::new("m0", "", None, "p0");
        assert_eq!(selector.select_model(Some(CatalogVariant::Mobile(nameless)), "").unwrap(), None);
    }

    #[test]
    fn test_select_brand_clears_model_and_color() {
        let mut selector = selected_with_colors();
        assert_eq!(selector.linkage_id(), Some("c1"));

        selector.select_brand(Brand::new("b2", "Samsung"));
        assert!(selector.model().is_none());
        assert!(selector.model_text().is_empty());
        assert!(selector.color().is_none());
        assert!(selector.color_text().is_empty());
        assert!(selector.model_suggestions("").is_empty());
        assert_eq!(selector.color_entry(), ColorEntry::Pending);
    }

    #[test]
    fn test_reselecting_same_brand_still_resets() {
        let mut selector = selected_with_colors();
        selector.select_brand(apple());
        assert!(selector.model().is_none());
        assert!(selector.color().is_none());
    }

    #[test]
    fn test_unmatched_model_text_is_kept_unresolved() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        selector.select_brand(apple());
        selector.apply_models("b1", vec![iphone()]);
        let request = selector.select_model_text("iPhone 99").unwrap();
        assert_eq!(request, None);
        assert!(selector.model().is_none());
        assert_eq!(selector.model_text(), "iPhone 99");
    }

    #[test]
    fn test_select_model_clears_color() {
        let mut selector = selected_with_colors();
        let request = selector.select_model_text("iPhone 15 128GB").unwrap();
        assert!(matches!(request, Some(LookupRequest::Colors { .. })));
        assert!(selector.color().is_none());
        assert_eq!(selector.color_entry(), ColorEntry::Pending);
    }

    #[test]
    fn test_stale_model_response_is_discarded() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        selector.select_brand(apple());
        selector.select_brand(Brand::new("b2", "Samsung"));
        assert!(!selector.apply_models("b1", vec![iphone()]));
        assert!(selector.model_suggestions("").is_empty());
    }

    #[test]
    fn test_stale_color_response_is_discarded() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        selector.select_brand(apple());
        selector.apply_models("b1", vec![iphone(), ModelVariant::new("m2", "iPhone 15", Some("256GB"), "p2")]);
        selector.select_model_text("iPhone 15 128GB").unwrap();
        let stale_key = selector.current_color_key().unwrap();
        selector.select_model_text("iPhone 15 256GB").unwrap();

        assert!(!selector.apply_colors(&stale_key, vec![ColorVariant::new("c1", "Black")]));
        assert_eq!(selector.color_entry(), ColorEntry::Pending);
    }

    #[test]
    fn test_empty_colors_degrade_to_manual_entry() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        selector.select_brand(apple());
        selector.apply_models("b1", vec![iphone()]);
        selector.select_model_text("iPhone 15 128GB").unwrap();
        let key = selector.current_color_key().unwrap();
        assert!(selector.apply_colors(&key, Vec::new()));

        assert_eq!(selector.color_entry(), ColorEntry::Manual);
        selector.select_color_text("Black").unwrap();
        assert!(selector.color().is_none());
        assert_eq!(selector.effective_color().as_deref(), Some("Black"));
        assert_eq!(selector.linkage_id(), Some("m1"));
    }

    #[test]
    fn test_empty_model_list_is_manual() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        selector.select_brand(apple());
        assert!(!selector.model_is_manual());
        selector.apply_models("b1", Vec::new());
        assert!(selector.model_is_manual());
    }

    #[test]
    fn test_accessory_has_no_color_level() {
        let mut selector = CascadingSelector::new(Category::Accessory);
        selector.select_brand(apple());
        selector.apply_accessories("b1", vec![AccessoryVariant::new("a1", "MagSafe Charger", None, "p7")]);
        let request = selector.select_model_text("magsafe charger").unwrap();
        assert_eq!(request, None);
        assert_eq!(selector.linkage_id(), Some("a1"));
        assert_eq!(selector.color_entry(), ColorEntry::NotApplicable);
        assert_eq!(
            selector.select_color(None, "Red"),
            Err(SelectorError::NoColorLevel(Category::Accessory))
        );
    }

    #[test]
    fn test_variant_category_must_match() {
        let mut selector = CascadingSelector::new(Category::Accessory);
        selector.select_brand(apple());
        let err = selector
            .select_model(Some(CatalogVariant::Mobile(iphone())), "iPhone 15 128GB")
            .unwrap_err();
        assert!(matches!(err, SelectorError::CategoryMismatch { .. }));
    }

    #[test]
    fn test_pending_lookup_follows_selection() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        assert_eq!(selector.pending_lookup(), None);

        selector.select_brand(apple());
        assert_eq!(selector.pending_lookup(), Some(LookupRequest::Models { brand: apple() }));

        selector.apply_models("b1", vec![iphone()]);
        assert_eq!(selector.pending_lookup(), None);

        selector.select_model_text("iPhone 15 128GB").unwrap();
        assert_eq!(
            selector.pending_lookup(),
            Some(LookupRequest::Colors { brand: apple(), model: iphone() })
        );
    }

    #[test]
    fn test_model_requires_brand() {
        let mut selector = CascadingSelector::new(Category::Mobile);
        assert_eq!(
            selector.select_model(Some(CatalogVariant::Mobile(iphone())), "x"),
            Err(SelectorError::BrandNotSelected)
        );
    }
}

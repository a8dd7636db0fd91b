//! Session-scoped catalog cache and text matching
//!
//! Brands are fetched once per session; brand-scoped models, accessories and
//! model-scoped colors are cached as they are looked up. Only successful
//! lookups are stored so a failed fetch is retried on the next selection.

use std::collections::HashMap;

use crate::models::{AccessoryVariant, Brand, ColorVariant, ModelVariant};

/// Key for a color list: colors belong to a `(brand, model name, memory)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorKey {
    pub brand_id: String,
    pub model_name: String,
    pub memory: Option<String>,
}

impl ColorKey {
    pub fn new(brand_id: &str, model: &ModelVariant) -> Self {
        Self {
            brand_id: brand_id.to_string(),
            model_name: model.name.clone(),
            memory: model.memory.clone(),
        }
    }
}

/// Anything that can be offered as a suggestion
pub trait Searchable {
    fn search_text(&self) -> String;
}

impl Searchable for Brand {
    fn search_text(&self) -> String {
        self.name.clone()
    }
}

impl Searchable for ModelVariant {
    fn search_text(&self) -> String {
        self.label()
    }
}

impl Searchable for AccessoryVariant {
    fn search_text(&self) -> String {
        self.label()
    }
}

impl Searchable for ColorVariant {
    fn search_text(&self) -> String {
        self.color.clone()
    }
}

/// Candidates whose display text contains `text`, ignoring case
///
/// Blank input yields every candidate.
pub fn suggest<'a, T: Searchable>(candidates: &'a [T], text: &str) -> Vec<&'a T> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.iter().collect();
    }
    candidates
        .iter()
        .filter(|c| c.search_text().to_lowercase().contains(&needle))
        .collect()
}

/// The candidate whose display text equals `text`, ignoring case and padding
pub fn find_exact<'a, T: Searchable>(candidates: &'a [T], text: &str) -> Option<&'a T> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    candidates
        .iter()
        .find(|c| c.search_text().trim().to_lowercase() == needle)
}

/// Read-through cache of catalog lookups for one intake session
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    brands: Option<Vec<Brand>>,
    models: HashMap<String, Vec<ModelVariant>>,
    accessories: HashMap<String, Vec<AccessoryVariant>>,
    colors: HashMap<ColorKey, Vec<ColorVariant>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brands(&self) -> Option<&[Brand]> {
        self.brands.as_deref()
    }

    pub fn store_brands(&mut self, brands: Vec<Brand>) {
        self.brands = Some(brands);
    }

    pub fn brand_by_name(&self, name: &str) -> Option<&Brand> {
        find_exact(self.brands.as_deref()?, name)
    }

    pub fn models(&self, brand_id: &str) -> Option<&[ModelVariant]> {
        self.models.get(brand_id).map(Vec::as_slice)
    }

    pub fn store_models(&mut self, brand_id: &str, models: Vec<ModelVariant>) {
        self.models.insert(brand_id.to_string(), models);
    }

    pub fn accessories(&self, brand_id: &str) -> Option<&[AccessoryVariant]> {
        self.accessories.get(brand_id).map(Vec::as_slice)
    }

    pub fn store_accessories(&mut self, brand_id: &str, accessories: Vec<AccessoryVariant>) {
        self.accessories.insert(brand_id.to_string(), accessories);
    }

    pub fn colors(&self, key: &ColorKey) -> Option<&[ColorVariant]> {
        self.colors.get(key).map(Vec::as_slice)
    }

    pub fn store_colors(&mut self, key: ColorKey, colors: Vec<ColorVariant>) {
        self.colors.insert(key, colors);
    }
}

//! Collaborator contracts consumed by the intake session
//!
//! Network-backed services are async; the scanner is a synchronous black box
//! that hands back one decoded string per call.

use std::sync::Arc;

use async_trait::async_trait;

use shared::{AccessoryVariant, Brand, ColorVariant, IntakePayload, ModelVariant, TaxRule, Unit, Vendor};

use crate::error::ClientResult;

/// Read-only catalog lookups
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn brands(&self) -> ClientResult<Vec<Brand>>;

    async fn models(&self, brand: &Brand) -> ClientResult<Vec<ModelVariant>>;

    async fn colors(&self, brand: &Brand, model: &ModelVariant) -> ClientResult<Vec<ColorVariant>>;

    async fn accessories(&self, brand: &Brand) -> ClientResult<Vec<AccessoryVariant>>;
}

#[async_trait]
pub trait TaxService: Send + Sync {
    async fn active_tax_rules(&self) -> ClientResult<Vec<TaxRule>>;
}

#[async_trait]
pub trait VendorService: Send + Sync {
    async fn vendors(&self, owner_id: &str) -> ClientResult<Vec<Vendor>>;
}

/// Inventory writes; one call per payload, no batching or transactions
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn create_unit(&self, payload: &IntakePayload) -> ClientResult<Unit>;

    async fn update_unit(&self, unit_id: &str, payload: &IntakePayload) -> ClientResult<Unit>;
}

/// Barcode/IMEI scanner
pub trait ScannerDevice {
    fn scan(&mut self) -> ClientResult<String>;
}

/// The set of collaborators one session talks to
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn CatalogService>,
    pub tax: Arc<dyn TaxService>,
    pub vendors: Arc<dyn VendorService>,
    pub inventory: Arc<dyn InventoryService>,
}

impl Services {
    /// Use one implementation (e.g. the REST client) for every service
    pub fn from_one<T>(service: Arc<T>) -> Self
    where
        T: CatalogService + TaxService + VendorService + InventoryService + 'static,
    {
        Self {
            catalog: service.clone(),
            tax: service.clone(),
            vendors: service.clone(),
            inventory: service,
        }
    }
}

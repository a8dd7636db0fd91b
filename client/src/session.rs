//! Intake session: one open intake dialog wired to its collaborators
//!
//! The session owns the [`IntakeFormState`] and a [`CatalogIndex`] cache,
//! performs the lazy catalog lookups the selector asks for, and submits the
//! assembled payloads one by one. Lookup failures never abort the form: they
//! are logged and the affected level degrades to an empty list (manual
//! entry).

use serde::Serialize;
use uuid::Uuid;

use shared::{
    build_payloads, with_no_tax, Brand, CatalogIndex, CatalogVariant, Category, ColorKey, IntakeFormState,
    IntakePayload, LookupRequest, ScanTarget, TaxRule, Unit, Vendor,
};

use crate::error::{ClientError, ClientResult, ErrorDetail};
use crate::services::{ScannerDevice, Services};

/// A payload the inventory API did not accept
#[derive(Debug, Clone, Serialize)]
pub struct FailedUnit {
    /// Position of the payload within the submission
    pub index: usize,
    pub description: String,
    pub error: ErrorDetail,
}

/// Outcome of one submission
///
/// Submission is best-effort: units created before a failure stay created.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmitReport {
    pub created: Vec<Unit>,
    pub failed: Vec<FailedUnit>,
}

impl SubmitReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Single toast line summarising the submission
    pub fn notification(&self) -> String {
        let total = self.created.len() + self.failed.len();
        match (self.created.len(), self.failed.first()) {
            (_, None) if total == 1 => "Product added to inventory".to_string(),
            (created, None) => format!("{} units added to inventory", created),
            (0, Some(first)) => format!("Could not add stock: {}", first.error.message),
            (created, Some(first)) => format!(
                "{} of {} units added; {} failed ({}). The remaining units are still in the form.",
                created,
                total,
                self.failed.len(),
                first.error.message
            ),
        }
    }
}

pub struct IntakeSession {
    id: Uuid,
    services: Services,
    owner_id: Option<String>,
    catalog: CatalogIndex,
    tax_rules: Vec<TaxRule>,
    vendors: Vec<Vendor>,
    state: IntakeFormState,
}

impl IntakeSession {
    /// Open a new intake form and load its reference data
    pub async fn open(services: Services, category: Category, owner_id: Option<&str>) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            services,
            owner_id: owner_id.map(str::to_string),
            catalog: CatalogIndex::new(),
            tax_rules: with_no_tax(Vec::new()),
            vendors: Vec::new(),
            state: IntakeFormState::new(category),
        };
        tracing::info!(session = %session.id, category = %category, "opening intake session");
        session.load_reference_data().await;
        session
    }

    /// Open a form prefilled from an existing unit and re-resolve its catalog entry
    pub async fn open_edit(services: Services, unit: &Unit, owner_id: Option<&str>) -> Self {
        let mut session = Self::open(services, unit.category, owner_id).await;
        session.state = IntakeFormState::for_edit(unit);
        tracing::info!(session = %session.id, unit = %unit.id, "editing unit");

        if let Some(request) = session.state.selection().pending_lookup() {
            session.run_lookup(request).await;
        }

        let model_text = session.state.selection().model_text().to_string();
        let color_text = session.state.selection().color_text().to_string();
        if let Err(err) = session.resolve_edit_model(unit, &model_text).await {
            tracing::warn!(session = %session.id, "could not re-resolve model '{}': {}", model_text, err);
        }
        if unit.category.has_color_level() && !color_text.is_empty() {
            session.resolve_edit_color(unit, &color_text);
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &IntakeFormState {
        &self.state
    }

    /// Direct access for plain field edits (prices, notes, identities, ...)
    pub fn state_mut(&mut self) -> &mut IntakeFormState {
        &mut self.state
    }

    pub fn brands(&self) -> &[Brand] {
        self.catalog.brands().unwrap_or_default()
    }

    pub fn tax_rules(&self) -> &[TaxRule] {
        &self.tax_rules
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    /// Choose a brand and load its models (or accessories)
    pub async fn select_brand(&mut self, brand: Brand) {
        if let Some(request) = self.state.select_brand(brand) {
            self.run_lookup(request).await;
        }
    }

    /// Choose a brand by its name as shown in the catalog
    pub async fn select_brand_by_name(&mut self, name: &str) -> ClientResult<()> {
        let brand = self
            .catalog
            .brand_by_name(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("brand '{}'", name.trim())))?;
        self.select_brand(brand).await;
        Ok(())
    }

    /// Choose a model from a suggestion (or raw text) and load its colors
    pub async fn select_model(&mut self, model: Option<CatalogVariant>, raw_text: &str) -> ClientResult<()> {
        if let Some(request) = self.state.select_model(model, raw_text)? {
            self.run_lookup(request).await;
        }
        Ok(())
    }

    /// Resolve typed model text against the catalog and load its colors
    pub async fn select_model_text(&mut self, raw_text: &str) -> ClientResult<()> {
        if let Some(request) = self.state.select_model_text(raw_text)? {
            self.run_lookup(request).await;
        }
        Ok(())
    }

    pub fn select_color_text(&mut self, raw_text: &str) -> ClientResult<()> {
        self.state.select_color_text(raw_text)?;
        Ok(())
    }

    /// Arm `target`, read one value from the scanner and store it
    pub fn scan_into(&mut self, target: ScanTarget, scanner: &mut dyn ScannerDevice) -> ClientResult<()> {
        self.state.arm_scan(target)?;
        let decoded = match scanner.scan() {
            Ok(decoded) => decoded,
            Err(err) => {
                self.state.cancel_scan();
                return Err(err);
            }
        };
        self.state.apply_scan(&decoded)?;
        Ok(())
    }

    /// Validate and assemble without sending anything
    pub fn preview(&mut self) -> ClientResult<Vec<IntakePayload>> {
        if !self.state.validate() {
            return Err(ClientError::Validation(self.state.errors().clone()));
        }
        Ok(build_payloads(&self.state, &self.tax_rules)?)
    }

    /// Validate, assemble and send every payload
    ///
    /// Validation errors are returned as [`ClientError::Validation`] and
    /// nothing is sent. Otherwise every payload is attempted; on full
    /// success the form is reset, on partial failure only the failed units
    /// stay in the form so a retry cannot duplicate created ones.
    pub async fn submit(&mut self) -> ClientResult<SubmitReport> {
        let payloads = match self.preview() {
            Ok(payloads) => payloads,
            Err(err) => {
                tracing::debug!(session = %self.id, "submission refused: {}", err);
                return Err(err);
            }
        };
        tracing::info!(session = %self.id, units = payloads.len(), "submitting intake");

        let mut report = SubmitReport::default();
        for (index, payload) in payloads.iter().enumerate() {
            let result = match self.state.editing_unit_id() {
                Some(unit_id) => self.services.inventory.update_unit(unit_id, payload).await,
                None => self.services.inventory.create_unit(payload).await,
            };
            match result {
                Ok(unit) => {
                    tracing::debug!(session = %self.id, "stored unit {} ({})", unit.id, payload.describe());
                    report.created.push(unit);
                }
                Err(err) => {
                    tracing::warn!(session = %self.id, "unit {} rejected: {}", index + 1, err);
                    report.failed.push(FailedUnit {
                        index,
                        description: payload.describe(),
                        error: err.detail(),
                    });
                }
            }
        }

        if report.is_complete() {
            tracing::info!(session = %self.id, created = report.created.len(), "intake complete");
            self.state.reset();
        } else {
            let failed: Vec<usize> = report.failed.iter().map(|f| f.index).collect();
            tracing::warn!(
                session = %self.id,
                created = report.created.len(),
                failed = failed.len(),
                "intake partially failed"
            );
            self.state.retain_units(&failed);
        }
        Ok(report)
    }

    /// Discard the form
    pub fn cancel(&mut self) {
        tracing::debug!(session = %self.id, "intake cancelled");
        self.state.reset();
    }

    async fn load_reference_data(&mut self) {
        match self.services.catalog.brands().await {
            Ok(brands) => self.catalog.store_brands(brands),
            Err(err) => tracing::warn!(session = %self.id, "failed to load brands: {}", err),
        }

        match self.services.tax.active_tax_rules().await {
            Ok(rules) => self.tax_rules = with_no_tax(rules),
            Err(err) => tracing::warn!(session = %self.id, "failed to load tax rules: {}", err),
        }

        match self.owner_id.as_deref() {
            Some(owner_id) if !owner_id.trim().is_empty() => match self.services.vendors.vendors(owner_id).await {
                Ok(vendors) => self.vendors = vendors,
                Err(err) => tracing::warn!(session = %self.id, "failed to load vendors: {}", err),
            },
            _ => tracing::debug!(session = %self.id, "no owner id, skipping vendor lookup"),
        }
    }

    /// Answer a selector lookup from cache or the catalog service
    async fn run_lookup(&mut self, request: LookupRequest) {
        let accepted = match request {
            LookupRequest::Models { brand } => {
                let models = match self.catalog.models(&brand.id) {
                    Some(cached) => cached.to_vec(),
                    None => match self.services.catalog.models(&brand).await {
                        Ok(models) => {
                            self.catalog.store_models(&brand.id, models.clone());
                            models
                        }
                        Err(err) => {
                            tracing::warn!(session = %self.id, "failed to load models for {}: {}", brand.name, err);
                            Vec::new()
                        }
                    },
                };
                self.state.apply_models(&brand.id, models)
            }
            LookupRequest::Accessories { brand } => {
                let accessories = match self.catalog.accessories(&brand.id) {
                    Some(cached) => cached.to_vec(),
                    None => match self.services.catalog.accessories(&brand).await {
                        Ok(accessories) => {
                            self.catalog.store_accessories(&brand.id, accessories.clone());
                            accessories
                        }
                        Err(err) => {
                            tracing::warn!(session = %self.id, "failed to load accessories for {}: {}", brand.name, err);
                            Vec::new()
                        }
                    },
                };
                self.state.apply_accessories(&brand.id, accessories)
            }
            LookupRequest::Colors { brand, model } => {
                let key = ColorKey::new(&brand.id, &model);
                let colors = match self.catalog.colors(&key) {
                    Some(cached) => cached.to_vec(),
                    None => match self.services.catalog.colors(&brand, &model).await {
                        Ok(colors) => {
                            self.catalog.store_colors(key.clone(), colors.clone());
                            colors
                        }
                        Err(err) => {
                            tracing::warn!(session = %self.id, "failed to load colors for {}: {}", model.label(), err);
                            Vec::new()
                        }
                    },
                };
                self.state.apply_colors(&key, colors)
            }
        };
        if !accepted {
            tracing::debug!(session = %self.id, "discarded stale catalog response");
        }
    }

    async fn resolve_edit_model(&mut self, unit: &Unit, model_text: &str) -> ClientResult<()> {
        let by_text = self.state.select_model_text(model_text)?;
        if self.state.selection().model().is_some() {
            if let Some(request) = by_text {
                self.run_lookup(request).await;
            }
            return Ok(());
        }

        // Display names may have changed since the unit was stored
        let by_id = self.state.selection().model_suggestions("").into_iter().find(|variant| {
            unit.catalog_id.as_deref() == Some(variant.id())
                || unit.product_id.as_deref() == Some(variant.product_id())
        });
        if by_id.is_some() {
            self.select_model(by_id, model_text).await?;
        }
        Ok(())
    }

    fn resolve_edit_color(&mut self, unit: &Unit, color_text: &str) {
        let by_id = self
            .state
            .selection()
            .color_suggestions("")
            .into_iter()
            .find(|c| unit.catalog_id.as_deref() == Some(c.id.as_str()))
            .cloned();
        let result = match by_id {
            Some(color) => {
                let text = color.color.clone();
                self.state.select_color(Some(color), &text)
            }
            None => self.state.select_color_text(color_text),
        };
        if let Err(err) = result {
            tracing::warn!(session = %self.id, "could not restore color '{}': {}", color_text, err);
        }
    }
}

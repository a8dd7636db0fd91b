//! POS inventory intake client
//!
//! Wires the intake core from `shared` to the POS REST API: an
//! [`IntakeSession`] per open form, service traits for the collaborators,
//! and a reqwest-backed [`ApiClient`] implementing them.

pub mod config;
pub mod draft;
pub mod error;
pub mod external;
pub mod services;
pub mod session;

pub use config::Config;
pub use draft::IntakeDraft;
pub use error::{ClientError, ClientResult, ErrorDetail};
pub use external::ApiClient;
pub use services::{CatalogService, InventoryService, ScannerDevice, Services, TaxService, VendorService};
pub use session::{FailedUnit, IntakeSession, SubmitReport};

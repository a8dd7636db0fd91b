//! Catalog resolution and inventory intake core for the POS platform
//!
//! This crate holds the pure, synchronous part of stock intake shared by the
//! API client, the command-line driver and the browser (via WASM):
//! cascading catalog selection, the quantity-synchronised IMEI list,
//! submit-time validation, tax-inclusive pricing and payload assembly.

pub mod assembler;
pub mod catalog;
pub mod identity;
pub mod intake;
pub mod models;
pub mod pricing;
pub mod selector;
pub mod types;
pub mod validation;

pub use assembler::*;
pub use catalog::*;
pub use identity::*;
pub use intake::*;
pub use models::*;
pub use pricing::*;
pub use selector::*;
pub use types::*;
pub use validation::*;

//! Domain models for catalog lookup and inventory intake

mod catalog;
mod inventory;
mod tax;

pub use catalog::*;
pub use inventory::*;
pub use tax::*;

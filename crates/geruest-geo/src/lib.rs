//! Gerüst Geo - Footprint geometry and facade derivation
//!
//! Building footprints arrive as LV95 vertex lists (metres). This crate turns them
//! into facade sides, the scaffold preview outline, and GeoJSON for export.

pub mod facades;
pub mod models;
pub mod outline;

pub use facades::derive_facades;
pub use models::Footprint;
pub use outline::{default_outline, scaffold_outline, FootprintMetrics};

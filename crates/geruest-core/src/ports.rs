//! Port trait definitions
//!
//! These traits define the interfaces that adapters must implement.

pub mod backend;

pub use backend::Backend;

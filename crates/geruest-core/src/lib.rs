//! Gerüst Core - Domain models, take-off calculation, and session state
//!
//! This crate contains the domain logic and port definitions for the scaffolding planner.
//! Everything here is synchronous and free of I/O; backend access goes through
//! the [`ports::Backend`] trait implemented by adapter crates.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod selection;
pub mod session;
pub mod takeoff;

pub use error::{GeruestError, Result};

//! Gerüst Client - Backend adapter and client-side services
//!
//! [`HttpBackend`] implements the [`geruest_core::ports::Backend`] port over HTTP.
//! The services on top add the drawing cache, per-resource request cancellation,
//! the drawing timeout, and the take-off fallback.

pub mod address;
pub mod cache;
pub mod cancel;
pub mod drawing;
pub mod http;
pub mod takeoff;

pub use address::AddressClient;
pub use cache::{CacheStats, DrawingCache, DrawingKey};
pub use cancel::{run_cancellable, CancelToken, RequestRegistry};
pub use drawing::DrawingService;
pub use http::HttpBackend;
pub use takeoff::TakeoffService;

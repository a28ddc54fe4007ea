use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AddressLookup, CatalogEstimate, DrawingRequest, HeightFetchRequest, HeightFetchResponse,
    ManualHeights, ScaffoldingGeometry, TakeoffRequest, TakeoffResult,
};

/// Port for the scaffolding-planning backend
///
/// Every call is a single request with no retry. Adapters map transport
/// failures, non-2xx responses, and undecodable bodies onto [`crate::GeruestError`].
#[async_trait]
pub trait Backend: Send + Sync {
    /// Geocode an address and list the registry buildings at that position
    async fn lookup_address(&self, address: &str) -> Result<AddressLookup>;

    /// Facade sides, footprint, and heights for an address
    ///
    /// # Arguments
    /// * `manual` - Eave/ridge overrides the backend should use instead of measured values
    /// * `refresh` - Bypass the backend's own geometry cache
    async fn scaffolding_geometry(
        &self,
        address: &str,
        manual: Option<&ManualHeights>,
        refresh: bool,
    ) -> Result<ScaffoldingGeometry>;

    /// Authoritative NPK 114 take-off
    async fn takeoff(&self, request: &TakeoffRequest) -> Result<TakeoffResult>;

    /// Generated drawing as SVG markup
    async fn drawing(&self, request: &DrawingRequest) -> Result<String>;

    /// Import heights for a building from the height model on demand
    async fn fetch_heights(&self, request: &HeightFetchRequest) -> Result<HeightFetchResponse>;

    /// Itemized parts list for a scaffold system and billable area
    async fn material_catalog(&self, system_id: &str, area_m2: f64) -> Result<CatalogEstimate>;
}

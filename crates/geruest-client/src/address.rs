//! Address lookup and geometry loading with supersession
//!
//! Typing a new address while the previous lookup is still running cancels the
//! older request; only the newest response is ever returned to the caller.

use std::sync::Arc;

use geruest_core::error::Result;
use geruest_core::models::{
    AddressLookup, HeightFetchRequest, HeightFetchResponse, ManualHeights, ScaffoldingGeometry,
};
use geruest_core::ports::Backend;
use geruest_geo::{derive_facades, Footprint};

use crate::cancel::RequestRegistry;

const LOOKUP: &str = "lookup";
const GEOMETRY: &str = "geometry";
const HEIGHTS: &str = "heights";

pub struct AddressClient {
    backend: Arc<dyn Backend>,
    registry: Arc<RequestRegistry>,
}

impl AddressClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_registry(backend, Arc::new(RequestRegistry::new()))
    }

    /// Share a registry with other services
    pub fn with_registry(backend: Arc<dyn Backend>, registry: Arc<RequestRegistry>) -> Self {
        Self { backend, registry }
    }

    pub async fn lookup(&self, address: &str) -> Result<AddressLookup> {
        // A new address makes any pending geometry request meaningless
        self.registry.cancel(GEOMETRY);
        self.registry.run(LOOKUP, self.backend.lookup_address(address.trim())).await
    }

    /// Geometry for an address; facades are derived locally when the backend sends only a footprint
    pub async fn geometry(
        &self,
        address: &str,
        manual: Option<&ManualHeights>,
        refresh: bool,
    ) -> Result<ScaffoldingGeometry> {
        let manual = manual.filter(|m| !m.is_empty());
        let mut geometry = self
            .registry
            .run(GEOMETRY, self.backend.scaffolding_geometry(address, manual, refresh))
            .await?;

        if geometry.sides.is_empty() && !geometry.polygon.is_empty() {
            let footprint = Footprint::from_vertices(&geometry.polygon)?;
            geometry.sides = derive_facades(&footprint);
            // Keep the ring in the order the facade indices refer to
            geometry.polygon = footprint.vertices();
            tracing::debug!(
                address,
                facades = geometry.sides.len(),
                "Backend sent no facades; derived from footprint"
            );
        }

        Ok(geometry)
    }

    pub async fn fetch_heights(&self, request: &HeightFetchRequest) -> Result<HeightFetchResponse> {
        self.registry.run(HEIGHTS, self.backend.fetch_heights(request)).await
    }

    /// Cancel every pending address request (session reset)
    pub fn cancel_pending(&self) {
        self.registry.cancel(LOOKUP);
        self.registry.cancel(GEOMETRY);
        self.registry.cancel(HEIGHTS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geruest_core::error::GeruestError;
    use geruest_core::models::{
        BuildingHeights, CatalogEstimate, Coordinates, DrawingRequest, HeightImportStatus,
        RoofShape, TakeoffRequest, TakeoffResult,
    };
    use std::time::Duration;

    /// Answers lookups after a delay that depends on the address
    struct SlowBackend;

    #[async_trait]
    impl Backend for SlowBackend {
        async fn lookup_address(&self, address: &str) -> Result<AddressLookup> {
            let delay = if address.starts_with("slow") { 5_000 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(AddressLookup {
                query: address.to_string(),
                label: address.to_uppercase(),
                coordinates: Coordinates { lat: 47.37, lon: 8.54, lv95_e: 2_683_000.0, lv95_n: 1_248_000.0 },
                buildings: vec![],
            })
        }

        async fn scaffolding_geometry(
            &self,
            address: &str,
            _manual: Option<&ManualHeights>,
            _refresh: bool,
        ) -> Result<ScaffoldingGeometry> {
            let polygon = if address.starts_with("clockwise") {
                vec![[0.0, 0.0], [0.0, 6.0], [10.0, 6.0], [10.0, 0.0]]
            } else {
                vec![[0.0, 0.0], [10.0, 0.0], [10.0, 6.0], [0.0, 6.0], [0.0, 0.0]]
            };
            Ok(ScaffoldingGeometry {
                address: address.to_string(),
                egid: Some(1),
                polygon,
                sides: vec![],
                heights: BuildingHeights::default(),
                roof_shape: RoofShape::Gable,
                floors: Some(2),
            })
        }

        async fn takeoff(&self, _request: &TakeoffRequest) -> Result<TakeoffResult> {
            unreachable!("not used")
        }

        async fn drawing(&self, _request: &DrawingRequest) -> Result<String> {
            unreachable!("not used")
        }

        async fn fetch_heights(&self, _request: &HeightFetchRequest) -> Result<HeightFetchResponse> {
            Ok(HeightFetchResponse {
                status: HeightImportStatus::Success,
                message: String::new(),
                debug: None,
            })
        }

        async fn material_catalog(&self, _system_id: &str, _area_m2: f64) -> Result<CatalogEstimate> {
            unreachable!("not used")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_lookup_wins() {
        let client = Arc::new(AddressClient::new(Arc::new(SlowBackend)));

        let stale = {
            let client = client.clone();
            tokio::spawn(async move { client.lookup("slow street 1").await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;

        let fresh = client.lookup("Marktgasse 2").await.unwrap();
        assert_eq!(fresh.label, "MARKTGASSE 2");
        assert!(matches!(stale.await.unwrap(), Err(GeruestError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_geometry_derives_missing_facades() {
        let client = AddressClient::new(Arc::new(SlowBackend));
        let geometry = client.geometry("Marktgasse 2", None, false).await.unwrap();

        assert_eq!(geometry.sides.len(), 4);
        assert_eq!(geometry.sides[0].length_m, 10.0);
    }

    #[tokio::test]
    async fn test_derived_facades_follow_returned_ring() {
        let client = AddressClient::new(Arc::new(SlowBackend));
        let geometry = client.geometry("clockwise lane 4", None, false).await.unwrap();

        let n = geometry.polygon.len();
        assert_eq!(geometry.sides.len(), n);
        for side in &geometry.sides {
            assert_eq!(side.start, geometry.polygon[side.index]);
            assert_eq!(side.end, geometry.polygon[(side.index + 1) % n]);
        }
    }

    #[tokio::test]
    async fn test_fetch_heights() {
        let client = AddressClient::new(Arc::new(SlowBackend));
        let request = HeightFetchRequest { lv95_e: 2_683_000.0, lv95_n: 1_248_000.0, egid: None };
        let response = client.fetch_heights(&request).await.unwrap();
        assert_eq!(response.status, HeightImportStatus::Success);
    }
}

//! Backend-first take-off with an explicit local fallback

use std::sync::Arc;

use geruest_core::error::{GeruestError, Result};
use geruest_core::models::{CatalogEstimate, TakeoffResult, TakeoffSource};
use geruest_core::ports::Backend;
use geruest_core::session::PlanningSession;

use crate::cancel::RequestRegistry;

const TAKEOFF: &str = "takeoff";
const MATERIAL: &str = "material";

pub struct TakeoffService {
    backend: Arc<dyn Backend>,
    registry: Arc<RequestRegistry>,
}

impl TakeoffService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_registry(backend, Arc::new(RequestRegistry::new()))
    }

    pub fn with_registry(backend: Arc<dyn Backend>, registry: Arc<RequestRegistry>) -> Self {
        Self { backend, registry }
    }

    /// Take-off for the session's current selection.
    ///
    /// The backend result is authoritative. When the backend call fails the same
    /// formula is evaluated locally and tagged [`TakeoffSource::LocalFallback`].
    /// An empty selection fails without issuing a request.
    pub async fn compute(&self, session: &PlanningSession) -> Result<TakeoffResult> {
        let request = session.takeoff_request()?;

        match self.registry.run(TAKEOFF, self.backend.takeoff(&request)).await {
            Ok(result) => {
                tracing::debug!(
                    address = %request.address,
                    total_area = result.total_area,
                    "Backend take-off"
                );
                Ok(result)
            }
            Err(err @ GeruestError::Cancelled { .. }) => Err(err),
            Err(err) => {
                let mut local = session.compute_takeoff()?;
                local.source = TakeoffSource::LocalFallback;
                tracing::warn!(
                    address = %request.address,
                    error = %err,
                    total_area = local.total_area,
                    "Backend take-off failed; using local calculation"
                );
                Ok(local)
            }
        }
    }

    /// Compute and store the take-off on the session
    pub async fn compute_into(&self, session: &mut PlanningSession) -> Result<TakeoffResult> {
        let result = self.compute(session).await?;
        session.set_takeoff(result.clone());
        Ok(result)
    }

    /// Per-article parts list for the session's take-off area
    pub async fn material_catalog(&self, session: &PlanningSession) -> Result<CatalogEstimate> {
        let area = match session.takeoff() {
            Some(result) => result.total_area,
            None => session.compute_takeoff()?.total_area,
        };
        let system_id = session.config().system.id();

        self.registry.run(MATERIAL, self.backend.material_catalog(system_id, area)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use geruest_core::models::{
        AddressLookup, BuildingHeights, CatalogItem, CompassDirection, Coordinates,
        DrawingRequest, FacadeSide, HeightFetchRequest, HeightFetchResponse, HeightSource,
        ManualHeights, RoofShape, ScaffoldingGeometry, TakeoffRequest,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records take-off requests and either answers or fails
    struct FakeBackend {
        fail: bool,
        calls: AtomicUsize,
        last_request: Mutex<Option<TakeoffRequest>>,
    }

    impl FakeBackend {
        fn new(fail: bool) -> Self {
            Self { fail, calls: AtomicUsize::new(0), last_request: Mutex::new(None) }
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn lookup_address(&self, _address: &str) -> Result<AddressLookup> {
            unreachable!("not used")
        }

        async fn scaffolding_geometry(
            &self,
            _address: &str,
            _manual: Option<&ManualHeights>,
            _refresh: bool,
        ) -> Result<ScaffoldingGeometry> {
            unreachable!("not used")
        }

        async fn takeoff(&self, request: &TakeoffRequest) -> Result<TakeoffResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());

            if self.fail {
                return Err(GeruestError::BackendUnavailable {
                    reason: "connection refused".to_string(),
                    remediation: "start the backend".to_string(),
                });
            }
            let mut result = geruest_core::takeoff::compute_for_lengths(&[99.0], request.height);
            result.source = TakeoffSource::Backend;
            Ok(result)
        }

        async fn drawing(&self, _request: &DrawingRequest) -> Result<String> {
            unreachable!("not used")
        }

        async fn fetch_heights(&self, _request: &HeightFetchRequest) -> Result<HeightFetchResponse> {
            unreachable!("not used")
        }

        async fn material_catalog(&self, system_id: &str, area_m2: f64) -> Result<CatalogEstimate> {
            let items = vec![CatalogItem {
                category: "Rahmen".to_string(),
                article_number: "2600.200".to_string(),
                name: "Stahlrahmen 0.73 x 2.00 m".to_string(),
                quantity: (area_m2 / 10.0).ceil() as u32,
                unit_weight_kg: 18.5,
            }];
            Ok(CatalogEstimate::from_items(system_id, area_m2, items))
        }
    }

    fn side(index: usize, length_m: f64) -> FacadeSide {
        FacadeSide {
            index,
            start: [0.0, 0.0],
            end: [length_m, 0.0],
            length_m,
            direction: CompassDirection::S,
            angle_deg: 0.0,
        }
    }

    fn session() -> PlanningSession {
        let mut session = PlanningSession::default();
        session.start(AddressLookup {
            query: "Seestrasse 10".to_string(),
            label: "Seestrasse 10, 8800 Thalwil".to_string(),
            coordinates: Coordinates { lat: 47.29, lon: 8.56, lv95_e: 2_685_000.0, lv95_n: 1_239_000.0 },
            buildings: vec![],
        });
        session.load_geometry(ScaffoldingGeometry {
            address: "Seestrasse 10, 8800 Thalwil".to_string(),
            egid: Some(42),
            polygon: vec![],
            sides: vec![side(0, 10.0), side(1, 6.0)],
            heights: BuildingHeights {
                eave_height_m: Some(8.0),
                ridge_height_m: Some(11.0),
                estimated_height_m: None,
                source: HeightSource::Measured,
            },
            roof_shape: RoofShape::Gable,
            floors: Some(3),
        });
        session
    }

    #[tokio::test]
    async fn test_backend_result_is_authoritative() {
        let backend = Arc::new(FakeBackend::new(false));
        let service = TakeoffService::new(backend.clone());

        let result = service.compute(&session()).await.unwrap();
        assert_eq!(result.source, TakeoffSource::Backend);
        // The fake bills a single 99 m facade, unlike the local selection
        assert_eq!(result.per_facade.len(), 1);

        let request = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.facades, vec![0, 1]);
        assert_eq!(request.height, 8.0);
    }

    #[tokio::test]
    async fn test_falls_back_to_local_calculation() {
        let backend = Arc::new(FakeBackend::new(true));
        let service = TakeoffService::new(backend.clone());

        let result = service.compute(&session()).await.unwrap();
        assert_eq!(result.source, TakeoffSource::LocalFallback);
        // (12 + 8) * 9 + 2 * 9
        assert!((result.total_area - 198.0).abs() < 1e-9);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_issues_no_request() {
        let backend = Arc::new(FakeBackend::new(false));
        let service = TakeoffService::new(backend.clone());
        let mut session = session();
        session.deselect_all();

        let result = service.compute(&session).await;
        assert!(matches!(result, Err(GeruestError::NoFacadesSelected)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compute_into_stores_result_and_catalog_uses_it() {
        let backend = Arc::new(FakeBackend::new(true));
        let service = TakeoffService::new(backend);
        let mut session = session();

        let result = service.compute_into(&mut session).await.unwrap();
        assert_eq!(session.takeoff(), Some(&result));

        let catalog = service.material_catalog(&session).await.unwrap();
        assert_eq!(catalog.system_id, "blitz70");
        assert!((catalog.area_m2 - 198.0).abs() < 1e-9);
        assert_eq!(catalog.total_pieces(), 20);
    }
}

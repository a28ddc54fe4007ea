use async_trait::async_trait;
use geruest_core::error::{GeruestError, Result};
use geruest_core::models::{
    AddressLookup, CatalogEstimate, CatalogItem, DrawingRequest, DrawingSubject, FacadeSide,
    FacadeTakeoff, HeightFetchRequest, HeightFetchResponse, ManualHeights, ScaffoldingGeometry,
    TakeoffRequest, TakeoffResult, TakeoffSource,
};
use geruest_core::ports::Backend;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// API prefix of every backend route
pub const API_PREFIX: &str = "/api/v1";

/// HTTP adapter for the scaffolding-planning backend
pub struct HttpBackend {
    /// Base URL without trailing slash (e.g., "http://localhost:8000")
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), client: reqwest::Client::new() }
    }

    /// Create with default localhost URL
    pub fn localhost() -> Self {
        Self::new(geruest_core::config::DEFAULT_BACKEND_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Send a request and turn transport failures and non-2xx statuses into errors
    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<reqwest::Response> {
        tracing::debug!(path, "Backend request");

        let response = request.send().await.map_err(|e| GeruestError::BackendUnavailable {
            reason: format!("Failed to reach backend at {}: {}", self.base_url, e),
            remediation: format!(
                "Ensure the backend is running at {} or set GERUEST_BACKEND_URL / --backend-url",
                self.base_url
            ),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(path, status = status.as_u16(), "Backend returned error status");
            return Err(GeruestError::BackendStatus { status: status.as_u16(), body });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| GeruestError::Decode(format!("{}: {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.send(self.client.get(self.url(path)).query(query), path).await?;
        Self::decode(response, path).await
    }
}

/// Query pairs for manual height overrides
fn manual_height_params(manual: Option<&ManualHeights>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(manual) = manual {
        if let Some(eave) = manual.eave_height_m {
            params.push(("eave_height", eave.to_string()));
        }
        if let Some(ridge) = manual.ridge_height_m {
            params.push(("ridge_height", ridge.to_string()));
        }
    }
    params
}

#[async_trait]
impl Backend for HttpBackend {
    async fn lookup_address(&self, address: &str) -> Result<AddressLookup> {
        let query = [("address", address.to_string())];
        match self.get_json("/lookup", &query).await {
            Err(GeruestError::BackendStatus { status: 404, .. }) => {
                Err(GeruestError::AddressNotFound { query: address.to_string() })
            }
            other => other,
        }
    }

    async fn scaffolding_geometry(
        &self,
        address: &str,
        manual: Option<&ManualHeights>,
        refresh: bool,
    ) -> Result<ScaffoldingGeometry> {
        let mut query = vec![("address", address.to_string())];
        query.extend(manual_height_params(manual));
        if refresh {
            query.push(("refresh", "true".to_string()));
        }

        match self.get_json("/scaffolding", &query).await {
            Err(GeruestError::BackendStatus { status: 404, .. }) => {
                Err(GeruestError::AddressNotFound { query: address.to_string() })
            }
            other => other,
        }
    }

    async fn takeoff(&self, request: &TakeoffRequest) -> Result<TakeoffResult> {
        let mut query = vec![
            ("address", request.address.clone()),
            ("system", request.system.id().to_string()),
            ("roof_shape", request.roof_shape.as_param().to_string()),
            ("width_class", request.width_class.to_string()),
            ("work_type", request.work_type.as_param().to_string()),
            ("height", request.height.to_string()),
        ];
        if !request.facades.is_empty() {
            let facades: Vec<String> = request.facades.iter().map(|i| i.to_string()).collect();
            query.push(("facades", facades.join(",")));
        }

        let wire: WireTakeoff = self.get_json("/ausmass/komplett", &query).await?;
        Ok(wire.into_result())
    }

    async fn drawing(&self, request: &DrawingRequest) -> Result<String> {
        let path = format!("/visualize/{}", request.kind.path_segment());

        let builder = match &request.subject {
            DrawingSubject::Address(address) => {
                let mut query = vec![
                    ("address", address.clone()),
                    ("width", request.width_px.to_string()),
                    ("height", request.height_px.to_string()),
                ];
                query.extend(manual_height_params(request.manual_heights.as_ref()));
                query.push(("professional", request.professional.to_string()));
                query.push(("high_fidelity", request.high_fidelity.to_string()));
                self.client.get(self.url(&path)).query(&query)
            }
            DrawingSubject::Geometry { label, sides, polygon } => {
                let body = WireDrawingBody {
                    label,
                    sides,
                    polygon,
                    width: request.width_px,
                    height: request.height_px,
                    professional: request.professional,
                    high_fidelity: request.high_fidelity,
                };
                self.client.post(self.url(&path)).json(&body)
            }
        };

        let response = self.send(builder, &path).await?;
        response.text().await.map_err(|e| GeruestError::Decode(format!("{}: {}", path, e)))
    }

    async fn fetch_heights(&self, request: &HeightFetchRequest) -> Result<HeightFetchResponse> {
        let path = "/heights/fetch";
        let response = self.send(self.client.post(self.url(path)).json(request), path).await?;
        // The import outcome is only known from the body, even on 200
        let body: HeightFetchResponse = Self::decode(response, path).await?;

        if let Some(counters) = &body.debug {
            tracing::debug!(
                status = body.status.as_str(),
                tiles_checked = counters.tiles_checked,
                buildings_in_tile = counters.buildings_in_tile,
                points_sampled = counters.points_sampled,
                "Height import counters"
            );
        }

        if body.status.is_failure() {
            return Err(GeruestError::DomainStatus {
                status: body.status.as_str().to_string(),
                message: body.message,
                debug: body.debug,
            });
        }
        Ok(body)
    }

    async fn material_catalog(&self, system_id: &str, area_m2: f64) -> Result<CatalogEstimate> {
        let query = [("system_id", system_id.to_string()), ("area", area_m2.to_string())];
        let wire: WireCatalog = self.get_json("/material/estimate", &query).await?;
        Ok(CatalogEstimate::from_items(wire.system_id, wire.area_m2, wire.items))
    }
}

/// Take-off payload of `/ausmass/komplett`
#[derive(Debug, Deserialize)]
struct WireTakeoff {
    per_facade: Vec<FacadeTakeoff>,
    corner_count: u32,
    #[serde(default)]
    corner_surcharge: f64,
    facade_area: f64,
    total_area: f64,
    scaffold_height: f64,
}

impl WireTakeoff {
    fn into_result(self) -> TakeoffResult {
        TakeoffResult {
            per_facade: self.per_facade,
            corner_count: self.corner_count,
            corner_surcharge: self.corner_surcharge,
            facade_area: self.facade_area,
            total_area: self.total_area,
            scaffold_height: self.scaffold_height,
            source: TakeoffSource::Backend,
        }
    }
}

/// Request body for drawings of explicit geometry
#[derive(Debug, Serialize)]
struct WireDrawingBody<'a> {
    label: &'a str,
    sides: &'a [FacadeSide],
    polygon: &'a [[f64; 2]],
    width: u32,
    height: u32,
    professional: bool,
    high_fidelity: bool,
}

/// Response from `/material/estimate`
#[derive(Debug, Deserialize)]
struct WireCatalog {
    system_id: String,
    area_m2: f64,
    #[serde(default)]
    items: Vec<CatalogItem>,
}

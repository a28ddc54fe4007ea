//! Read-through drawing service: cache, timeout, and cancellation per drawing kind

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use geruest_core::error::{GeruestError, Result};
use geruest_core::models::{DrawingKind, DrawingRequest};
use geruest_core::ports::Backend;

use crate::cache::{DrawingCache, DrawingKey};
use crate::cancel::RequestRegistry;

pub struct DrawingService {
    backend: Arc<dyn Backend>,
    cache: Arc<DrawingCache>,
    registry: Arc<RequestRegistry>,
    timeout: Duration,
}

impl DrawingService {
    pub fn new(backend: Arc<dyn Backend>, cache: Arc<DrawingCache>, timeout: Duration) -> Self {
        Self {
            backend,
            cache,
            registry: Arc::new(RequestRegistry::new()),
            timeout,
        }
    }

    pub fn with_registry(mut self, registry: Arc<RequestRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn cache(&self) -> &Arc<DrawingCache> {
        &self.cache
    }

    /// SVG for `request`, from cache when possible.
    ///
    /// Changing the manual heights for an address, or passing `refresh`, drops every
    /// cached drawing of that address first.
    pub async fn drawing(&self, request: &DrawingRequest, refresh: bool) -> Result<Arc<str>> {
        let key = DrawingKey::for_request(request);

        if refresh || self.cache.manual_heights_changed(&key) {
            self.cache.invalidate_address(&key.address);
        }

        if let Some(svg) = self.cache.get(&key) {
            tracing::debug!(kind = %key.kind, address = %key.address, "Drawing cache hit");
            return Ok(svg);
        }

        let resource = format!("drawing:{}", request.kind.path_segment());
        let svg: Arc<str> = self.registry.run(&resource, self.generate(request)).await?.into();

        self.cache.insert(key, svg.clone());
        Ok(svg)
    }

    /// All three drawing kinds for the same subject, generated concurrently
    pub async fn all_kinds(
        &self,
        template: &DrawingRequest,
        refresh: bool,
    ) -> Vec<(DrawingKind, Result<Arc<str>>)> {
        if refresh {
            self.cache.invalidate_address(template.subject.label());
        }

        let requests: Vec<DrawingRequest> = DrawingKind::ALL
            .iter()
            .map(|kind| DrawingRequest { kind: *kind, ..template.clone() })
            .collect();

        let results = join_all(requests.iter().map(|r| self.drawing(r, false))).await;
        DrawingKind::ALL.into_iter().zip(results).collect()
    }

    /// Drop cached drawings for an address
    pub fn invalidate(&self, address: &str) -> usize {
        self.cache.invalidate_address(address)
    }

    async fn generate(&self, request: &DrawingRequest) -> Result<String> {
        tracing::debug!(
            kind = %request.kind,
            subject = request.subject.label(),
            timeout_secs = self.timeout.as_secs(),
            "Generating drawing"
        );

        match tokio::time::timeout(self.timeout, self.backend.drawing(request)).await {
            Ok(result) => result,
            Err(_) => Err(GeruestError::Timeout { after_secs: self.timeout.as_secs() }),
        }
    }
}

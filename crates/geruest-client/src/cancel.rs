//! Per-resource request cancellation
//!
//! Each logical resource (address lookup, geometry, one drawing kind) has at most one
//! live request. Starting a new one cancels the previous token, and a response that
//! arrives for a cancelled token is turned into [`GeruestError::Cancelled`] instead
//! of being handed to the caller.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use geruest_core::error::{GeruestError, Result};
use tokio::sync::Notify;

/// Cancellation handle for one in-flight request
#[derive(Debug, Clone)]
pub struct CancelToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelToken {
    fn with_id(id: u64) -> Self {
        Self { id, cancelled: Arc::new(AtomicBool::new(false)), notify: Arc::new(Notify::new()) }
    }

    /// Stand-alone token not tracked by a registry
    pub fn new() -> Self {
        Self::with_id(0)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`CancelToken::cancel`] has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Race `request` against cancellation of `token`.
///
/// A result that completes after the token was cancelled is discarded.
pub async fn run_cancellable<T, F>(token: &CancelToken, resource: &str, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let cancelled = || GeruestError::Cancelled { resource: resource.to_string() };

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!(resource, token = token.id(), "Request cancelled while in flight");
            Err(cancelled())
        }
        result = request => {
            if token.is_cancelled() {
                tracing::debug!(resource, token = token.id(), "Discarding stale response");
                Err(cancelled())
            } else {
                result
            }
        }
    }
}

/// Live tokens keyed by logical resource
#[derive(Debug, Default)]
pub struct RequestRegistry {
    next_id: AtomicU64,
    live: Mutex<HashMap<String, CancelToken>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for `resource`, cancelling whatever request held it before
    pub fn begin(&self, resource: &str) -> CancelToken {
        let token = CancelToken::with_id(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let previous = self.lock().insert(resource.to_string(), token.clone());

        if let Some(previous) = previous {
            tracing::debug!(resource, superseded = previous.id(), "Superseding request");
            previous.cancel();
        }
        token
    }

    /// Release `resource` if `token` still holds it
    pub fn finish(&self, resource: &str, token: &CancelToken) {
        let mut live = self.lock();
        if live.get(resource).map(|t| t.id()) == Some(token.id()) {
            live.remove(resource);
        }
    }

    /// Cancel the live request for `resource`, if any
    pub fn cancel(&self, resource: &str) -> bool {
        match self.lock().remove(resource) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, token) in self.lock().drain() {
            token.cancel();
        }
    }

    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// Begin, run cancellably, and release `resource`
    pub async fn run<T, F>(&self, resource: &str, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let token = self.begin(resource);
        let result = run_cancellable(&token, resource, request).await;
        self.finish(resource, &token);
        result
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CancelToken>> {
        // A poisoned map only holds tokens; keep using it
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_uncancelled_request_completes() {
        let token = CancelToken::new();
        let result = run_cancellable(&token, "lookup", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let result: Result<u32> = run_cancellable(&token, "lookup", async { Ok(1) }).await;
        assert!(matches!(result, Err(GeruestError::Cancelled { resource }) if resource == "lookup"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_request_supersedes_previous() {
        let registry = Arc::new(RequestRegistry::new());

        let first = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .run("lookup", async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Ok("old")
                    })
                    .await
            })
        };

        // Let the first request register before the second supersedes it
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = registry.run("lookup", async { Ok("new") }).await;

        assert_eq!(second.unwrap(), "new");
        assert!(matches!(first.await.unwrap(), Err(GeruestError::Cancelled { .. })));
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_resources_are_independent() {
        let registry = RequestRegistry::new();
        let lookup = registry.begin("lookup");
        let drawing = registry.begin("drawing:schnitt");

        assert!(registry.cancel("lookup"));
        assert!(lookup.is_cancelled());
        assert!(!drawing.is_cancelled());
        assert!(!registry.cancel("lookup"));
    }

    #[tokio::test]
    async fn test_finish_ignores_superseded_token() {
        let registry = RequestRegistry::new();
        let old = registry.begin("geometry");
        let current = registry.begin("geometry");

        registry.finish("geometry", &old);
        assert_eq!(registry.in_flight(), 1);
        registry.finish("geometry", &current);
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let registry = RequestRegistry::new();
        let a = registry.begin("a");
        let b = registry.begin("b");
        registry.cancel_all();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert_eq!(registry.in_flight(), 0);
    }
}

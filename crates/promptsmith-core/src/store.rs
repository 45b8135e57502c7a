//! Shared result state
//!
//! One `PromptStore` is created by the application root and cloned into every
//! consumer that needs it. Clones share the same inner state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::render::build_result;
use crate::state::{PromptRequest, PromptResult};

#[derive(Debug, Default)]
struct Inner {
    request: PromptRequest,
    result: Option<PromptResult>,
    generating: bool,
}

#[derive(Debug, Clone)]
pub struct PromptStore {
    inner: Arc<Mutex<Inner>>,
    simulated_delay: Duration,
}

impl PromptStore {
    /// `simulated_delay` stands in for network latency on local generation.
    pub fn new(simulated_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            simulated_delay,
        }
    }

    pub fn set_request(&self, request: PromptRequest) {
        self.inner.lock().request = request;
    }

    pub fn request(&self) -> PromptRequest {
        self.inner.lock().request.clone()
    }

    pub fn result(&self) -> Option<PromptResult> {
        self.inner.lock().result.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.inner.lock().generating
    }

    pub fn set_generating(&self, generating: bool) {
        self.inner.lock().generating = generating;
    }

    /// Store a result produced elsewhere, replacing any previous one.
    pub fn publish(&self, result: PromptResult) {
        info!(title = %result.title, "Publishing prompt result");
        self.inner.lock().result = Some(result);
    }

    pub fn clear_result(&self) {
        self.inner.lock().result = None;
    }

    /// Generate locally: infer the template, render it and store the result.
    ///
    /// Overlapping calls are not deduplicated; whichever finishes last owns
    /// the stored result.
    pub async fn generate(&self, request: PromptRequest) -> PromptResult {
        {
            let mut inner = self.inner.lock();
            inner.request = request.clone();
            inner.generating = true;
        }
        debug!(delay_ms = self.simulated_delay.as_millis() as u64, "Generating prompt locally");

        if !self.simulated_delay.is_zero() {
            tokio::time::sleep(self.simulated_delay).await;
        }

        let result = build_result(&request, Utc::now());

        let mut inner = self.inner.lock();
        inner.result = Some(result.clone());
        inner.generating = false;
        info!(title = %result.title, "Generated prompt");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_stores_result() {
        let store = PromptStore::new(Duration::ZERO);
        assert!(store.result().is_none());
        assert!(!store.is_generating());

        let result = store
            .generate(PromptRequest::from_use_case("I run a small clothing boutique"))
            .await;

        assert_eq!(result.title, "Fashion Retail AI Assistant Prompt");
        assert_eq!(store.result(), Some(result));
        assert!(!store.is_generating());
        assert_eq!(store.request().use_case, "I run a small clothing boutique");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generating_flag_during_delay() {
        let store = PromptStore::new(Duration::from_millis(3000));
        let worker = store.clone();
        let handle = tokio::spawn(async move {
            worker.generate(PromptRequest::from_use_case("software")).await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(store.is_generating());
        assert!(store.result().is_none());

        let result = handle.await.unwrap();
        assert!(!store.is_generating());
        assert_eq!(result.title, "Technology AI Assistant Prompt");
    }

    #[tokio::test]
    async fn test_new_generation_overwrites_previous() {
        let store = PromptStore::new(Duration::ZERO);
        store.generate(PromptRequest::from_use_case("clothing")).await;
        store.generate(PromptRequest::from_use_case("restaurant")).await;

        let result = store.result().unwrap();
        assert_eq!(result.title, "Food & Beverage AI Assistant Prompt");
        assert!(!result.prompt.contains("StyleSense"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_to_finish_wins() {
        let slow = PromptStore::new(Duration::from_millis(500));
        let fast = PromptStore { simulated_delay: Duration::from_millis(100), ..slow.clone() };

        let a = tokio::spawn({
            let s = slow.clone();
            async move { s.generate(PromptRequest::from_use_case("clothing")).await }
        });
        let b = tokio::spawn({
            let s = fast.clone();
            async move { s.generate(PromptRequest::from_use_case("software")).await }
        });
        a.await.unwrap();
        b.await.unwrap();

        // the slower, earlier-started call completed last
        assert_eq!(slow.result().unwrap().title, "Fashion Retail AI Assistant Prompt");
    }

    #[test]
    fn test_set_request_accepts_empty_fields() {
        let store = PromptStore::new(Duration::ZERO);
        store.set_request(PromptRequest::default());
        assert_eq!(store.request(), PromptRequest::default());
    }

    #[test]
    fn test_publish_and_clear() {
        let store = PromptStore::new(Duration::ZERO);
        let result = PromptResult {
            title: "Custom".into(),
            prompt: "p".into(),
            description: "d".into(),
            timestamp: "t".into(),
        };
        store.publish(result.clone());
        assert_eq!(store.result(), Some(result));
        store.clear_result();
        assert!(store.result().is_none());
    }
}

//! Mock PDF backend for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::backend::{BackendError, PdfBackend};

/// A configurable mock response for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Raw per-page text, returned as-is.
    Pages(Vec<String>),
    /// Simulate a document that cannot be opened.
    Error(String),
    /// Simulate a password-protected document.
    Encrypted,
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
///
/// Returns a fixed response for every call, optionally after a blocking
/// delay, and counts calls via [`call_count()`](MockBackend::call_count).
pub struct MockBackend {
    response: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockBackend {
    pub fn new(response: MockResponse) -> Self {
        Self {
            response,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Block the calling thread for `delay` on every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl PdfBackend for MockBackend {
    fn extract_page_texts(&self, _data: &[u8]) -> Result<Vec<String>, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match &self.response {
            MockResponse::Pages(pages) => Ok(pages.clone()),
            MockResponse::Error(msg) => Err(BackendError::Open(msg.clone())),
            MockResponse::Encrypted => Err(BackendError::Encrypted),
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use focusflow_core::{Chunker, PdfBackend};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub backend: Arc<dyn PdfBackend>,
    /// Turns extracted pages into reading chunks for the response.
    pub chunker: Arc<dyn Chunker>,
    /// Upper bound on one extraction; `None` waits indefinitely.
    pub extraction_timeout: Option<Duration>,
}

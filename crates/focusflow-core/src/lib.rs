pub mod backend;
pub mod chunk;
pub mod config_file;
pub mod extract;
pub mod mock;
pub mod schema;
pub mod session;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use chunk::{Chunker, ExtractOnly};
pub use config_file::Settings;
pub use extract::{extract_pages, normalize_page_text};
pub use schema::{Document, FALLBACK_FILENAME, PageRecord, SchemaError, TextChunk};
pub use session::{GuidanceLevel, Preferences, ReadingSession, ReadingView, SessionError};

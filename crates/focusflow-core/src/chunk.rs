//! The chunking seam: raw page records in, reader-sized chunks out.
//!
//! No segmentation strategy is defined yet. The upload endpoint and the
//! `extract` command both run [`ExtractOnly`], which yields nothing and
//! leaves the document's `raw` pages as the only content.

use crate::schema::{PageRecord, TextChunk};

/// Turns extracted pages into an ordered list of chunks.
///
/// Implementations must return chunks in reading order with unique
/// `chunk_id`s and `page_start <= page_end` ranges that refer to pages
/// present in the input.
pub trait Chunker: Send + Sync {
    fn chunk(&self, pages: &[PageRecord]) -> Vec<TextChunk>;
}

/// Leaves documents unchunked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOnly;

impl Chunker for ExtractOnly {
    fn chunk(&self, _pages: &[PageRecord]) -> Vec<TextChunk> {
        Vec::new()
    }
}

//! Transport schema shared between the extraction backend and any reader.
//!
//! A [`Document`] is the single canonical shape: the extraction pipeline
//! fills `raw` and leaves `chunks` empty, while hand-authored documents (the
//! sample) fill `chunks` and leave `raw` unset.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chunk::Chunker;

/// Filename used when an upload carries no usable name.
pub const FALLBACK_FILENAME: &str = "unknown_document.pdf";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("chunk {chunk_id}: page_start {page_start} is after page_end {page_end}")]
    InvalidPageRange {
        chunk_id: u32,
        page_start: u32,
        page_end: u32,
    },
    #[error("duplicate chunk_id {0}")]
    DuplicateChunkId(u32),
    #[error("total_chunks is {declared} but document has {actual} chunks")]
    ChunkCountMismatch { declared: usize, actual: usize },
    #[error("raw page {page} is out of order or duplicated")]
    PageOrder { page: u32 },
    #[error("raw page {page} has no text")]
    EmptyPage { page: u32 },
}

/// Normalized text of one physical PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-based physical page index.
    pub page: u32,
    pub text: String,
}

/// A contiguous, titled portion of a document read as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub chunk_id: u32,
    pub title: String,
    pub key_idea: String,
    pub content: String,
    pub page_start: u32,
    pub page_end: u32,
}

impl TextChunk {
    pub fn new(
        chunk_id: u32,
        title: impl Into<String>,
        key_idea: impl Into<String>,
        content: impl Into<String>,
        page_start: u32,
        page_end: u32,
    ) -> Result<Self, SchemaError> {
        if page_start > page_end {
            return Err(SchemaError::InvalidPageRange {
                chunk_id,
                page_start,
                page_end,
            });
        }
        Ok(Self {
            chunk_id,
            title: title.into(),
            key_idea: key_idea.into(),
            content: content.into(),
            page_start,
            page_end,
        })
    }
}

/// The document response returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub filename: String,
    pub total_chunks: usize,
    #[serde(default)]
    pub chunks: Vec<TextChunk>,
    #[serde(default)]
    pub raw: Option<Vec<PageRecord>>,
}

impl Document {
    /// Wrap extraction output without chunking it.
    pub fn from_pages(filename: impl Into<String>, pages: Vec<PageRecord>) -> Self {
        Self {
            filename: filename.into(),
            total_chunks: 0,
            chunks: Vec::new(),
            raw: Some(pages),
        }
    }

    /// Wrap extraction output and run `chunker` over it.
    pub fn from_pages_with(
        filename: impl Into<String>,
        pages: Vec<PageRecord>,
        chunker: &dyn Chunker,
    ) -> Self {
        let chunks = chunker.chunk(&pages);
        Self {
            filename: filename.into(),
            total_chunks: chunks.len(),
            chunks,
            raw: Some(pages),
        }
    }

    /// Build a hand-authored document from ready-made chunks.
    pub fn from_chunks(filename: impl Into<String>, chunks: Vec<TextChunk>) -> Self {
        Self {
            filename: filename.into(),
            total_chunks: chunks.len(),
            chunks,
            raw: None,
        }
    }

    /// Check the schema invariants of a document that came from elsewhere.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.total_chunks != self.chunks.len() {
            return Err(SchemaError::ChunkCountMismatch {
                declared: self.total_chunks,
                actual: self.chunks.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.chunks.len());
        for chunk in &self.chunks {
            if chunk.page_start > chunk.page_end {
                return Err(SchemaError::InvalidPageRange {
                    chunk_id: chunk.chunk_id,
                    page_start: chunk.page_start,
                    page_end: chunk.page_end,
                });
            }
            if !seen.insert(chunk.chunk_id) {
                return Err(SchemaError::DuplicateChunkId(chunk.chunk_id));
            }
        }

        if let Some(raw) = &self.raw {
            let mut last = 0;
            for record in raw {
                if record.page <= last {
                    return Err(SchemaError::PageOrder { page: record.page });
                }
                if record.text.trim().is_empty() {
                    return Err(SchemaError::EmptyPage { page: record.page });
                }
                last = record.page;
            }
        }

        Ok(())
    }

    /// Sample document used to exercise the reading view before a real
    /// upload exists.
    pub fn sample() -> Self {
        let chunks = vec![
            TextChunk {
                chunk_id: 1,
                title: "Introduction to Sleep and Memory".into(),
                key_idea: "Sleep plays a critical role in consolidating new memories.".into(),
                content: "This is sample content. In the real app, this would be extracted from a PDF.\n\n\
                          Think of this as a placeholder that helps us build the reading experience first."
                    .into(),
                page_start: 1,
                page_end: 1,
            },
            TextChunk {
                chunk_id: 2,
                title: "REM Sleep and Learning".into(),
                key_idea: "REM sleep strengthens neural connections formed during learning.".into(),
                content: "More sample content.\n\n\
                          Later, this will be chunked text (300-500 words) with formatting improvements."
                    .into(),
                page_start: 2,
                page_end: 2,
            },
            TextChunk {
                chunk_id: 3,
                title: "Implications for Students".into(),
                key_idea: "Prioritizing sleep may improve learning and retention.".into(),
                content: "Final sample chunk.\n\n\
                          Real PDF parsing output replaces this sample document once uploads are wired in."
                    .into(),
                page_start: 3,
                page_end: 3,
            },
        ];
        Self::from_chunks("sample_paper.pdf", chunks)
    }
}

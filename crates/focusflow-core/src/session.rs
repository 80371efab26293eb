//! Reading state for one reader working through one document.
//!
//! Every field gets its default in [`ReadingSession::new`]; callers pass the
//! session by reference instead of probing for missing keys.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{Document, TextChunk};

/// Lowest allowed pause threshold.
pub const MIN_INTERVENTION_THRESHOLD: Duration = Duration::from_secs(30);
/// Highest allowed pause threshold.
pub const MAX_INTERVENTION_THRESHOLD: Duration = Duration::from_secs(120);
/// Pause threshold a fresh session starts with.
pub const DEFAULT_INTERVENTION_THRESHOLD: Duration = Duration::from_secs(60);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("no document is loaded")]
    NoDocument,
    #[error("section {index} does not exist (document has {total})")]
    ChunkOutOfRange { index: usize, total: usize },
    #[error("pause threshold must be between 30 and 120 seconds, got {0}")]
    ThresholdOutOfRange(u64),
    #[error("unknown guidance level {0:?} (expected light, medium or heavy)")]
    UnknownGuidanceLevel(String),
}

/// How much support the reader asks for while reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceLevel {
    /// Minimal interventions, basic formatting and occasional check-ins.
    Light,
    /// Balanced guidance with clear chunking and tracking.
    #[default]
    Medium,
    /// Frequent re-orientation, detailed context and active assistance.
    Heavy,
}

impl GuidanceLevel {
    pub const ALL: [GuidanceLevel; 3] = [Self::Light, Self::Medium, Self::Heavy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
        }
    }

    /// Human-readable label shown next to the setting.
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light support",
            Self::Medium => "Medium support (recommended)",
            Self::Heavy => "Heavy support",
        }
    }
}

impl fmt::Display for GuidanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuidanceLevel {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SessionError::UnknownGuidanceLevel(s.to_string()))
    }
}

/// Reader preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    /// How long a reader may stay on one chunk before a recap is offered.
    pub intervention_threshold: Duration,
    pub guidance: GuidanceLevel,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            intervention_threshold: DEFAULT_INTERVENTION_THRESHOLD,
            guidance: GuidanceLevel::default(),
        }
    }
}

/// What the reading view should show.
#[derive(Debug, Clone, Copy)]
pub enum ReadingView<'a> {
    /// No document loaded yet.
    Welcome,
    Reading {
        document: &'a Document,
        selected: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ReadingSession {
    document: Option<Document>,
    current_chunk: usize,
    show_intervention: bool,
    preferences: Preferences,
    debug_mode: bool,
    chunk_started_at: Option<Instant>,
}

impl ReadingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Self::default()
        }
    }

    /// Replace the loaded document and start reading from the first chunk.
    pub fn load_document(&mut self, document: Document) {
        tracing::debug!(
            filename = %document.filename,
            chunks = document.chunks.len(),
            "document loaded into session"
        );
        self.document = Some(document);
        self.current_chunk = 0;
        self.chunk_started_at = Some(Instant::now());
        self.show_intervention = false;
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Select the chunk at `index` (0-based) and restart its timer.
    pub fn jump_to(&mut self, index: usize) -> Result<&TextChunk, SessionError> {
        let document = self.document.as_ref().ok_or(SessionError::NoDocument)?;
        let total = document.chunks.len();
        let chunk = document
            .chunks
            .get(index)
            .ok_or(SessionError::ChunkOutOfRange { index, total })?;
        self.current_chunk = index;
        self.chunk_started_at = Some(Instant::now());
        self.show_intervention = false;
        Ok(chunk)
    }

    pub fn current_index(&self) -> usize {
        self.current_chunk
    }

    pub fn current(&self) -> Option<&TextChunk> {
        self.document.as_ref()?.chunks.get(self.current_chunk)
    }

    /// Time spent on the selected chunk so far.
    pub fn time_on_chunk(&self) -> Option<Duration> {
        self.chunk_started_at.map(|t| t.elapsed())
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn set_intervention_threshold(&mut self, secs: u64) -> Result<(), SessionError> {
        let threshold = Duration::from_secs(secs);
        if !(MIN_INTERVENTION_THRESHOLD..=MAX_INTERVENTION_THRESHOLD).contains(&threshold) {
            return Err(SessionError::ThresholdOutOfRange(secs));
        }
        self.preferences.intervention_threshold = threshold;
        Ok(())
    }

    pub fn set_guidance(&mut self, guidance: GuidanceLevel) {
        self.preferences.guidance = guidance;
    }

    pub fn show_intervention(&self) -> bool {
        self.show_intervention
    }

    pub fn set_show_intervention(&mut self, show: bool) {
        self.show_intervention = show;
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn set_debug_mode(&mut self, on: bool) {
        self.debug_mode = on;
    }

    pub fn view(&self) -> ReadingView<'_> {
        match &self.document {
            None => ReadingView::Welcome,
            Some(document) => ReadingView::Reading {
                document,
                selected: self.current_chunk,
            },
        }
    }
}

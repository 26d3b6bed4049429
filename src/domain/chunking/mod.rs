//! Text chunking types and helpers
//!
//! Long source documents are split into overlapping windows before they are
//! sent through the client; each window is an independent query downstream.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for sliding-window chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target window size in characters
    pub window_size: usize,
    /// Overlap between consecutive windows in characters
    pub overlap: usize,
    /// Minimum chunk size (smaller trailing chunks are dropped)
    pub min_chunk_size: usize,
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(window_size: usize, overlap: usize) -> Self {
        Self {
            window_size,
            overlap,
            min_chunk_size: 50,
        }
    }

    /// Set minimum chunk size
    pub fn with_min_chunk_size(mut self, min_size: usize) -> Self {
        self.min_chunk_size = min_size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.window_size == 0 {
            return Err(DomainError::configuration(
                "window_size must be greater than 0",
            ));
        }

        if self.overlap >= self.window_size {
            return Err(DomainError::configuration(
                "overlap must be less than window_size",
            ));
        }

        if self.min_chunk_size > self.window_size {
            return Err(DomainError::configuration(
                "min_chunk_size must be less than or equal to window_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window_size: 1000,
            overlap: 200,
            min_chunk_size: 50,
        }
    }
}

/// Position of a chunk within its source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Index of this chunk (0-based)
    pub chunk_index: usize,
    /// Total number of chunks
    pub total_chunks: usize,
    /// Character offset where this chunk starts
    pub char_start: usize,
    /// Character offset where this chunk ends
    pub char_end: usize,
}

impl ChunkMetadata {
    pub fn new(chunk_index: usize, total_chunks: usize, char_start: usize, char_end: usize) -> Self {
        Self {
            chunk_index,
            total_chunks,
            char_start,
            char_end,
        }
    }
}

/// A window of text cut from a longer document
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk content
    pub content: String,
    /// Chunk metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Get the chunk index
    pub fn index(&self) -> usize {
        self.metadata.chunk_index
    }

    /// Get the content length
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Check if the chunk is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Helper functions for finding cut points.
///
/// Every returned position is a char boundary, so callers may slice at it
/// even when the requested position falls inside a multibyte character.
pub mod helpers {
    /// Snap `pos` down to the nearest char boundary
    pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
        if pos >= text.len() {
            return text.len();
        }

        let mut boundary = pos;

        while !text.is_char_boundary(boundary) {
            boundary -= 1;
        }

        boundary
    }

    /// Snap `pos` up to the nearest char boundary
    pub fn ceil_char_boundary(text: &str, pos: usize) -> usize {
        if pos >= text.len() {
            return text.len();
        }

        let mut boundary = pos;

        while !text.is_char_boundary(boundary) {
            boundary += 1;
        }

        boundary
    }

    /// Position just after the last whitespace char strictly before `pos`.
    /// Returns `pos` (snapped down to a char boundary) when no whitespace
    /// precedes it.
    pub fn find_word_boundary_before(text: &str, pos: usize) -> usize {
        let pos = floor_char_boundary(text, pos);

        if pos >= text.len() {
            return text.len();
        }

        match text[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
        {
            Some((index, c)) => index + c.len_utf8(),
            None => pos,
        }
    }

    /// Position of the first whitespace char at or after `pos`, or the end
    /// of the text when the tail has none
    pub fn find_word_boundary_after(text: &str, pos: usize) -> usize {
        let pos = ceil_char_boundary(text, pos);

        match text[pos..].char_indices().find(|(_, c)| c.is_whitespace()) {
            Some((offset, _)) => pos + offset,
            None => text.len(),
        }
    }
}

//! Sliding-window text chunker

use crate::domain::chunking::{helpers, Chunk, ChunkingConfig, ChunkMetadata};
use crate::domain::DomainError;

/// Splits long documents into overlapping windows.
///
/// Source text under the configured window size passes through as a single
/// chunk; anything longer is cut into windows that overlap by
/// `config.overlap` characters so no statement is lost at a boundary. Each
/// window is an independent query downstream.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindowChunker {
    respect_word_boundaries: bool,
}

impl SlidingWindowChunker {
    pub fn new() -> Self {
        Self {
            respect_word_boundaries: true,
        }
    }

    pub fn with_word_boundaries(mut self, respect: bool) -> Self {
        self.respect_word_boundaries = respect;
        self
    }

    /// Whether `content` is long enough to need chunking under `config`
    pub fn needs_chunking(&self, content: &str, config: &ChunkingConfig) -> bool {
        content.trim().len() > config.window_size
    }

    /// Cut `content` into overlapping windows
    pub fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let content = content.trim();

        if content.is_empty() {
            return Ok(vec![]);
        }

        if content.len() <= config.window_size {
            return Ok(vec![Chunk::new(
                content,
                ChunkMetadata::new(0, 1, 0, content.len()),
            )]);
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let step = config.window_size - config.overlap;

        // `start` is always a char boundary; `find_window_end` only ever
        // returns char boundaries, so the slice below cannot split a
        // multibyte character.
        while start < content.len() {
            let end = self.find_window_end(content, start, start + config.window_size);

            let window = content[start..end].trim();

            if !window.is_empty() && window.len() >= config.min_chunk_size {
                chunks.push(Chunk::new(
                    window,
                    ChunkMetadata::new(chunks.len(), 0, start, end),
                ));
            }

            if end >= content.len() {
                break;
            }

            start = helpers::ceil_char_boundary(content, start + step).min(end);
        }

        let total = chunks.len();
        for chunk in &mut chunks {
            chunk.metadata.total_chunks = total;
        }

        if chunks.is_empty() {
            chunks.push(Chunk::new(
                content,
                ChunkMetadata::new(0, 1, 0, content.len()),
            ));
        }

        Ok(chunks)
    }

    fn find_window_end(&self, content: &str, start: usize, target_end: usize) -> usize {
        if target_end >= content.len() {
            return content.len();
        }

        // Taking the next boundary up keeps a whole character in the window
        // and guarantees forward progress past `start`.
        let cut = helpers::ceil_char_boundary(content, target_end);

        if !self.respect_word_boundaries {
            return cut;
        }

        let boundary = helpers::find_word_boundary_before(content, cut);

        if boundary <= start {
            helpers::find_word_boundary_after(content, cut)
        } else {
            boundary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        let chunker = SlidingWindowChunker::new();

        let chunks = chunker.chunk("", &ChunkingConfig::default()).unwrap();

        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_content_is_one_chunk() {
        let chunker = SlidingWindowChunker::new();
        let config = ChunkingConfig::new(1000, 200);

        let chunks = chunker.chunk("A short note.", &config).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "A short note.");
        assert_eq!(chunks[0].metadata.total_chunks, 1);
        assert!(!chunker.needs_chunking("A short note.", &config));
    }

    #[test]
    fn test_long_content_overlaps() {
        let chunker = SlidingWindowChunker::new().with_word_boundaries(false);
        let config = ChunkingConfig::new(10, 4).with_min_chunk_size(1);

        let content = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunker.chunk(content, &config).unwrap();

        assert!(chunker.needs_chunking(content, &config));
        assert!(chunks.len() > 2);

        // Every consecutive pair shares the overlap region
        for pair in chunks.windows(2) {
            let first_tail = &pair[0].content[pair[0].content.len() - config.overlap..];
            assert!(pair[1].content.starts_with(first_tail));
        }
    }

    #[test]
    fn test_word_boundaries_respected() {
        let chunker = SlidingWindowChunker::new();
        let config = ChunkingConfig::new(20, 5).with_min_chunk_size(1);

        let content = "the quick brown fox jumps over the lazy dog again and again";
        let chunks = chunker.chunk(content, &config).unwrap();

        for chunk in &chunks {
            assert!(!chunk.content.starts_with(' '));
            assert!(!chunk.content.ends_with(' '));
        }
    }

    #[test]
    fn test_metadata_indices_are_consistent() {
        let chunker = SlidingWindowChunker::new();
        let config = ChunkingConfig::new(30, 10).with_min_chunk_size(5);

        let content = "Sentence one here. Sentence two here. Sentence three here. The end.";
        let chunks = chunker.chunk(content, &config).unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, chunks.len());
            assert!(chunk.metadata.char_start < chunk.metadata.char_end);
            assert!(chunk.metadata.char_end <= content.len());
        }
    }

    #[test]
    fn test_cjk_content_chunks_without_panicking() {
        let chunker = SlidingWindowChunker::new();
        let config = ChunkingConfig::new(10, 4).with_min_chunk_size(1);

        // Three-byte chars; every window boundary lands mid-character
        let content = "日".repeat(20);
        let chunks = chunker.chunk(&content, &config).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().all(|c| c == '日'));
        }
        assert_eq!(chunks.last().unwrap().metadata.char_end, content.len());
    }

    #[test]
    fn test_accented_prose_respects_boundaries() {
        let chunker = SlidingWindowChunker::new();
        let config = ChunkingConfig::new(24, 6).with_min_chunk_size(1);

        let content = "Métier déjà vu résumé naïveté façade café crème brûlée encore";
        let chunks = chunker.chunk(content, &config).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.content.starts_with(' '));
            assert!(!chunk.content.ends_with(' '));
            assert!(content.contains(chunk.content.as_str()));
        }
    }

    #[test]
    fn test_unbroken_multibyte_run_without_word_boundaries() {
        let chunker = SlidingWindowChunker::new().with_word_boundaries(false);
        let config = ChunkingConfig::new(7, 2).with_min_chunk_size(1);

        // Mixed 1-, 2-, and 3-byte chars with no whitespace to cut on
        let content = "aé日bè本cà語dî".repeat(4);
        let chunks = chunker.chunk(&content, &config).unwrap();

        assert!(!chunks.is_empty());
        let reassembled: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert!(reassembled.chars().all(|c| content.contains(c)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let chunker = SlidingWindowChunker::new();

        let result = chunker.chunk("content", &ChunkingConfig::new(10, 10));

        assert!(result.is_err());
    }
}

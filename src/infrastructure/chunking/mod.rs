//! Chunking implementations

mod sliding_window;

pub use sliding_window::SlidingWindowChunker;

//! Frame-sequence encoding: pooled pixel buffers, writer sessions and the producer/encoder
//! pipeline.

/// Encoder options.
pub mod config;
/// `ffmpeg`-based writer (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Fixed-geometry pixel buffer pool.
pub mod pool;
/// Producer/encoder pipeline over a still-image sequence.
pub mod sequence;
/// Single-use encoder session lifecycle.
pub mod session;
/// Writer trait and the in-memory writer.
pub mod writer;

//! Display plumbing: copying frame and depth buffers into cached textures.

/// Texture cache and pixel sources.
pub mod texture;

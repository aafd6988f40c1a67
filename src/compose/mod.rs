//! Aspect-fit placement and drawing of still images into frame buffers.

/// Scaled drawing into pixel buffers.
pub mod draw;
/// Aspect-fit geometry.
pub mod placement;

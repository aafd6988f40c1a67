//! Depth-map layout conversion between planar float grids and strided raw buffers.

/// Raw strided depth buffers.
pub mod buffer;
/// Grid <-> buffer conversion.
pub mod codec;
/// Planar depth grids.
pub mod grid;

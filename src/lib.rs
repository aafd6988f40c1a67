//! rgbd assembles still images into timed H.264 video and converts depth maps between planar
//! float grids and strided raw buffers.
//!
//! The video side is a bounded producer/encoder pipeline:
//!
//! - Build a [`FrameSequenceEncoder`] from [`EncoderOpts`]
//! - Call [`FrameSequenceEncoder::encode`] (or `encode_mp4`) inside a Tokio runtime
//! - Await [`EncodeJob::wait`] for the finished file
//!
//! The depth side is the pure [`DepthBufferCodec`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Aspect-fit frame composition.
pub mod compose;
/// Depth-map buffer layout conversion.
pub mod depth;
/// Texture cache for displaying buffers.
pub mod display;
/// Frame-sequence encoding.
pub mod encode;
/// Media-library persistence.
pub mod library;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, PresentationTime, Rect, Size};
pub use crate::foundation::error::{RgbdError, RgbdResult};

pub use crate::assets::local::LocalAssets;
pub use crate::assets::media::{VideoSourceInfo, decode_still_at, extract_stills, probe_video};
pub use crate::assets::raster::RasterImage;

pub use crate::compose::draw::{FrameCompositor, ResizeFilter};
pub use crate::compose::placement::{Placement, aspect_fit};
pub use crate::depth::buffer::{DepthPixelFormat, RawDepthBuffer};
pub use crate::depth::codec::DepthBufferCodec;
pub use crate::depth::grid::DepthGrid;
pub use crate::display::texture::{PixelSource, Texture, TextureCache, TextureFormat};
pub use crate::encode::config::EncoderOpts;
pub use crate::encode::ffmpeg::FfmpegWriter;
pub use crate::encode::pool::{BufferDesc, PixelBuffer, PixelBufferPool, PixelFormat, PoolOpts, PoolStats};
pub use crate::encode::sequence::{
    EncodeJob, EncodeOutcome, EncodeProgress, FrameSequenceEncoder, OutputDestination, Persistence,
};
pub use crate::encode::session::{EncoderSession, SessionState};
pub use crate::encode::writer::{
    InMemoryWriter, OutputSettings, RecordedFrame, Recording, VideoCodec, VideoWriter,
};
pub use crate::library::{DirectoryLibrary, MediaLibrary};

pub use tokio_util::sync::CancellationToken;

use std::sync::{Arc, Mutex};

use crate::assets::raster::RasterImage;
use crate::foundation::error::{RgbdError, RgbdResult};
use crate::foundation::math::align_up;

/// Pixel layout of pooled frame buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA, alpha premultiplied.
    Rgba8Premul,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8Premul => 4,
        }
    }
}

/// Geometry of one frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
    /// Bytes between the starts of consecutive rows; `>= width * bytes_per_pixel`.
    pub bytes_per_row: usize,
}

impl BufferDesc {
    /// Describe a buffer whose rows are padded to `row_alignment` bytes.
    pub fn new(width: u32, height: u32, format: PixelFormat, row_alignment: usize) -> Self {
        let tight = width as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            bytes_per_row: align_up(tight, row_alignment),
        }
    }

    /// Bytes of pixel data per row, excluding padding.
    pub fn tight_row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Total buffer length in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes_per_row.saturating_mul(self.height as usize)
    }
}

/// Pool sizing.
#[derive(Clone, Copy, Debug)]
pub struct PoolOpts {
    /// Maximum number of buffers checked out at once.
    pub capacity: usize,
    /// Row alignment in bytes (power of two).
    pub row_alignment: usize,
}

impl Default for PoolOpts {
    fn default() -> Self {
        Self {
            capacity: 5,
            row_alignment: 64,
        }
    }
}

/// Counters exposed for observability and test assertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Fresh allocations performed.
    pub allocated: u64,
    /// Acquisitions served from recycled storage.
    pub reused: u64,
    /// Acquisitions refused because the pool was exhausted.
    pub exhausted: u64,
    /// Buffers currently checked out.
    pub outstanding: usize,
    /// Buffers sitting idle in the pool.
    pub retained: usize,
}

struct PoolState {
    free: Vec<Vec<u8>>,
    stats: PoolStats,
}

struct PoolInner {
    desc: BufferDesc,
    capacity: usize,
    state: Mutex<PoolState>,
}

/// Bounded, recycling pool of frame buffers sharing one [`BufferDesc`].
///
/// Storage is allocated lazily up to `capacity` buffers. [`PixelBufferPool::acquire`] never
/// waits: when every buffer is checked out it fails with [`RgbdError::Allocation`].
#[derive(Clone)]
pub struct PixelBufferPool {
    inner: Arc<PoolInner>,
}

impl std::fmt::Debug for PixelBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBufferPool")
            .field("desc", &self.inner.desc)
            .field("capacity", &self.inner.capacity)
            .finish()
    }
}

impl PixelBufferPool {
    /// Create a pool of `opts.capacity` buffers of `width x height` in `format`.
    pub fn new(width: u32, height: u32, format: PixelFormat, opts: PoolOpts) -> RgbdResult<Self> {
        if width == 0 || height == 0 {
            return Err(RgbdError::allocation(
                "pixel buffer pool width/height must be non-zero",
            ));
        }
        if opts.capacity == 0 {
            return Err(RgbdError::allocation(
                "pixel buffer pool capacity must be non-zero",
            ));
        }
        if opts.row_alignment > 1 && !opts.row_alignment.is_power_of_two() {
            return Err(RgbdError::allocation(format!(
                "row alignment {} is not a power of two",
                opts.row_alignment
            )));
        }
        Ok(Self {
            inner: Arc::new(PoolInner {
                desc: BufferDesc::new(width, height, format, opts.row_alignment),
                capacity: opts.capacity,
                state: Mutex::new(PoolState {
                    free: Vec::new(),
                    stats: PoolStats::default(),
                }),
            }),
        })
    }

    /// Geometry shared by every buffer of this pool.
    pub fn desc(&self) -> BufferDesc {
        self.inner.desc
    }

    /// Maximum number of simultaneously checked-out buffers.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Snapshot of pool counters.
    pub fn stats(&self) -> PoolStats {
        match self.inner.state.lock() {
            Ok(st) => st.stats.clone(),
            Err(poisoned) => poisoned.into_inner().stats.clone(),
        }
    }

    /// Check out one buffer. Contents are unspecified; callers clear before drawing.
    pub fn acquire(&self) -> RgbdResult<PixelBuffer> {
        let mut st = self
            .inner
            .state
            .lock()
            .map_err(|_| RgbdError::allocation("pixel buffer pool lock poisoned"))?;

        if st.stats.outstanding >= self.inner.capacity {
            st.stats.exhausted = st.stats.exhausted.saturating_add(1);
            return Err(RgbdError::allocation(format!(
                "pixel buffer pool exhausted ({} of {} buffers checked out)",
                st.stats.outstanding, self.inner.capacity
            )));
        }

        let data = match st.free.pop() {
            Some(data) => {
                st.stats.reused = st.stats.reused.saturating_add(1);
                st.stats.retained = st.free.len();
                data
            }
            None => {
                st.stats.allocated = st.stats.allocated.saturating_add(1);
                vec![0u8; self.inner.desc.byte_len()]
            }
        };
        st.stats.outstanding += 1;

        Ok(PixelBuffer {
            desc: self.inner.desc,
            data,
            pool: Some(Arc::clone(&self.inner)),
        })
    }
}

impl PoolInner {
    fn release(&self, data: Vec<u8>) {
        let Ok(mut st) = self.state.lock() else {
            return;
        };
        st.stats.outstanding = st.stats.outstanding.saturating_sub(1);
        if data.len() == self.desc.byte_len() {
            st.free.push(data);
            st.stats.retained = st.free.len();
        }
    }
}

/// One frame buffer, either checked out of a [`PixelBufferPool`] or standalone.
///
/// Pooled buffers return their storage to the pool when dropped, so a buffer must not be
/// observed after it has been handed off.
pub struct PixelBuffer {
    desc: BufferDesc,
    data: Vec<u8>,
    pool: Option<Arc<PoolInner>>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("desc", &self.desc)
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}

impl PixelBuffer {
    /// Allocate a zeroed buffer outside any pool.
    pub fn standalone(desc: BufferDesc) -> Self {
        Self {
            desc,
            data: vec![0u8; desc.byte_len()],
            pool: None,
        }
    }

    /// Copy an image into a fresh standalone buffer with rows padded to `row_alignment`.
    pub fn from_image(image: &RasterImage, row_alignment: usize) -> Self {
        let desc = BufferDesc::new(
            image.width(),
            image.height(),
            PixelFormat::Rgba8Premul,
            row_alignment,
        );
        let mut buf = Self::standalone(desc);
        let src = image.pixels().as_raw();
        let tight = desc.tight_row_bytes();
        for (y, src_row) in src.chunks_exact(tight).enumerate() {
            buf.row_mut(y)[..tight].copy_from_slice(src_row);
        }
        buf
    }

    /// Buffer geometry.
    pub fn desc(&self) -> BufferDesc {
        self.desc
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Bytes between row starts.
    pub fn bytes_per_row(&self) -> usize {
        self.desc.bytes_per_row
    }

    /// Whole backing storage, padding included.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable backing storage, padding included.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Row `y` including trailing padding.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.desc.bytes_per_row;
        &self.data[start..start + self.desc.bytes_per_row]
    }

    /// Mutable row `y` including trailing padding.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.desc.bytes_per_row;
        &mut self.data[start..start + self.desc.bytes_per_row]
    }

    /// Copy pixel rows without padding into `out` (cleared first).
    pub fn copy_tight_into(&self, out: &mut Vec<u8>) {
        let tight = self.desc.tight_row_bytes();
        out.clear();
        out.reserve(tight * self.desc.height as usize);
        for y in 0..self.desc.height as usize {
            out.extend_from_slice(&self.row(y)[..tight]);
        }
    }

    /// Pixel rows without padding.
    pub fn to_tight_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.copy_tight_into(&mut out);
        out
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(std::mem::take(&mut self.data));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/pool.rs"]
mod tests;

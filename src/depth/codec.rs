use crate::depth::buffer::{DepthPixelFormat, RawDepthBuffer, check_layout};
use crate::depth::grid::DepthGrid;
use crate::foundation::error::{RgbdError, RgbdResult};
use crate::foundation::math::align_up;

/// Converts between [`DepthGrid`] and strided [`RawDepthBuffer`]s.
///
/// Values are copied bit for bit as native-endian `f32`; no arithmetic is performed, so
/// decoding an encoded grid returns it unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthBufferCodec {
    row_alignment: usize,
    format: DepthPixelFormat,
}

impl Default for DepthBufferCodec {
    fn default() -> Self {
        Self {
            row_alignment: 1,
            format: DepthPixelFormat::DepthFloat32,
        }
    }
}

impl DepthBufferCodec {
    /// Encode rows padded to `alignment` bytes (a power of two; `0`/`1` mean tight packing).
    pub fn with_row_alignment(alignment: usize) -> RgbdResult<Self> {
        if alignment > 1 && !alignment.is_power_of_two() {
            return Err(RgbdError::validation(format!(
                "depth row alignment {alignment} is not a power of two"
            )));
        }
        Ok(Self {
            row_alignment: alignment.max(1),
            ..Self::default()
        })
    }

    /// Tag encoded buffers with `format`.
    pub fn with_format(mut self, format: DepthPixelFormat) -> Self {
        self.format = format;
        self
    }

    /// Row stride used for a grid `width` values wide.
    pub fn bytes_per_row(&self, width: u32) -> usize {
        align_up(width as usize * self.format.bytes_per_value(), self.row_alignment)
    }

    /// Read the grid out of `buffer`, stepping rows by its stride.
    pub fn to_grid(&self, buffer: &RawDepthBuffer) -> RgbdResult<DepthGrid> {
        self.decode(
            buffer.data(),
            buffer.width(),
            buffer.height(),
            buffer.bytes_per_row(),
        )
    }

    /// Read a `width x height` grid out of borrowed bytes laid out at `bytes_per_row`.
    pub fn decode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        bytes_per_row: usize,
    ) -> RgbdResult<DepthGrid> {
        check_layout(data.len(), width, height, bytes_per_row, self.format)?;
        let tight = width as usize * self.format.bytes_per_value();
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as usize {
            let start = y * bytes_per_row;
            values.extend(
                data[start..start + tight]
                    .chunks_exact(4)
                    .map(bytemuck::pod_read_unaligned::<f32>),
            );
        }
        DepthGrid::new(width, height, values)
    }

    /// Write `grid` into a new buffer at this codec's stride.
    pub fn to_buffer(&self, grid: &DepthGrid) -> RgbdResult<RawDepthBuffer> {
        self.to_buffer_with_stride(grid, self.bytes_per_row(grid.width()))
    }

    /// Write `grid` into a new buffer at an explicit stride.
    pub fn to_buffer_with_stride(
        &self,
        grid: &DepthGrid,
        bytes_per_row: usize,
    ) -> RgbdResult<RawDepthBuffer> {
        self.write_rows(grid.rows(), grid.width(), grid.height(), bytes_per_row)
    }

    /// Write caller-held rows; every row must hold exactly `width` values.
    pub fn encode_rows<R: AsRef<[f32]>>(
        &self,
        rows: &[R],
        width: u32,
        height: u32,
    ) -> RgbdResult<RawDepthBuffer> {
        if rows.len() != height as usize {
            return Err(RgbdError::decode(format!(
                "expected {height} depth rows, got {}",
                rows.len()
            )));
        }
        self.write_rows(
            rows.iter().map(AsRef::as_ref),
            width,
            height,
            self.bytes_per_row(width),
        )
    }

    fn write_rows<'a>(
        &self,
        rows: impl Iterator<Item = &'a [f32]>,
        width: u32,
        height: u32,
        bytes_per_row: usize,
    ) -> RgbdResult<RawDepthBuffer> {
        let tight = width as usize * self.format.bytes_per_value();
        let len = bytes_per_row
            .checked_mul(height as usize)
            .ok_or_else(|| RgbdError::decode(format!("depth buffer {width}x{height} is too large")))?;
        check_layout(len, width, height, bytes_per_row, self.format)?;

        let mut data = vec![0u8; len];
        for (y, row) in rows.enumerate() {
            if row.len() != width as usize {
                return Err(RgbdError::decode(format!(
                    "depth row {y} has {} values, expected {width}",
                    row.len()
                )));
            }
            let start = y * bytes_per_row;
            data[start..start + tight].copy_from_slice(bytemuck::cast_slice(row));
        }
        tracing::trace!(width, height, bytes_per_row, "depth buffer encoded");
        RawDepthBuffer::from_bytes(data, width, height, bytes_per_row, self.format)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/depth/codec.rs"]
mod tests;

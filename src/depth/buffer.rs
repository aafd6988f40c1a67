use crate::foundation::error::{RgbdError, RgbdResult};

/// Per-value layout of a raw depth buffer. Both variants store one native-endian `f32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthPixelFormat {
    /// Metric depth.
    #[default]
    DepthFloat32,
    /// Inverse depth.
    DisparityFloat32,
}

impl DepthPixelFormat {
    /// Bytes per value.
    pub fn bytes_per_value(self) -> usize {
        match self {
            DepthPixelFormat::DepthFloat32 | DepthPixelFormat::DisparityFloat32 => 4,
        }
    }
}

/// Contiguous depth buffer of `bytes_per_row * height` bytes.
///
/// `bytes_per_row` may exceed `width * 4`; the padding carries no values.
#[derive(Clone, PartialEq, Eq)]
pub struct RawDepthBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: DepthPixelFormat,
}

impl std::fmt::Debug for RawDepthBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDepthBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes_per_row", &self.bytes_per_row)
            .field("format", &self.format)
            .field("len", &self.data.len())
            .finish()
    }
}

impl RawDepthBuffer {
    /// Wrap `data`, checking that the declared geometry fits inside it.
    pub fn from_bytes(
        data: Vec<u8>,
        width: u32,
        height: u32,
        bytes_per_row: usize,
        format: DepthPixelFormat,
    ) -> RgbdResult<Self> {
        check_layout(data.len(), width, height, bytes_per_row, format)?;
        Ok(Self {
            data,
            width,
            height,
            bytes_per_row,
            format,
        })
    }

    /// Values per row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    /// Value layout.
    pub fn format(&self) -> DepthPixelFormat {
        self.format
    }

    /// Whole buffer including row padding.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The `width * 4` value bytes of row `y`, without padding.
    pub fn row_bytes(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.bytes_per_row;
        let len = self.width as usize * self.format.bytes_per_value();
        self.data.get(start..start + len)
    }

    /// Release the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

pub(crate) fn check_layout(
    len: usize,
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: DepthPixelFormat,
) -> RgbdResult<()> {
    let tight = (width as usize)
        .checked_mul(format.bytes_per_value())
        .ok_or_else(|| RgbdError::decode(format!("depth width {width} is too large")))?;
    if bytes_per_row < tight {
        return Err(RgbdError::decode(format!(
            "row stride {bytes_per_row} is shorter than {width} values ({tight} bytes)"
        )));
    }
    let needed = bytes_per_row
        .checked_mul(height as usize)
        .ok_or_else(|| RgbdError::decode(format!("depth buffer {width}x{height} is too large")))?;
    if len < needed {
        return Err(RgbdError::decode(format!(
            "depth buffer holds {len} bytes, {width}x{height} at stride {bytes_per_row} needs {needed}"
        )));
    }
    Ok(())
}

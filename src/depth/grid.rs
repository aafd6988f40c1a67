use crate::foundation::error::{RgbdError, RgbdResult};

/// Planar `height x width` grid of depth values, row-major, top row first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepthGrid {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthGrid {
    /// Grid from row-major `values`; `values.len()` must equal `width * height`.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> RgbdResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| RgbdError::decode(format!("depth grid {width}x{height} is too large")))?;
        if values.len() != expected {
            return Err(RgbdError::decode(format!(
                "depth grid {width}x{height} needs {expected} values, got {}",
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Grid from rows of equal length; the first row fixes the width.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> RgbdResult<Self> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut values = Vec::with_capacity(width.saturating_mul(rows.len()));
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(RgbdError::decode(format!(
                    "depth row {y} has {} values, expected {width}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }
        let width = u32::try_from(width)
            .map_err(|_| RgbdError::decode("depth grid width exceeds u32"))?;
        let height = u32::try_from(rows.len())
            .map_err(|_| RgbdError::decode("depth grid height exceeds u32"))?;
        Self::new(width, height, values)
    }

    /// Values per row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row `y`, or `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[f32]> {
        if y >= self.height {
            return None;
        }
        let w = self.width as usize;
        let start = y as usize * w;
        self.values.get(start..start + w)
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        let w = self.width as usize;
        (0..self.height as usize).map(move |y| &self.values[y * w..(y + 1) * w])
    }

    /// Value at column `x` of row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width {
            return None;
        }
        self.row(y).map(|r| r[x as usize])
    }

    /// All values, row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Split back into owned rows.
    pub fn into_rows(self) -> Vec<Vec<f32>> {
        self.rows().map(<[f32]>::to_vec).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/depth/grid.rs"]
mod tests;

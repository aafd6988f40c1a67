use std::path::{Path, PathBuf};

use crate::assets::media::extract_stills;
use crate::assets::raster::RasterImage;
use crate::foundation::error::{RgbdError, RgbdResult};

/// Loads bundled photos, raw bytes and video stills from a local directory.
///
/// Output is treated as already-validated input by the encoder.
#[derive(Clone, Debug)]
pub struct LocalAssets {
    root: PathBuf,
}

impl LocalAssets {
    /// Resolve assets relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `name.ext` under the root.
    pub fn resolve(&self, name: &str, ext: &str) -> PathBuf {
        if ext.is_empty() {
            self.root.join(name)
        } else {
            self.root.join(format!("{name}.{ext}"))
        }
    }

    /// Read `name.ext` as raw bytes.
    pub fn load_bytes(&self, name: &str, ext: &str) -> RgbdResult<Vec<u8>> {
        let path = self.resolve(name, ext);
        std::fs::read(&path).map_err(|e| RgbdError::io(format!("read '{}'", path.display()), e))
    }

    /// Decode `name.ext` as a still image.
    pub fn load_photo(&self, name: &str, ext: &str) -> RgbdResult<RasterImage> {
        let bytes = self.load_bytes(name, ext)?;
        RasterImage::decode(&bytes)
    }

    /// Sample one still per whole second of the video `name.ext`.
    ///
    /// Requires the `media-ffmpeg` feature and `ffmpeg`/`ffprobe` on `PATH`.
    pub fn load_video_frames(&self, name: &str, ext: &str) -> RgbdResult<Vec<RasterImage>> {
        let path = self.resolve(name, ext);
        if !path.is_file() {
            return Err(RgbdError::io(
                format!("open '{}'", path.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        extract_stills(&path)
    }
}

use std::path::{Path, PathBuf};

use crate::foundation::error::{RgbdError, RgbdResult};

/// Media-library collaborator that takes ownership of finished videos and photos.
///
/// Called only after a successful finalize. Callers never retry; failures are logged and
/// reported.
pub trait MediaLibrary: Send + Sync {
    /// Import the finished video at `path`.
    fn save_video(&self, path: &Path) -> RgbdResult<()>;

    /// Import an encoded photo (PNG, JPEG, ...).
    fn save_photo(&self, bytes: &[u8]) -> RgbdResult<()>;
}

/// Library backed by a plain directory; every import gets a fresh unique file name.
#[derive(Clone, Debug)]
pub struct DirectoryLibrary {
    root: PathBuf,
}

impl DirectoryLibrary {
    /// Library rooted at `root`; the directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Library directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, stem: &str, ext: &str) -> RgbdResult<PathBuf> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            RgbdError::persistence(format!(
                "failed to create library directory '{}': {e}",
                self.root.display()
            ))
        })?;
        Ok(self
            .root
            .join(format!("{stem}-{}.{ext}", uuid::Uuid::new_v4())))
    }
}

impl MediaLibrary for DirectoryLibrary {
    fn save_video(&self, path: &Path) -> RgbdResult<()> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4")
            .to_ascii_lowercase();
        let dst = self.target("video", &ext)?;
        std::fs::copy(path, &dst).map_err(|e| {
            RgbdError::persistence(format!(
                "failed to import video '{}': {e}",
                path.display()
            ))
        })?;
        tracing::info!(src = %path.display(), dst = %dst.display(), "video saved to library");
        Ok(())
    }

    fn save_photo(&self, bytes: &[u8]) -> RgbdResult<()> {
        let format = image::guess_format(bytes)
            .map_err(|_| RgbdError::validation("photo bytes are not a recognised image format"))?;
        let ext = format.extensions_str().first().copied().unwrap_or("img");
        let dst = self.target("photo", ext)?;
        std::fs::write(&dst, bytes).map_err(|e| {
            RgbdError::persistence(format!("failed to write photo '{}': {e}", dst.display()))
        })?;
        tracing::info!(dst = %dst.display(), "photo saved to library");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/library/directory.rs"]
mod tests;

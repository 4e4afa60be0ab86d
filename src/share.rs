//! Export of generated images for sharing
//!
//! Images go to one fixed file under the cache directory, overwritten on
//! every share, so repeated shares never accumulate files.

use crate::error::Result;
use image::{GrayImage, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Subdirectory of the cache dir holding shared images
pub const SHARE_DIR: &str = "images";

/// File name every share overwrites
pub const SHARE_FILE: &str = "image.png";

/// A written file ready to hand to another application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareHandle {
    /// Location of the exported file
    pub path: PathBuf,
    /// MIME type of the file
    pub mime_type: &'static str,
}

/// Fixed share path for a cache directory
pub fn share_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(SHARE_DIR).join(SHARE_FILE)
}

/// Write `img` as PNG to the fixed share path, creating directories as needed
pub fn export_png(img: &GrayImage, cache_dir: &Path) -> Result<ShareHandle> {
    let path = share_path(cache_dir);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    img.save_with_format(&path, ImageFormat::Png)?;
    info!("exported {}x{} image to {}", img.width(), img.height(), path.display());

    Ok(ShareHandle {
        path,
        mime_type: "image/png",
    })
}

use std::path::Path;

use thiserror::Error;

use crate::color::Rgb;

#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("unsupported image extension {0:?} (expected png, jpg or jpeg)")]
    UnsupportedExtension(String),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode an image from disk into an RGB8 pixel grid.
/// Only png/jpg/jpeg are accepted; any alpha channel is discarded.
pub fn open_rgb(path: &Path) -> Result<image::RgbImage, ImageIoError> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" => {
            let img = image::open(path)?;
            tracing::debug!(path = %path.display(), width = img.width(), height = img.height(), "image decoded");
            Ok(img.to_rgb8())
        }
        _ => Err(ImageIoError::UnsupportedExtension(ext)),
    }
}

/// Pixel at column `x`, row `y`, or `None` outside the grid.
pub fn pixel_at(img: &image::RgbImage, x: u32, y: u32) -> Option<Rgb> {
    img.get_pixel_checked(x, y).copied().map(Rgb::from)
}

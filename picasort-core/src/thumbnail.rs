//! Thumbnail generation.
//!
//! Thumbnails are written into a cache directory keyed by the source image's
//! content digest, so regenerating an unchanged image is a cache hit and
//! renaming a file never invalidates its thumbnail.

use std::path::{Path, PathBuf};

use image::{DynamicImage, imageops::FilterType};
use tracing::debug;

use crate::error::Result;
use crate::metadata::Orientation;

/// Long-edge bound for generated thumbnails, in pixels.
pub const DEFAULT_LONG_EDGE: u32 = 320;

/// Scale `(width, height)` down so the longer edge is at most `long_edge`,
/// preserving aspect ratio. Images already inside the bound are unchanged.
pub fn bounded_dimensions(
    width: u32,
    height: u32,
    long_edge: u32,
) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= long_edge || longest == 0 {
        return (width, height);
    }
    let scale = f64::from(long_edge) / f64::from(longest);
    let scaled_w = (f64::from(width) * scale).round().max(1.0) as u32;
    let scaled_h = (f64::from(height) * scale).round().max(1.0) as u32;
    (scaled_w, scaled_h)
}

/// Decode `source`, bake in the EXIF orientation, downscale, and write a
/// JPEG named `<digest>.jpg` under `cache_dir`. Returns the written path.
pub fn generate(
    source: &Path,
    cache_dir: &Path,
    digest: &str,
    long_edge: u32,
    orientation: Orientation,
) -> Result<PathBuf> {
    let target = cache_dir.join(format!("{digest}.jpg"));
    if target.exists() {
        debug!(path = %target.display(), "thumbnail cache hit");
        return Ok(target);
    }

    let decoded = image::open(source)?;
    let upright = apply_orientation(decoded, orientation);
    let (bound_w, bound_h) =
        bounded_dimensions(upright.width(), upright.height(), long_edge);
    let scaled = if (bound_w, bound_h) == (upright.width(), upright.height())
    {
        upright
    } else {
        upright.resize(bound_w, bound_h, FilterType::Lanczos3)
    };

    std::fs::create_dir_all(cache_dir)?;
    // JPEG has no alpha channel.
    DynamicImage::ImageRgb8(scaled.to_rgb8()).save(&target)?;
    debug!(
        source = %source.display(),
        path = %target.display(),
        "thumbnail written"
    );
    Ok(target)
}

/// Rotate/flip the pixel grid so the stored EXIF orientation becomes
/// `Normal`.
fn apply_orientation(
    image: DynamicImage,
    orientation: Orientation,
) -> DynamicImage {
    match orientation {
        Orientation::Normal | Orientation::Unknown => image,
        Orientation::FlippedHorizontally => image.fliph(),
        Orientation::Rotated180Deg => image.rotate180(),
        Orientation::FlippedVertically => image.flipv(),
        Orientation::Transposed => image.rotate90().fliph(),
        Orientation::Rotated90DegCw => image.rotate90(),
        Orientation::Transverse => image.rotate270().fliph(),
        Orientation::Rotated90DegCcw => image.rotate270(),
    }
}

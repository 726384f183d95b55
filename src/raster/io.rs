//! I/O helpers for rendered page images.

use std::path::Path;

use super::page::PageRaster;

/// Load an image file (PNG/JPEG/...) as a grayscale page raster at the
/// given render DPI.
pub fn load_page_raster(path: &Path, dpi: f64) -> Result<PageRaster, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.into_raw();
    PageRaster::from_gray8(width, height, &data, dpi)
        .map_err(|e| format!("Invalid raster input {}: {e}", path.display()))
}

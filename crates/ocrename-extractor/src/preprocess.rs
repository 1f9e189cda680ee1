//! Image preprocessing ahead of recognition
//!
//! Full pages are optionally converted to grayscale. The handwriting
//! region goes through contrast-limited adaptive histogram equalization
//! and Otsu binarization when image preprocessing is available, and is
//! only converted to grayscale otherwise.

use crate::config::{Capabilities, ExtractorConfig};
use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

/// Preprocess a full page before paragraph OCR
pub fn prepare_page(page: DynamicImage, config: &ExtractorConfig, caps: Capabilities) -> DynamicImage {
    if config.full_page_grayscale && caps.image_preprocessing {
        DynamicImage::ImageLuma8(page.to_luma8())
    } else {
        page
    }
}

/// Preprocess the handwriting region before digit OCR
pub fn prepare_region(region: &DynamicImage, config: &ExtractorConfig, caps: Capabilities) -> DynamicImage {
    let gray = region.to_luma8();
    if !caps.image_preprocessing {
        debug!("Image preprocessing unavailable, using grayscale region");
        return DynamicImage::ImageLuma8(gray);
    }

    let enhanced = clahe(&gray, config.clahe_clip_limit, config.clahe_tile_grid);
    DynamicImage::ImageLuma8(binarize(&enhanced))
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a `grid` x `grid` layout of tiles (fewer when
/// the image is smaller than the grid). Each tile gets a clipped-histogram
/// lookup table and pixels blend the tables of the four nearest tile
/// centers bilinearly.
pub fn clahe(gray: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tiles_x = grid.clamp(1, width);
    let tiles_y = grid.clamp(1, height);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        let y0 = ty * height / tiles_y;
        let y1 = (ty + 1) * height / tiles_y;
        for tx in 0..tiles_x {
            let x0 = tx * width / tiles_x;
            let x1 = (tx + 1) * width / tiles_x;
            luts.push(tile_lut(gray, (x0, x1), (y0, y1), clip_limit));
        }
    }

    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;
    let max_tx = (tiles_x - 1) as f32;
    let max_ty = (tiles_y - 1) as f32;
    let lut_at = |tx: usize, ty: usize, v: usize| luts[ty * tiles_x as usize + tx][v] as f32;

    GrayImage::from_fn(width, height, |x, y| {
        let fy = ((y as f32 + 0.5) / tile_h - 0.5).clamp(0.0, max_ty);
        let fx = ((x as f32 + 0.5) / tile_w - 0.5).clamp(0.0, max_tx);
        let (ty0, tx0) = (fy.floor() as usize, fx.floor() as usize);
        let ty1 = (ty0 + 1).min(tiles_y as usize - 1);
        let tx1 = (tx0 + 1).min(tiles_x as usize - 1);
        let (ay, ax) = (fy - ty0 as f32, fx - tx0 as f32);

        let v = gray.get_pixel(x, y)[0] as usize;
        let top = lut_at(tx0, ty0, v) * (1.0 - ax) + lut_at(tx1, ty0, v) * ax;
        let bottom = lut_at(tx0, ty1, v) * (1.0 - ax) + lut_at(tx1, ty1, v) * ax;
        let value = top * (1.0 - ay) + bottom * ay;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

fn tile_lut(gray: &GrayImage, (x0, x1): (u32, u32), (y0, y1): (u32, u32), clip_limit: f32) -> [u8; 256] {
    let mut histogram = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[gray.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);
    let limit = ((clip_limit * area as f32) / 256.0).max(1.0) as u32;

    let mut excess = 0u32;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }
    let bonus = excess / 256;
    let residual = (excess % 256) as usize;
    for (i, bin) in histogram.iter_mut().enumerate() {
        *bin += bonus;
        if i < residual {
            *bin += 1;
        }
    }

    let mut lut = [0u8; 256];
    let scale = 255.0 / area.max(1) as f32;
    let mut cumulative = 0u32;
    for (i, bin) in histogram.iter().enumerate() {
        cumulative += bin;
        lut[i] = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

#[cfg(feature = "preprocessing")]
fn binarize(gray: &GrayImage) -> GrayImage {
    use imageproc::contrast::{otsu_level, threshold, ThresholdType};

    let level = otsu_level(gray);
    debug!("Otsu level {}", level);
    threshold(gray, level, ThresholdType::Binary)
}

#[cfg(not(feature = "preprocessing"))]
fn binarize(gray: &GrayImage) -> GrayImage {
    gray.clone()
}

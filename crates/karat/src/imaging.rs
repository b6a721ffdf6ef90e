//! SKU product image compression.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::ImageConfig;
use crate::error::ImageError;

/// Result of compressing one image.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_len: usize,
}

impl CompressedImage {
    /// Compressed size as a fraction of the original.
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            return 0.0;
        }
        self.bytes.len() as f64 / self.original_len as f64
    }
}

/// Decodes `data`, shrinks it to fit `max_dimension` and re-encodes as JPEG.
///
/// Images already within bounds keep their size. Alpha is dropped.
pub fn compress(data: &[u8], config: &ImageConfig) -> Result<CompressedImage, ImageError> {
    let _span = tracing::info_span!("imaging.compress", input_len = data.len()).entered();

    let img = image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))?;

    let (width, height) = img.dimensions();
    let max = config.max_dimension.max(1);
    let img = if width > max || height > max {
        // `resize` keeps the aspect ratio within the bounding box.
        img.resize(max, max, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let (out_w, out_h) = rgb.dimensions();

    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, config.jpeg_quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    log::debug!(
        "Compressed image {}x{} -> {}x{} ({} -> {} bytes)",
        width,
        height,
        out_w,
        out_h,
        data.len(),
        bytes.len()
    );

    Ok(CompressedImage {
        bytes,
        width: out_w,
        height: out_h,
        original_len: data.len(),
    })
}

pub fn compress_file(path: &Path, config: &ImageConfig) -> Result<CompressedImage, ImageError> {
    let data = std::fs::read(path).map_err(|e| ImageError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    compress(&data, config)
}

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PreprocessConfig;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to write scratch image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// The image handed to the recognizers.
///
/// A `Scratch` file is deleted when this value is dropped, so the normalized
/// copy never outlives the extraction that created it.
#[derive(Debug)]
pub enum NormalizedImage {
    Scratch(NamedTempFile),
    /// Preprocessing failed; recognizers read the caller's file directly.
    Original(PathBuf),
}

impl NormalizedImage {
    pub fn path(&self) -> &Path {
        match self {
            NormalizedImage::Scratch(file) => file.path(),
            NormalizedImage::Original(path) => path,
        }
    }

    pub fn is_scratch(&self) -> bool {
        matches!(self, NormalizedImage::Scratch(_))
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Normalize `data` (the contents of `source`) for recognition.
    ///
    /// Never fails: on any error the original path is returned instead.
    pub fn process(&self, source: &Path, data: &[u8]) -> NormalizedImage {
        match self.try_process(data) {
            Ok(scratch) => {
                info!(source = %source.display(), scratch = %scratch.path().display(), "image preprocessed");
                NormalizedImage::Scratch(scratch)
            }
            Err(e) => {
                warn!(source = %source.display(), error = %e, "preprocessing failed, using raw image");
                NormalizedImage::Original(source.to_path_buf())
            }
        }
    }

    fn try_process(&self, data: &[u8]) -> Result<NamedTempFile, PreprocessError> {
        let img = image::load_from_memory(data)?;
        let img = apply_orientation(img, read_exif_orientation(data));
        let gray = normalize(img, &self.config);

        let scratch = tempfile::Builder::new().prefix("pre_").suffix(".jpg").tempfile()?;
        {
            let mut writer = BufWriter::new(scratch.as_file());
            let encoder = JpegEncoder::new_with_quality(&mut writer, self.config.jpeg_quality);
            DynamicImage::ImageLuma8(gray)
                .write_with_encoder(encoder)
                .map_err(|e| PreprocessError::Encode(e.to_string()))?;
            writer.flush()?;
        }
        Ok(scratch)
    }
}

// ── Orientation ───────────────────────────────────────────────────────────────

/// EXIF Orientation tag (0x0112). 1 when absent or unreadable.
pub fn read_exif_orientation(data: &[u8]) -> u32 {
    let mut cursor = Cursor::new(data);
    let Ok(reader) = exif::Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };
    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// 1 = normal, 2 = mirrored, 3 = 180°, 4 = flipped, 5 = mirrored + 90° CW,
/// 6 = 90° CW, 7 = mirrored + 270° CW, 8 = 270° CW.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

// ── Normalization ─────────────────────────────────────────────────────────────

/// Cap height → grayscale → contrast → sharpen → threshold.
fn normalize(img: DynamicImage, config: &PreprocessConfig) -> GrayImage {
    let img = cap_height(img, config.max_height);
    let gray = DynamicImage::ImageLuma8(img.to_luma8());
    let gray = gray
        .adjust_contrast(config.contrast)
        .unsharpen(config.sharpen_sigma, config.sharpen_threshold);
    binarize(gray.to_luma8(), config.threshold)
}

fn cap_height(img: DynamicImage, max_height: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if h <= max_height {
        return img;
    }
    let new_w = ((u64::from(w) * u64::from(max_height)) / u64::from(h)).max(1) as u32;
    debug!(from = ?(w, h), to = ?(new_w, max_height), "downscaling");
    img.resize_exact(new_w, max_height, FilterType::CatmullRom)
}

fn binarize(mut gray: GrayImage, threshold: u8) -> GrayImage {
    for Luma([v]) in gray.pixels_mut() {
        *v = if *v >= threshold { 255 } else { 0 };
    }
    gray
}

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tuning for the image normalization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Output height cap in pixels. Images are never upscaled.
    pub max_height: u32,
    /// Passed to `adjust_contrast`; positive values increase contrast.
    pub contrast: f32,
    pub sharpen_sigma: f32,
    pub sharpen_threshold: i32,
    /// Luma cut: pixels at or above become white, below become black.
    pub threshold: u8,
    pub jpeg_quality: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_height: 1000,
            contrast: 15.0,
            sharpen_sigma: 1.0,
            sharpen_threshold: 10,
            threshold: 128,
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Tesseract language codes, local language first.
    pub languages: Vec<String>,
    pub whitelist: String,
    /// Upper bound for each of text recognition and symbol decoding.
    pub timeout_secs: u64,
    pub tesseract_bin: String,
    /// Tessdata directory for the in-process backend. `None` uses the system default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tessdata_dir: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            languages: vec!["fra".to_string(), "eng".to_string()],
            whitelist: "0123456789€,. ".to_string(),
            timeout_secs: 30,
            tesseract_bin: "tesseract".to_string(),
            tessdata_dir: None,
        }
    }
}

impl RecognitionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeConfig {
    pub zbarimg_bin: String,
    pub min_digits: usize,
    pub max_digits: usize,
    /// Skip OCR digit runs whose GS1 check digit does not match.
    pub verify_check_digit: bool,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            zbarimg_bin: "zbarimg".to_string(),
            min_digits: 8,
            max_digits: 13,
            verify_check_digit: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeotagConfig {
    pub exiftool_bin: String,
}

impl Default for GeotagConfig {
    fn default() -> Self {
        Self { exiftool_bin: "exiftool".to_string() }
    }
}

/// Process-wide, read-only settings for the extraction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub preprocess: PreprocessConfig,
    pub recognition: RecognitionConfig,
    pub barcode: BarcodeConfig,
    pub geotag: GeotagConfig,
}

impl ExtractorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preprocess.max_height == 0 {
            return Err(ConfigError::Invalid {
                field: "preprocess.max_height",
                reason: "must be greater than zero".into(),
            });
        }
        if !(1..=100).contains(&self.preprocess.jpeg_quality) {
            return Err(ConfigError::Invalid {
                field: "preprocess.jpeg_quality",
                reason: format!("{} is outside 1..=100", self.preprocess.jpeg_quality),
            });
        }
        if self.recognition.languages.is_empty() {
            return Err(ConfigError::Invalid {
                field: "recognition.languages",
                reason: "at least one language is required".into(),
            });
        }
        if self.recognition.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "recognition.timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        let b = &self.barcode;
        if b.min_digits == 0 || b.min_digits > b.max_digits {
            return Err(ConfigError::Invalid {
                field: "barcode.min_digits",
                reason: format!("range {}..={} is empty", b.min_digits, b.max_digits),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tag_tuning() {
        let c = ExtractorConfig::default();
        assert_eq!(c.preprocess.max_height, 1000);
        assert_eq!(c.preprocess.contrast, 15.0);
        assert_eq!(c.recognition.languages, vec!["fra", "eng"]);
        assert_eq!(c.recognition.whitelist, "0123456789€,. ");
        assert_eq!(c.recognition.timeout(), Duration::from_secs(30));
        assert_eq!((c.barcode.min_digits, c.barcode.max_digits), (8, 13));
        assert!(!c.barcode.verify_check_digit);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = ExtractorConfig::from_toml_str(
            "[preprocess]\nmax_height = 800\n\n[barcode]\nverify_check_digit = true\n",
        )
        .unwrap();
        assert_eq!(c.preprocess.max_height, 800);
        assert_eq!(c.preprocess.jpeg_quality, 90);
        assert!(c.barcode.verify_check_digit);
        assert_eq!(c.recognition, RecognitionConfig::default());
    }

    #[test]
    fn rejects_empty_digit_range() {
        let err = ExtractorConfig::from_toml_str("[barcode]\nmin_digits = 14\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "barcode.min_digits", .. }));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ExtractorConfig::from_toml_str("[recognition]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "recognition.timeout_secs", .. }));
    }

    #[test]
    fn rejects_unknown_shape() {
        assert!(matches!(
            ExtractorConfig::from_toml_str("preprocess = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn renders_and_reloads() {
        let c = ExtractorConfig::default();
        let text = c.to_toml_string().unwrap();
        assert_eq!(ExtractorConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pricetag.toml");
        std::fs::write(&path, "[recognition]\nlanguages = [\"deu\", \"eng\"]\n").unwrap();
        let c = ExtractorConfig::load(&path).unwrap();
        assert_eq!(c.recognition.languages, vec!["deu", "eng"]);
    }
}

use pricetag_core::GeoPoint;
use std::future::Future;
use std::path::Path;
use tokio::process::Command;

use crate::recognizer::{run_tool, OcrError};

/// Writes capture metadata into an image file in place.
pub trait MetadataInjector: Send + Sync {
    fn inject(&self, image: &Path, point: GeoPoint) -> impl Future<Output = Result<(), OcrError>> + Send;
}

pub struct ExifTool {
    binary: String,
}

impl ExifTool {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

fn gps_args(point: GeoPoint) -> Vec<String> {
    vec![
        "-overwrite_original".to_string(),
        format!("-GPSLatitude={:.6}", point.latitude().abs()),
        format!("-GPSLatitudeRef={}", point.latitude_ref()),
        format!("-GPSLongitude={:.6}", point.longitude().abs()),
        format!("-GPSLongitudeRef={}", point.longitude_ref()),
    ]
}

impl MetadataInjector for ExifTool {
    async fn inject(&self, image: &Path, point: GeoPoint) -> Result<(), OcrError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(gps_args(point)).arg(image);

        let output = run_tool(cmd, &self.binary).await?;
        if !output.status.success() {
            return Err(OcrError::Engine(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gps_args_use_absolute_values_and_refs() {
        let args = gps_args(GeoPoint::new(-33.45, 2.5).unwrap());
        assert_eq!(
            args,
            vec![
                "-overwrite_original",
                "-GPSLatitude=33.450000",
                "-GPSLatitudeRef=S",
                "-GPSLongitude=2.500000",
                "-GPSLongitudeRef=E",
            ]
        );
    }

    #[tokio::test]
    async fn missing_exiftool_is_not_available() {
        let tool = ExifTool::new("pricetag-test-no-such-exiftool");
        let err = tool
            .inject(Path::new("tag.jpg"), GeoPoint::new(1.0, 1.0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable(_)));
    }
}

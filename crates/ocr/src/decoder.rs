use std::future::Future;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::recognizer::{run_tool, OcrError};

/// Direct barcode symbol decoding, independent of OCR.
pub trait SymbolDecoder: Send + Sync {
    /// `Ok(None)` when the image holds no readable symbol.
    fn decode(&self, image: &Path) -> impl Future<Output = Result<Option<String>, OcrError>> + Send;
}

/// zbarimg exits with 4 when it scanned the image but found no symbol.
const ZBAR_NO_SYMBOL: i32 = 4;

/// Runs `zbarimg -q --raw <image>` and keeps the first decoded line.
pub struct ZbarImg {
    binary: String,
}

impl ZbarImg {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for ZbarImg {
    fn default() -> Self {
        Self::new("zbarimg")
    }
}

impl SymbolDecoder for ZbarImg {
    async fn decode(&self, image: &Path) -> Result<Option<String>, OcrError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-q").arg("--raw").arg(image);

        let output = run_tool(cmd, &self.binary).await?;
        match output.status.code() {
            Some(0) => Ok(first_symbol(&String::from_utf8_lossy(&output.stdout))),
            Some(ZBAR_NO_SYMBOL) => {
                debug!(image = %image.display(), "no barcode symbol found");
                Ok(None)
            }
            code => Err(OcrError::Engine(format!(
                "{} exited with {:?}: {}",
                self.binary,
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

/// First non-empty line of zbarimg's raw output.
fn first_symbol(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

// ── Mock decoder ──────────────────────────────────────────────────────────────

pub struct MockDecoder {
    pub symbol: Option<String>,
}

impl MockDecoder {
    pub fn new(symbol: Option<&str>) -> Self {
        Self { symbol: symbol.map(str::to_string) }
    }

    pub fn none() -> Self {
        Self { symbol: None }
    }
}

impl SymbolDecoder for MockDecoder {
    async fn decode(&self, _image: &Path) -> Result<Option<String>, OcrError> {
        Ok(self.symbol.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_symbol_skips_blank_lines() {
        assert_eq!(first_symbol("\n 4006381333931 \n96385074\n").as_deref(), Some("4006381333931"));
        assert_eq!(first_symbol("\n  \n"), None);
    }

    #[tokio::test]
    async fn mock_decoder_returns_symbol() {
        let d = MockDecoder::new(Some("4006381333931"));
        assert_eq!(d.decode(Path::new("x.jpg")).await.unwrap().as_deref(), Some("4006381333931"));
        assert_eq!(MockDecoder::none().decode(Path::new("x.jpg")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_zbarimg_is_not_available() {
        let d = ZbarImg::new("pricetag-test-no-such-zbarimg");
        let err = d.decode(Path::new("tag.jpg")).await.unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable(_)));
    }
}

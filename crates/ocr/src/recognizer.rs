use std::future::Future;
use std::io;
use std::path::Path;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("`{0}` is not installed or not on PATH")]
    NotAvailable(String),
    #[error("Failed to launch `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
}

/// What the recognizer should look for.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionRequest<'a> {
    pub languages: &'a [String],
    /// Only these characters may appear in the output.
    pub whitelist: &'a str,
}

/// Abstraction over an OCR backend.
/// Implementations read the image at `image` and return the recognized text,
/// which may be empty.
pub trait TextRecognizer: Send + Sync {
    fn recognize(
        &self,
        image: &Path,
        request: &RecognitionRequest<'_>,
    ) -> impl Future<Output = Result<String, OcrError>> + Send;
}

/// Run an external tool to completion, mapping a missing binary to `NotAvailable`.
pub(crate) async fn run_tool(mut cmd: Command, binary: &str) -> Result<Output, OcrError> {
    cmd.kill_on_drop(true);
    cmd.output().await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => OcrError::NotAvailable(binary.to_string()),
        _ => OcrError::Spawn { binary: binary.to_string(), source: e },
    })
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string. Useful for unit testing the extraction pipeline
/// without requiring Tesseract to be installed.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TextRecognizer for MockRecognizer {
    async fn recognize(
        &self,
        _image: &Path,
        _request: &RecognitionRequest<'_>,
    ) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract command-line backend ────────────────────────────────────────────

/// Runs `tesseract <image> stdout -l fra+eng -c tessedit_char_whitelist=…`.
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TextRecognizer for TesseractCli {
    async fn recognize(
        &self,
        image: &Path,
        request: &RecognitionRequest<'_>,
    ) -> Result<String, OcrError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(request.languages.join("+"))
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", request.whitelist));

        let output = run_tool(cmd, &self.binary).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(stderr.trim().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ── In-process Tesseract backend (optional, gated behind `tesseract` feature) ──

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrError, RecognitionRequest, TextRecognizer};
    use leptess::{LepTess, Variable};
    use std::path::Path;

    pub struct LeptessRecognizer {
        data_path: Option<String>,
    }

    impl LeptessRecognizer {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    impl TextRecognizer for LeptessRecognizer {
        async fn recognize(
            &self,
            image: &Path,
            request: &RecognitionRequest<'_>,
        ) -> Result<String, OcrError> {
            let data_path = self.data_path.clone();
            let lang = request.languages.join("+");
            let whitelist = request.whitelist.to_string();
            let image = image.to_path_buf();

            // libtesseract blocks; keep it off the async workers.
            tokio::task::spawn_blocking(move || {
                let mut lt = LepTess::new(data_path.as_deref(), &lang)
                    .map_err(|e| OcrError::Engine(e.to_string()))?;
                lt.set_variable(Variable::TesseditCharWhitelist, &whitelist)
                    .map_err(|e| OcrError::Engine(e.to_string()))?;
                lt.set_image(&image)
                    .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
                lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
            })
            .await
            .map_err(|e| OcrError::Engine(e.to_string()))?
        }
    }
}

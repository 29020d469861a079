use std::future::Future;
use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::EventKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::decoder::SymbolDecoder;
use crate::extract;
use crate::preprocess::{NormalizedImage, Preprocessor};
use crate::recognizer::{OcrError, RecognitionRequest, TextRecognizer};
use crate::types::ExtractionResult;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The caller's image could not be read at all. Recognition yielding
    /// nothing is not an error.
    #[error("Cannot read image {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Orchestrates: preprocess → (OCR ∥ symbol decode) → merge.
///
/// Stateless between calls; the config is fixed at construction.
pub struct Extractor<R: TextRecognizer, D: SymbolDecoder> {
    recognizer: R,
    decoder: D,
    preprocessor: Preprocessor,
    config: ExtractorConfig,
}

impl<R: TextRecognizer, D: SymbolDecoder> Extractor<R, D> {
    pub fn new(recognizer: R, decoder: D, config: ExtractorConfig) -> Self {
        let preprocessor = Preprocessor::new(config.preprocess.clone());
        Self { recognizer, decoder, preprocessor, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Read a price and a barcode off the photo at `path`.
    ///
    /// Only an unreadable `path` is an error; every recognition failure
    /// degrades to an absent field.
    pub async fn extract(&self, path: &Path) -> Result<ExtractionResult, PipelineError> {
        let data = tokio::fs::read(path).await.map_err(|source| PipelineError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        // Decode, resize and encode are CPU-bound; keep them off the async workers.
        // Dropped at the end of this function, which deletes any scratch file.
        let preprocessor = self.preprocessor.clone();
        let source = path.to_path_buf();
        let normalized = tokio::task::spawn_blocking(move || preprocessor.process(&source, &data))
            .await
            .unwrap_or_else(|e| {
                warn!(image = %path.display(), error = %e, "preprocessing task failed, using raw image");
                NormalizedImage::Original(path.to_path_buf())
            });
        let image = normalized.path();

        let (text, decoded) = tokio::join!(self.recognize_text(image), self.decode_symbol(image));
        debug!(image = %image.display(), text = %text, "OCR raw text");

        let result = extract::merge(&text, decoded, &self.config.barcode);
        info!(
            image = %path.display(),
            price = ?result.price.map(|p| p.to_string()),
            barcode = ?result.barcode.as_ref().map(|b| b.as_str()),
            barcode_source = ?result.barcode_source,
            "extraction finished"
        );
        Ok(result)
    }

    /// Parse and merge an already-recognized text, without touching any image.
    pub fn extract_text(&self, text: &str, decoded: Option<String>) -> ExtractionResult {
        extract::merge(text, decoded, &self.config.barcode)
    }

    async fn recognize_text(&self, image: &Path) -> String {
        let rc = &self.config.recognition;
        let request = RecognitionRequest { languages: &rc.languages, whitelist: &rc.whitelist };
        bounded("text recognition", rc.timeout(), self.recognizer.recognize(image, &request))
            .await
            .unwrap_or_default()
    }

    async fn decode_symbol(&self, image: &Path) -> Option<String> {
        let limit = self.config.recognition.timeout();
        bounded("barcode decode", limit, self.decoder.decode(image)).await.flatten()
    }
}

/// Await `fut` for at most `limit`; failures and timeouts become `None`.
async fn bounded<T>(
    stage: &'static str,
    limit: std::time::Duration,
    fut: impl Future<Output = Result<T, OcrError>>,
) -> Option<T> {
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!(stage, error = %e, "recognition step failed");
            None
        }
        Err(_) => {
            warn!(stage, timeout_secs = limit.as_secs(), "recognition step timed out");
            None
        }
    }
}

// ── Watch-folder integration ──────────────────────────────────────────────────

/// A file is ready once its writer closed it or it was renamed into place.
/// `Create` fires before the content lands, so it is not enough.
fn is_ready_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
    )
}

/// Spawn a notify watcher on `watch_dir` that sends finished file paths to `tx`.
/// Returns the watcher; it must be kept alive for watching to continue.
pub fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(ev) = event {
            if is_ready_event(&ev.kind) {
                for path in ev.paths {
                    if tx.try_send(path).is_err() {
                        warn!("intake queue full or closed, dropping photo");
                    }
                }
            }
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use anyhow::Context;
use pricetag_core::GeoPoint;
use pricetag_ocr::{
    photo_file_name, sha256_file, spawn_intake_watcher, store_path, to_hex, ExtractionResult,
    Extractor, MetadataInjector, SymbolDecoder, TextRecognizer,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Stored,
    NotStored,
}

/// What the caller gets back for one photo.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub status: StoreStatus,
    pub file_name: String,
    #[serde(flatten)]
    pub result: ExtractionResult,
}

/// Store (optionally), geotag (optionally) and extract one photo.
pub async fn scan<R, D, M>(
    extractor: &Extractor<R, D>,
    injector: &M,
    photo: &Path,
    store: Option<&Path>,
    point: Option<GeoPoint>,
) -> anyhow::Result<ScanReport>
where
    R: TextRecognizer,
    D: SymbolDecoder,
    M: MetadataInjector,
{
    let owned = photo.to_path_buf();
    let hash = tokio::task::spawn_blocking(move || sha256_file(&owned))
        .await
        .context("hashing task failed")?
        .with_context(|| format!("reading {}", photo.display()))?;
    let file_name = photo_file_name(&to_hex(&hash), photo);

    let (target, status) = match store {
        Some(dir) => match copy_into_store(dir, &file_name, photo).await {
            Ok(dest) => (dest, StoreStatus::Stored),
            Err(e) => {
                tracing::warn!(error = %e, "could not store photo, extracting from original");
                (photo.to_path_buf(), StoreStatus::NotStored)
            }
        },
        None => (photo.to_path_buf(), StoreStatus::NotStored),
    };

    if let Some(point) = point {
        if status == StoreStatus::Stored {
            match injector.inject(&target, point).await {
                Ok(()) => tracing::info!(file = %file_name, "location metadata written"),
                Err(e) => tracing::warn!(error = %e, "could not write location metadata"),
            }
        } else {
            // Never rewrite the caller's own file.
            tracing::warn!("location given without a store, skipping geotag");
        }
    }

    let result = extractor.extract(&target).await?;
    Ok(ScanReport { status, file_name, result })
}

async fn copy_into_store(dir: &Path, file_name: &str, photo: &Path) -> std::io::Result<PathBuf> {
    let dest = store_path(dir, file_name);
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(photo, &dest).await?;
    Ok(dest)
}

/// Scan every photo dropped into `dir` until the process is stopped.
pub async fn watch<R, D, M>(
    extractor: &Extractor<R, D>,
    injector: &M,
    dir: &Path,
    store: Option<&Path>,
) -> anyhow::Result<()>
where
    R: TextRecognizer,
    D: SymbolDecoder,
    M: MetadataInjector,
{
    // The channel bridges the notify watcher thread and the async processor.
    let (tx, mut rx) = mpsc::channel::<PathBuf>(64);
    let _watcher = spawn_intake_watcher(dir, tx)
        .with_context(|| format!("watching {}", dir.display()))?;
    tracing::info!("Watching intake folder: {}", dir.display());

    while let Some(path) = rx.recv().await {
        if !path.is_file() {
            continue;
        }
        tracing::info!("Processing photo: {}", path.display());
        match scan(extractor, injector, &path, store, None).await {
            Ok(report) => println!("{}", serde_json::to_string(&report)?),
            Err(e) => tracing::warn!("Scan failed for {}: {e:#}", path.display()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricetag_ocr::{ExtractorConfig, MockDecoder, MockRecognizer, OcrError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInjector {
        tagged: Mutex<Vec<PathBuf>>,
    }

    impl MetadataInjector for RecordingInjector {
        async fn inject(&self, image: &Path, _point: GeoPoint) -> Result<(), OcrError> {
            self.tagged.lock().unwrap().push(image.to_path_buf());
            Ok(())
        }
    }

    fn extractor(text: &str, symbol: Option<&str>) -> Extractor<MockRecognizer, MockDecoder> {
        Extractor::new(MockRecognizer::new(text), MockDecoder::new(symbol), ExtractorConfig::default())
    }

    #[tokio::test]
    async fn scan_stores_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("IMG_1.JPG");
        std::fs::write(&photo, b"raw bytes, not an image").unwrap();
        let store = dir.path().join("store");
        let injector = RecordingInjector::default();

        let report = scan(
            &extractor("Total €12,34", Some("4006381333931")),
            &injector,
            &photo,
            Some(&store),
            Some(GeoPoint::new(48.85, 2.35).unwrap()),
        )
        .await
        .unwrap();

        assert_eq!(report.status, StoreStatus::Stored);
        assert!(report.file_name.ends_with(".jpg"));
        assert_eq!(report.file_name.len(), 64 + 4);
        let stored = store_path(&store, &report.file_name);
        assert!(stored.exists());
        assert_eq!(injector.tagged.lock().unwrap().as_slice(), &[stored]);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "stored");
        assert_eq!(json["price"], 12.34);
        assert_eq!(json["barcode"], "4006381333931");
    }

    #[tokio::test]
    async fn scan_without_store_never_geotags_original() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("tag.png");
        std::fs::write(&photo, b"not an image").unwrap();
        let injector = RecordingInjector::default();

        let report = scan(
            &extractor("", None),
            &injector,
            &photo,
            None,
            Some(GeoPoint::new(1.0, 1.0).unwrap()),
        )
        .await
        .unwrap();

        assert_eq!(report.status, StoreStatus::NotStored);
        assert!(injector.tagged.lock().unwrap().is_empty());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""price":null"#));
        assert!(json.contains(r#""barcode":null"#));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn scan_names_photo_by_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("tag.PNG");
        std::fs::write(&photo, b"abc").unwrap();
        let injector = RecordingInjector::default();

        let report = scan(&extractor("", None), &injector, &photo, None, None).await.unwrap();
        assert_eq!(
            report.file_name,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.png"
        );
    }

    #[tokio::test]
    async fn scan_missing_photo_is_an_error() {
        let injector = RecordingInjector::default();
        let err = scan(&extractor("", None), &injector, Path::new("/no/photo.jpg"), None, None).await;
        assert!(err.is_err());
    }
}

pub mod config;
pub mod decoder;
pub mod extract;
pub mod geotag;
pub mod hash;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use config::{
    BarcodeConfig, ConfigError, ExtractorConfig, GeotagConfig, PreprocessConfig, RecognitionConfig,
};
pub use decoder::{MockDecoder, SymbolDecoder, ZbarImg};
pub use extract::{parse_barcode_digits, parse_price};
pub use geotag::{ExifTool, MetadataInjector};
pub use hash::{photo_file_name, sha256_file, store_path, to_hex};
pub use pipeline::{spawn_intake_watcher, Extractor, PipelineError};
pub use preprocess::{NormalizedImage, PreprocessError, Preprocessor};
pub use recognizer::{MockRecognizer, OcrError, RecognitionRequest, TesseractCli, TextRecognizer};
pub use types::{BarcodeSource, ExtractionResult};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::LeptessRecognizer;

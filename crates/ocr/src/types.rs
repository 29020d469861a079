use pricetag_core::{Barcode, Price};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the reported barcode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeSource {
    /// Decoded directly from the symbol pixels.
    Symbol,
    /// A digit run found in the OCR text.
    OcrDigits,
}

impl fmt::Display for BarcodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarcodeSource::Symbol => write!(f, "symbol"),
            BarcodeSource::OcrDigits => write!(f, "ocr_digits"),
        }
    }
}

/// Best-effort reading of a price tag. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub price: Option<Price>,
    pub barcode: Option<Barcode>,
    #[serde(skip)]
    pub barcode_source: Option<BarcodeSource>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.barcode.is_none()
    }
}

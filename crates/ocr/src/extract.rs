use std::sync::OnceLock;

use pricetag_core::{gs1_check_digit_ok, Barcode, Price};
use regex::Regex;
use tracing::debug;

use crate::config::BarcodeConfig;
use crate::types::{BarcodeSource, ExtractionResult};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// €12,34  |  12.34€  |  1 234,56  |  1.234,56 €  |  $1,234.56
// A comma decimal takes space/period grouping, a period decimal takes
// space/comma grouping. ASCII digits only.
re!(re_price,
    r"(?:[€$£]\s*)?\b([0-9]{1,3}(?:(?:[ .][0-9]{3})*,[0-9]{1,2}|(?:[ ,][0-9]{3})*\.[0-9]{1,2}))\b(?:\s*[€$£])?");

re!(re_digit_run, r"[0-9]+");

// ── Price ─────────────────────────────────────────────────────────────────────

/// First currency-shaped amount in the text, if any.
pub fn parse_price(text: &str) -> Option<Price> {
    let c = re_price().captures(text)?;
    let token = c.get(1)?.as_str();
    let price = normalize_amount(token).and_then(|s| s.parse::<Price>().ok());
    debug!(token, price = ?price, "price candidate");
    price
}

/// `1 234,56` → `1234.56`, `1,234.56` → `1234.56`. The last separator is
/// the decimal mark; every earlier one is grouping.
fn normalize_amount(token: &str) -> Option<String> {
    let decimal_at = token.rfind([',', '.'])?;
    let (int_part, frac_part) = token.split_at(decimal_at);
    let int_digits: String = int_part.chars().filter(char::is_ascii_digit).collect();
    Some(format!("{int_digits}.{}", &frac_part[1..]))
}

// ── Barcode digits ────────────────────────────────────────────────────────────

/// Standalone digit run of barcode length (EAN-8 through EAN-13 by default).
///
/// A run must be bounded by non-digits or the string edges; longer runs are
/// not sliced. With `verify_check_digit` the first run passing GS1 mod-10 wins.
pub fn parse_barcode_digits(text: &str, config: &BarcodeConfig) -> Option<Barcode> {
    re_digit_run()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|run| (config.min_digits..=config.max_digits).contains(&run.len()))
        .find(|run| !config.verify_check_digit || gs1_check_digit_ok(run))
        .and_then(|run| run.parse().ok())
}

// ── Merge ─────────────────────────────────────────────────────────────────────

/// Reconcile the signals: a directly decoded symbol always beats OCR digits.
pub fn merge(ocr_text: &str, decoded: Option<String>, config: &BarcodeConfig) -> ExtractionResult {
    let price = parse_price(ocr_text);

    let symbol = decoded.and_then(|raw| match raw.parse::<Barcode>() {
        Ok(b) => Some(b),
        Err(e) => {
            debug!(error = %e, "ignoring decoded symbol");
            None
        }
    });
    let (barcode, barcode_source) = match symbol {
        Some(b) => (Some(b), Some(BarcodeSource::Symbol)),
        None => match parse_barcode_digits(ocr_text, config) {
            Some(b) => (Some(b), Some(BarcodeSource::OcrDigits)),
            None => (None, None),
        },
    };

    ExtractionResult { price, barcode, barcode_source }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValueError;

/// Linear symbologies recognised by digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Ean8,
    UpcA,
    Ean13,
    Other,
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbology::Ean8 => write!(f, "EAN-8"),
            Symbology::UpcA => write!(f, "UPC-A"),
            Symbology::Ean13 => write!(f, "EAN-13"),
            Symbology::Other => write!(f, "other"),
        }
    }
}

/// A barcode value as decoded from a symbol or read out of OCR text.
///
/// Decoders may return non-numeric payloads (QR, Code 128) that can carry
/// inner spaces, so the only requirement is a non-empty trimmed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode(String);

impl Barcode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_numeric(&self) -> bool {
        self.0.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn symbology(&self) -> Symbology {
        if !self.is_numeric() {
            return Symbology::Other;
        }
        match self.0.len() {
            8 => Symbology::Ean8,
            12 => Symbology::UpcA,
            13 => Symbology::Ean13,
            _ => Symbology::Other,
        }
    }

    /// GS1 mod-10 check: weights 3,1,3,… from the rightmost data digit.
    pub fn has_valid_check_digit(&self) -> bool {
        gs1_check_digit_ok(&self.0)
    }
}

pub fn gs1_check_digit_ok(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    if bytes.len() < 2 || !bytes.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let (data, check) = bytes.split_at(bytes.len() - 1);
    let sum: u32 = data
        .iter()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 0 { d * 3 } else { d }
        })
        .sum();
    (10 - sum % 10) % 10 == u32::from(check[0] - b'0')
}

impl FromStr for Barcode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValueError::InvalidBarcode(s.to_string()));
        }
        Ok(Barcode(s.to_string()))
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_digit_known_values() {
        assert!(gs1_check_digit_ok("5901234123457"));
        assert!(gs1_check_digit_ok("4006381333931"));
        assert!(gs1_check_digit_ok("96385074"));
        assert!(gs1_check_digit_ok("036000291452"));
        assert!(!gs1_check_digit_ok("5901234123458"));
        assert!(!gs1_check_digit_ok("12a4"));
    }

    #[test]
    fn symbology_by_length() {
        let b: Barcode = "96385074".parse().unwrap();
        assert_eq!(b.symbology(), Symbology::Ean8);
        let b: Barcode = "036000291452".parse().unwrap();
        assert_eq!(b.symbology(), Symbology::UpcA);
        let b: Barcode = "5901234123457".parse().unwrap();
        assert_eq!(b.symbology(), Symbology::Ean13);
        let b: Barcode = "ABC-123".parse().unwrap();
        assert_eq!(b.symbology(), Symbology::Other);
        assert_eq!(Symbology::Ean13.to_string(), "EAN-13");
    }

    #[test]
    fn parse_trims_and_rejects_blank() {
        let b: Barcode = "  4006381333931\n".parse().unwrap();
        assert_eq!(b.as_str(), "4006381333931");
        assert!("   ".parse::<Barcode>().is_err());
    }

    #[test]
    fn parse_keeps_inner_spaces_of_symbol_payloads() {
        let b: Barcode = " ABC 123 ".parse().unwrap();
        assert_eq!(b.as_str(), "ABC 123");
        assert_eq!(b.symbology(), Symbology::Other);
        assert!(!b.is_numeric());
    }
}

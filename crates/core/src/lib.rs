pub mod barcode;
pub mod geo;
pub mod price;

pub use barcode::{gs1_check_digit_ok, Barcode, Symbology};
pub use geo::GeoPoint;
pub use price::Price;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("Invalid price amount: '{0}'")]
    InvalidPrice(String),
    #[error("Price cannot be negative: {0}")]
    NegativePrice(String),
    #[error("Invalid barcode: '{0}'")]
    InvalidBarcode(String),
    #[error("Latitude out of range: {0}")]
    Latitude(f64),
    #[error("Longitude out of range: {0}")]
    Longitude(f64),
}

use serde::{Deserialize, Serialize};

use crate::ValueError;

/// Capture location of a photo, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValueError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValueError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValueError::Longitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude_ref(&self) -> char {
        if self.latitude >= 0.0 { 'N' } else { 'S' }
    }

    pub fn longitude_ref(&self) -> char {
        if self.longitude >= 0.0 { 'E' } else { 'W' }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hemisphere_refs() {
        let p = GeoPoint::new(48.85, 2.35).unwrap();
        assert_eq!((p.latitude_ref(), p.longitude_ref()), ('N', 'E'));
        let p = GeoPoint::new(-33.9, -70.6).unwrap();
        assert_eq!((p.latitude_ref(), p.longitude_ref()), ('S', 'W'));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(GeoPoint::new(91.0, 0.0), Err(ValueError::Latitude(_))));
        assert!(matches!(GeoPoint::new(0.0, -180.5), Err(ValueError::Longitude(_))));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One recorded position sample belonging to a single session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsFix {
    pub timestamp: DateTime<Utc>,
    pub coordinates: Coordinates,
}

impl GpsFix {
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}

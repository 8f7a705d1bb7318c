use serde::{Deserialize, Serialize};

/// A point in WGS84 decimal degrees, already parsed out of its `"lat,lon"` wire
/// form. See `dispatch::geo` for parsing and distance math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

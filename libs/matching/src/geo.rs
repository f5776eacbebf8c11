//! Great-circle distance between two points on the Earth's surface
//!
//! Distances use the haversine formula on a sphere of mean radius
//! [`EARTH_RADIUS_KM`]. That is plenty for a proximity gate measured in tens
//! of kilometres.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default pairing radius in kilometres
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
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

    /// Build a point from nullable columns; both halves must be present
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }

    /// Whether the point lies within the valid latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Distance to another point in kilometres
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        distance_km(*self, *other)
    }
}

/// Haversine distance between two points in kilometres
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Proximity gate used when pairing requests with resources
///
/// Fails closed: a pair with an unknown location on either side is never
/// within range.
pub fn within_radius(from: Option<Coordinates>, to: Option<Coordinates>, radius_km: f64) -> bool {
    match (from, to) {
        (Some(from), Some(to)) => distance_km(from, to) <= radius_km,
        _ => false,
    }
}

//! API models for request and response payloads

use matching::geo::Coordinates;

pub mod admin;
pub mod assignments;
pub mod matches;
pub mod requests;
pub mod resources;
pub mod users;

/// Maximum length of an aid or resource type tag
pub const MAX_TYPE_LEN: usize = 100;

/// Combine optional latitude/longitude fields into a location
///
/// Both halves must be given together and lie within the valid ranges.
pub fn parse_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>, String> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(latitude), Some(longitude)) => {
            let point = Coordinates::new(latitude, longitude);
            if point.is_valid() {
                Ok(Some(point))
            } else {
                Err("Latitude must be within [-90, 90] and longitude within [-180, 180]".to_string())
            }
        }
        _ => Err("Latitude and longitude must be provided together".to_string()),
    }
}

/// Trim a type tag and check it is present and short enough
pub fn parse_type_tag(field: &str, value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > MAX_TYPE_LEN {
        return Err(format!("{field} must be at most {MAX_TYPE_LEN} characters long"));
    }
    Ok(value.to_string())
}

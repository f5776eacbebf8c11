//! Aid request payloads, filters and views

use matching::{
    geo::Coordinates,
    models::{AidRequest, AidRequestStatus, Urgency},
};
use serde::{Deserialize, Serialize};

use super::{parse_location, parse_type_tag};

/// Raw query string of `GET /requests`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AidRequestQuery {
    pub urgency: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub aid_type: Option<String>,
    pub search: Option<String>,
}

/// Validated filter for listing aid requests; `None` fields do not filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AidRequestFilter {
    pub urgency: Option<Urgency>,
    pub status: Option<AidRequestStatus>,
    /// Case-insensitive substring of the aid type
    pub aid_type: Option<String>,
    /// Case-insensitive substring of the requester's name or email
    pub search: Option<String>,
}

impl AidRequestQuery {
    pub fn validate(self) -> Result<AidRequestFilter, String> {
        Ok(AidRequestFilter {
            urgency: non_blank(self.urgency)
                .map(|v| v.parse::<Urgency>())
                .transpose()
                .map_err(|e| e.to_string())?,
            status: non_blank(self.status)
                .map(|v| v.parse::<AidRequestStatus>())
                .transpose()
                .map_err(|e| e.to_string())?,
            aid_type: non_blank(self.aid_type),
            search: non_blank(self.search),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Escape `ILIKE` wildcards and wrap the term for substring matching
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Payload of `POST /requests`
#[derive(Debug, Clone, Deserialize)]
pub struct NewAidRequestPayload {
    #[serde(default)]
    pub aid_type: String,
    pub quantity: Option<i32>,
    #[serde(default)]
    pub urgency: Urgency,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Aid request ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewAidRequest {
    pub aid_type: String,
    pub quantity: i32,
    pub urgency: Urgency,
    pub location: Option<Coordinates>,
}

impl NewAidRequestPayload {
    pub fn validate(self) -> Result<NewAidRequest, String> {
        let quantity = self.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err("Quantity must be at least 1".to_string());
        }

        Ok(NewAidRequest {
            aid_type: parse_type_tag("Aid type", &self.aid_type)?,
            quantity,
            urgency: self.urgency,
            location: parse_location(self.latitude, self.longitude)?,
        })
    }
}

/// Payload of `PATCH /requests/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct AidRequestUpdate {
    pub urgency: Option<Urgency>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Validated changes to a pending request
#[derive(Debug, Clone, PartialEq)]
pub struct AidRequestChanges {
    pub urgency: Option<Urgency>,
    pub location: Option<Coordinates>,
}

impl AidRequestUpdate {
    pub fn validate(self) -> Result<AidRequestChanges, String> {
        let location = parse_location(self.latitude, self.longitude)?;
        if self.urgency.is_none() && location.is_none() {
            return Err("Provide an urgency or a location to update".to_string());
        }

        Ok(AidRequestChanges {
            urgency: self.urgency,
            location,
        })
    }
}

/// Payload of `PATCH /admin/requests/{id}/urgency`
#[derive(Debug, Clone, Deserialize)]
pub struct UrgencyUpdate {
    pub urgency: Urgency,
}

/// Aid request as listed publicly, with the requester's identity
#[derive(Debug, Clone, Serialize)]
pub struct AidRequestListing {
    #[serde(flatten)]
    pub request: AidRequest,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

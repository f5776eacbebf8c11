//! Resource payloads and views

use matching::{
    geo::{Coordinates, distance_km},
    models::Resource,
};
use serde::{Deserialize, Serialize};

use super::{parse_location, parse_type_tag};

/// Payload of `POST /resources`
#[derive(Debug, Clone, Deserialize)]
pub struct NewResourcePayload {
    #[serde(default)]
    pub resource_type: String,
    pub quantity: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Resource ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub resource_type: String,
    pub quantity: i32,
    pub location: Option<Coordinates>,
}

impl NewResourcePayload {
    pub fn validate(self) -> Result<NewResource, String> {
        let quantity = self
            .quantity
            .ok_or_else(|| "Quantity is required".to_string())?;
        if quantity < 1 {
            return Err("Quantity must be at least 1".to_string());
        }

        Ok(NewResource {
            resource_type: parse_type_tag("Resource type", &self.resource_type)?,
            quantity,
            location: parse_location(self.latitude, self.longitude)?,
        })
    }
}

/// Resource of the same type as a request, with its distance when both are located
#[derive(Debug, Clone, Serialize)]
pub struct ResourceCandidate {
    #[serde(flatten)]
    pub resource: Resource,
    pub distance_km: Option<f64>,
}

impl ResourceCandidate {
    pub fn new(resource: Resource, request_location: Option<Coordinates>) -> Self {
        let distance_km = match (request_location, resource.location) {
            (Some(from), Some(to)) => Some(distance_km(from, to)),
            _ => None,
        };

        Self {
            resource,
            distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn resource(location: Option<Coordinates>) -> Resource {
        Resource {
            id: Uuid::new_v4(),
            donor_id: Uuid::new_v4(),
            resource_type: "water".to_string(),
            quantity: 8,
            location,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn quantity_is_required_and_positive() {
        let mut payload = NewResourcePayload {
            resource_type: "water".to_string(),
            quantity: None,
            latitude: None,
            longitude: None,
        };
        assert!(payload.clone().validate().is_err());

        payload.quantity = Some(-2);
        assert!(payload.clone().validate().is_err());

        payload.quantity = Some(12);
        assert_eq!(payload.validate().unwrap().quantity, 12);
    }

    #[test]
    fn candidate_distance_needs_both_locations() {
        let here = Coordinates::new(0.0, 0.0);
        let candidate = ResourceCandidate::new(resource(Some(Coordinates::new(1.0, 0.0))), Some(here));
        let distance = candidate.distance_km.unwrap();
        assert!((distance - 111.19).abs() < 0.1);

        assert_eq!(ResourceCandidate::new(resource(None), Some(here)).distance_km, None);
        assert_eq!(
            ResourceCandidate::new(resource(Some(here)), None).distance_km,
            None
        );
    }
}

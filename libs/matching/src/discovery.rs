//! Match discovery
//!
//! Discovery only proposes: it pairs every open aid request with the
//! available resources of the same type inside the configured radius and
//! records each pair as a pending match. Quantities and statuses are left
//! untouched. Re-running is safe because existing pairs are skipped by the
//! `unique_match` constraint.

use sqlx::Row;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::MatchingEngine;
use crate::error::MatchingResult;
use crate::geo::{Coordinates, within_radius};

/// A pending request that still needs units
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub id: Uuid,
    pub aid_type: String,
    pub location: Option<Coordinates>,
}

/// A resource with units left to give
#[derive(Debug, Clone)]
pub struct AvailableResource {
    pub id: Uuid,
    pub resource_type: String,
    pub location: Option<Coordinates>,
}

/// A (request, resource) pair worth recording as a pending match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair {
    pub request_id: Uuid,
    pub resource_id: Uuid,
}

/// Pair open requests with same-type resources within `radius_km`
///
/// Pairs come out in request order, then resource order.
pub fn propose_pairs(
    requests: &[OpenRequest],
    resources: &[AvailableResource],
    radius_km: f64,
) -> Vec<CandidatePair> {
    let mut by_type: HashMap<&str, Vec<&AvailableResource>> = HashMap::new();
    for resource in resources {
        by_type
            .entry(resource.resource_type.as_str())
            .or_default()
            .push(resource);
    }

    requests
        .iter()
        .flat_map(|request| {
            by_type
                .get(request.aid_type.as_str())
                .into_iter()
                .flatten()
                .filter(move |resource| within_radius(request.location, resource.location, radius_km))
                .map(move |resource| CandidatePair {
                    request_id: request.id,
                    resource_id: resource.id,
                })
        })
        .collect()
}

impl MatchingEngine {
    /// Record new candidate matches and return how many were created
    ///
    /// All inserts happen in one transaction; any failure rolls back the
    /// whole run.
    pub async fn discover_matches(&self) -> MatchingResult<u64> {
        let mut tx = self.pool.begin().await?;

        let requests = sqlx::query(
            r#"
            SELECT id, aid_type, latitude, longitude
            FROM aid_requests
            WHERE status = 'pending' AND outstanding_quantity > 0
            ORDER BY request_date ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(|row| {
            Ok(OpenRequest {
                id: row.try_get("id")?,
                aid_type: row.try_get("aid_type")?,
                location: Coordinates::from_parts(
                    row.try_get("latitude")?,
                    row.try_get("longitude")?,
                ),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let resources = sqlx::query(
            r#"
            SELECT id, resource_type, latitude, longitude
            FROM resources
            WHERE quantity > 0
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?
        .iter()
        .map(|row| {
            Ok(AvailableResource {
                id: row.try_get("id")?,
                resource_type: row.try_get("resource_type")?,
                location: Coordinates::from_parts(
                    row.try_get("latitude")?,
                    row.try_get("longitude")?,
                ),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let pairs = propose_pairs(&requests, &resources, self.config.radius_km);
        debug!(
            requests = requests.len(),
            resources = resources.len(),
            pairs = pairs.len(),
            "Evaluated candidate pairs"
        );

        let mut created = 0;
        for pair in &pairs {
            let result = sqlx::query(
                r#"
                INSERT INTO matches (request_id, resource_id)
                VALUES ($1, $2)
                ON CONFLICT ON CONSTRAINT unique_match DO NOTHING
                "#,
            )
            .bind(pair.request_id)
            .bind(pair.resource_id)
            .execute(&mut *tx)
            .await?;

            created += result.rows_affected();
        }

        tx.commit().await?;

        info!(created, radius_km = self.config.radius_km, "Match discovery finished");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(aid_type: &str, location: Option<(f64, f64)>) -> OpenRequest {
        OpenRequest {
            id: Uuid::new_v4(),
            aid_type: aid_type.to_string(),
            location: location.map(|(lat, lon)| Coordinates::new(lat, lon)),
        }
    }

    fn resource(resource_type: &str, location: Option<(f64, f64)>) -> AvailableResource {
        AvailableResource {
            id: Uuid::new_v4(),
            resource_type: resource_type.to_string(),
            location: location.map(|(lat, lon)| Coordinates::new(lat, lon)),
        }
    }

    #[test]
    fn pairs_same_type_within_radius() {
        let requests = vec![request("water", Some((0.0, 0.0)))];
        let near = resource("water", Some((0.0, 0.001)));
        let far = resource("water", Some((10.0, 10.0)));
        let resources = vec![near.clone(), far];

        let pairs = propose_pairs(&requests, &resources, 50.0);
        assert_eq!(
            pairs,
            vec![CandidatePair {
                request_id: requests[0].id,
                resource_id: near.id,
            }]
        );
    }

    #[test]
    fn ignores_other_types() {
        let requests = vec![request("water", Some((0.0, 0.0)))];
        let resources = vec![resource("blankets", Some((0.0, 0.0)))];
        assert!(propose_pairs(&requests, &resources, 50.0).is_empty());
    }

    #[test]
    fn type_tags_are_exact() {
        let requests = vec![request("Water", Some((0.0, 0.0)))];
        let resources = vec![resource("water", Some((0.0, 0.0)))];
        assert!(propose_pairs(&requests, &resources, 50.0).is_empty());
    }

    #[test]
    fn unknown_locations_never_pair() {
        let requests = vec![request("food", None), request("food", Some((1.0, 1.0)))];
        let resources = vec![resource("food", Some((1.0, 1.0))), resource("food", None)];

        let pairs = propose_pairs(&requests, &resources, 50.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].request_id, requests[1].id);
        assert_eq!(pairs[0].resource_id, resources[0].id);
    }

    #[test]
    fn one_request_can_pair_with_several_resources() {
        let requests = vec![request("tents", Some((10.0, 10.0)))];
        let resources = vec![
            resource("tents", Some((10.0, 10.1))),
            resource("tents", Some((10.1, 10.0))),
        ];

        let pairs = propose_pairs(&requests, &resources, 50.0);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].resource_id, resources[0].id);
        assert_eq!(pairs[1].resource_id, resources[1].id);
    }

    #[test]
    fn radius_is_configurable() {
        let requests = vec![request("water", Some((0.0, 0.0)))];
        let resources = vec![resource("water", Some((1.0, 0.0)))];

        assert!(propose_pairs(&requests, &resources, 50.0).is_empty());
        assert_eq!(propose_pairs(&requests, &resources, 120.0).len(), 1);
    }
}

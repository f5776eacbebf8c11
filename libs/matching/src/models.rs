//! Domain records for aid requests, resources, matches and assignments
//!
//! Status and urgency columns are stored as lowercase strings; the enums here
//! are the only place those strings are spelled out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::geo::Coordinates;

/// Error returned when a stored or submitted label is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct InvalidLabel {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InvalidLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    other => Err(InvalidLabel {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// Lifecycle of an aid request
    AidRequestStatus, "aid request status", {
        Pending => "pending",
        Assigned => "assigned",
        Fulfilled => "fulfilled",
        Cancelled => "cancelled",
    }
);

labelled_enum!(
    /// How pressing an aid request is
    Urgency, "urgency", {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

labelled_enum!(
    /// Lifecycle of a candidate pairing
    MatchStatus, "match status", {
        Pending => "pending",
        Confirmed => "confirmed",
        Declined => "declined",
    }
);

labelled_enum!(
    /// How an assignment came to exist
    AssignmentOrigin, "assignment origin", {
        Direct => "direct",
        Match => "match",
    }
);

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Medium
    }
}

/// Decode a labelled column, surfacing bad values as a decode error
pub fn get_label<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = InvalidLabel>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: InvalidLabel| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn get_location(row: &PgRow) -> Result<Option<Coordinates>, sqlx::Error> {
    Ok(Coordinates::from_parts(
        row.try_get("latitude")?,
        row.try_get("longitude")?,
    ))
}

/// Aid request posted by a requester
#[derive(Debug, Clone, Serialize)]
pub struct AidRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub aid_type: String,
    pub requested_quantity: i32,
    pub outstanding_quantity: i32,
    pub urgency: Urgency,
    pub status: AidRequestStatus,
    pub location: Option<Coordinates>,
    pub request_date: DateTime<Utc>,
}

impl AidRequest {
    /// Columns expected by [`AidRequest::from_row`]
    pub const COLUMNS: &'static str = "id, requester_id, aid_type, requested_quantity, \
        outstanding_quantity, urgency, status, latitude, longitude, request_date";

    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            requester_id: row.try_get("requester_id")?,
            aid_type: row.try_get("aid_type")?,
            requested_quantity: row.try_get("requested_quantity")?,
            outstanding_quantity: row.try_get("outstanding_quantity")?,
            urgency: get_label(row, "urgency")?,
            status: get_label(row, "status")?,
            location: get_location(row)?,
            request_date: row.try_get("request_date")?,
        })
    }
}

/// Resource offered by a donor
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub resource_type: String,
    pub quantity: i32,
    pub location: Option<Coordinates>,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Columns expected by [`Resource::from_row`]
    pub const COLUMNS: &'static str =
        "id, donor_id, resource_type, quantity, latitude, longitude, created_at";

    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            donor_id: row.try_get("donor_id")?,
            resource_type: row.try_get("resource_type")?,
            quantity: row.try_get("quantity")?,
            location: get_location(row)?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Candidate or decided pairing of a request and a resource
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub id: Uuid,
    pub request_id: Uuid,
    pub resource_id: Uuid,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub const COLUMNS: &'static str = "id, request_id, resource_id, status, created_at";

    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            request_id: row.try_get("request_id")?,
            resource_id: row.try_get("resource_id")?,
            status: get_label(row, "status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A volunteer tasked with delivering (part of) a request
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: Uuid,
    pub request_id: Uuid,
    pub volunteer_id: Uuid,
    pub assigned_by_admin_id: Option<Uuid>,
    pub match_id: Option<Uuid>,
    pub origin: AssignmentOrigin,
    pub quantity_assigned: i32,
    pub assignment_date: DateTime<Utc>,
}

impl Assignment {
    pub const COLUMNS: &'static str = "id, request_id, volunteer_id, assigned_by_admin_id, \
        match_id, origin, quantity_assigned, assignment_date";

    pub fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            request_id: row.try_get("request_id")?,
            volunteer_id: row.try_get("volunteer_id")?,
            assigned_by_admin_id: row.try_get("assigned_by_admin_id")?,
            match_id: row.try_get("match_id")?,
            origin: get_label(row, "origin")?,
            quantity_assigned: row.try_get("quantity_assigned")?,
            assignment_date: row.try_get("assignment_date")?,
        })
    }
}

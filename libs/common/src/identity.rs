//! User roles, capabilities and token claims shared by the services
//!
//! Roles are stored as lowercase strings in the `users.role` column and in
//! JWT claims. Everything above the storage boundary works with [`Role`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role of a platform user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Posts aid requests
    #[serde(alias = "aidrequester")]
    Requester,
    /// Offers resources
    Donor,
    /// Delivers assigned aid
    Volunteer,
    /// Runs matching and manages users
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Requester, Role::Donor, Role::Volunteer, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Requester => "requester",
            Role::Donor => "donor",
            Role::Volunteer => "volunteer",
            Role::Admin => "admin",
        }
    }

    /// Whether this role may perform the given action
    pub fn permits(self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Requester => matches!(capability, PostAidRequest | ManageOwnAidRequests),
            Role::Donor => matches!(capability, PostResource),
            Role::Volunteer => matches!(capability, ViewOwnAssignments | CompleteAssignment),
            Role::Admin => matches!(
                capability,
                DiscoverMatches | ReviewMatches | AssignVolunteers | ManageUsers | ModerateContent
            ),
        }
    }

    /// Roles a user may pick for themselves at signup
    pub fn is_self_assignable(self) -> bool {
        match self {
            Role::Requester | Role::Donor | Role::Volunteer => true,
            Role::Admin => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "requester" | "aidrequester" => Ok(Role::Requester),
            "donor" => Ok(Role::Donor),
            "volunteer" => Ok(Role::Volunteer),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Actions guarded by role checks at the HTTP boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    PostAidRequest,
    ManageOwnAidRequests,
    PostResource,
    ViewOwnAssignments,
    CompleteAssignment,
    DiscoverMatches,
    ReviewMatches,
    AssignVolunteers,
    ManageUsers,
    ModerateContent,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User role at issuance time
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

//! Entry point of the matching and fulfillment engine

use common::identity::{Role, UnknownRole};
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::config::MatchingConfig;
use crate::error::{MatchingError, MatchingResult};

/// Matching and fulfillment engine
///
/// Holds an injected connection pool; every operation acquires its own
/// transaction from it and either commits or rolls back when the
/// transaction goes out of scope. Operations live in [`crate::discovery`],
/// [`crate::fulfillment`], [`crate::completion`] and [`crate::dispatch`].
#[derive(Clone)]
pub struct MatchingEngine {
    pub(crate) pool: PgPool,
    pub(crate) config: MatchingConfig,
}

impl MatchingEngine {
    /// Create a new engine over the given pool
    pub fn new(pool: PgPool, config: MatchingConfig) -> Self {
        Self { pool, config }
    }

    /// Engine configuration
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }
}

/// Check that a user exists and holds the volunteer role
pub(crate) async fn require_volunteer(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> MatchingResult<()> {
    let row = sqlx::query("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| MatchingError::not_found("volunteer", user_id))?;

    let raw: String = row.try_get("role")?;
    let role = raw
        .parse::<Role>()
        .map_err(|e: UnknownRole| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;

    ensure_volunteer(user_id, role)
}

fn ensure_volunteer(user_id: Uuid, role: Role) -> MatchingResult<()> {
    match role {
        Role::Volunteer => Ok(()),
        Role::Requester | Role::Donor | Role::Admin => Err(MatchingError::Validation(format!(
            "user {user_id} has role {role}, not volunteer"
        ))),
    }
}

//! Repositories for database operations
//!
//! Repositories return `sqlx::Error` untouched; handlers turn it into an
//! `ApiError`, which is where constraint violations get classified.

pub mod aid_requests;
pub mod assignments;
pub mod matches;
pub mod resources;
pub mod users;

pub use aid_requests::AidRequestRepository;
pub use assignments::AssignmentRepository;
pub use matches::MatchRepository;
pub use resources::ResourceRepository;
pub use users::UserRepository;

use common::identity::Role;
use sqlx::{Row, postgres::PgRow};

/// Decode a role column
pub(crate) fn get_role(row: &PgRow, column: &str) -> Result<Role, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: common::identity::UnknownRole| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

//! User profile, contact info and admin user management

use common::identity::Role;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::get_role;
use crate::models::users::{ContactInfo, ContactInfoPayload, UserProfile, UserSummary};

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Profile of one user, with contact names when they exist
    pub async fn profile(&self, id: Uuid) -> sqlx::Result<Option<UserProfile>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.email, u.role, u.created_at, c.first_name, c.last_name
            FROM users u
            LEFT JOIN contact_info c ON c.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    pub async fn contact_info(&self, user_id: Uuid) -> sqlx::Result<Option<ContactInfo>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, first_name, last_name, phone_no, street, city, state
            FROM contact_info
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(contact_from_row).transpose()
    }

    /// Insert or replace a user's contact info
    pub async fn upsert_contact_info(
        &self,
        user_id: Uuid,
        contact: &ContactInfoPayload,
    ) -> sqlx::Result<ContactInfo> {
        let row = sqlx::query(
            r#"
            INSERT INTO contact_info (user_id, first_name, last_name, phone_no, street, city, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone_no = EXCLUDED.phone_no,
                street = EXCLUDED.street,
                city = EXCLUDED.city,
                state = EXCLUDED.state
            RETURNING user_id, first_name, last_name, phone_no, street, city, state
            "#,
        )
        .bind(user_id)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.phone_no)
        .bind(&contact.street)
        .bind(&contact.city)
        .bind(&contact.state)
        .fetch_one(&self.pool)
        .await?;

        contact_from_row(&row)
    }

    /// All users, oldest first
    pub async fn list(&self) -> sqlx::Result<Vec<UserSummary>> {
        let rows = sqlx::query("SELECT id, email, role, created_at FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(summary_from_row).collect()
    }

    pub async fn update_role(&self, id: Uuid, role: Role) -> sqlx::Result<Option<UserSummary>> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET role = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, email, role, created_at
            "#,
        )
        .bind(role.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            info!("User {} is now {}", id, role);
        }

        row.as_ref().map(summary_from_row).transpose()
    }

    /// Delete a user; owned requests, resources and assignments cascade
    pub async fn delete(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn profile_from_row(row: &PgRow) -> sqlx::Result<UserProfile> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        role: get_role(row, "role")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        created_at: row.try_get("created_at")?,
    })
}

fn contact_from_row(row: &PgRow) -> sqlx::Result<ContactInfo> {
    Ok(ContactInfo {
        user_id: row.try_get("user_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone_no: row.try_get("phone_no")?,
        street: row.try_get("street")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
    })
}

fn summary_from_row(row: &PgRow) -> sqlx::Result<UserSummary> {
    Ok(UserSummary {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        role: get_role(row, "role")?,
        created_at: row.try_get("created_at")?,
    })
}

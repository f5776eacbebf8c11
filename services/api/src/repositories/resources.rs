//! Donor resource persistence

use matching::models::Resource;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resources::NewResource;

/// Resource repository
#[derive(Clone)]
pub struct ResourceRepository {
    pool: PgPool,
}

impl ResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All resources, newest first
    pub async fn list(&self) -> sqlx::Result<Vec<Resource>> {
        let query = format!(
            "SELECT {} FROM resources ORDER BY created_at DESC",
            Resource::COLUMNS
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(Resource::from_row).collect()
    }

    pub async fn create(&self, donor_id: Uuid, resource: &NewResource) -> sqlx::Result<Resource> {
        let query = format!(
            r#"
            INSERT INTO resources (donor_id, resource_type, quantity, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            Resource::COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(donor_id)
            .bind(&resource.resource_type)
            .bind(resource.quantity)
            .bind(resource.location.map(|l| l.latitude))
            .bind(resource.location.map(|l| l.longitude))
            .fetch_one(&self.pool)
            .await?;

        let created = Resource::from_row(&row)?;
        info!(
            "Donor {} offered resource {} ({} x {})",
            donor_id, created.id, created.quantity, created.resource_type
        );

        Ok(created)
    }

    /// Resources with stock left whose type equals the given aid type
    pub async fn available_of_type(&self, resource_type: &str) -> sqlx::Result<Vec<Resource>> {
        let query = format!(
            r#"
            SELECT {}
            FROM resources
            WHERE resource_type = $1 AND quantity > 0
            ORDER BY created_at ASC
            "#,
            Resource::COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(resource_type)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Resource::from_row).collect()
    }
}

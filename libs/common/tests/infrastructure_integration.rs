//! Integration tests for the infrastructure components
//!
//! These tests verify that PostgreSQL is reachable and that the workspace
//! migrations produce the expected schema. They need a running database
//! (`DATABASE_URL`) and are ignored by default.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use serial_test::serial;
use sqlx::Row;

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    // Running twice must be a no-op the second time
    run_migrations(&pool).await?;
    run_migrations(&pool).await?;

    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS tables
        FROM information_schema.tables
        WHERE table_schema = 'public'
          AND table_name IN ('users', 'contact_info', 'aid_requests', 'resources', 'matches', 'assignments')
        "#,
    )
    .fetch_one(&pool)
    .await?;

    let tables: i64 = row.get("tables");
    assert_eq!(tables, 6, "Expected every relief table to exist");

    let column = sqlx::query(
        r#"
        SELECT column_name
        FROM information_schema.columns
        WHERE table_name = 'assignments' AND column_name = 'quantity_assigned'
        "#,
    )
    .fetch_optional(&pool)
    .await?;
    assert!(column.is_some(), "Partial assignment migration was not applied");

    Ok(())
}

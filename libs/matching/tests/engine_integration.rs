//! Integration tests for the matching engine against PostgreSQL
//!
//! Each test truncates the relief tables, so they run serially. They need a
//! running database reachable through `DATABASE_URL` and are ignored by
//! default: `cargo test -p matching -- --ignored`.

use anyhow::Result;
use common::database::{DatabaseConfig, init_pool, run_migrations};
use matching::models::AidRequestStatus;
use matching::{DirectAssignment, MatchingConfig, MatchingEngine, MatchingError};
use serial_test::serial;
use sqlx::{PgPool, Row};
use uuid::Uuid;

async fn setup() -> Result<PgPool> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    run_migrations(&pool).await?;
    sqlx::raw_sql("DROP TRIGGER IF EXISTS reject_fuel_matches ON matches")
        .execute(&pool)
        .await?;
    sqlx::query("TRUNCATE users, contact_info, aid_requests, resources, matches, assignments CASCADE")
        .execute(&pool)
        .await?;
    Ok(pool)
}

fn engine(pool: &PgPool) -> MatchingEngine {
    MatchingEngine::new(pool.clone(), MatchingConfig::default())
}

async fn create_user(pool: &PgPool, role: &str) -> Result<Uuid> {
    let id = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, role) VALUES ($1, 'x', $2) RETURNING id",
    )
    .bind(format!("{}-{}@example.org", role, Uuid::new_v4()))
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn create_request(
    pool: &PgPool,
    requester: Uuid,
    aid_type: &str,
    quantity: i32,
    location: (f64, f64),
) -> Result<Uuid> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO aid_requests
            (requester_id, aid_type, requested_quantity, outstanding_quantity, urgency, latitude, longitude)
        VALUES ($1, $2, $3, $3, 'high', $4, $5)
        RETURNING id
        "#,
    )
    .bind(requester)
    .bind(aid_type)
    .bind(quantity)
    .bind(location.0)
    .bind(location.1)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn create_resource(
    pool: &PgPool,
    donor: Uuid,
    resource_type: &str,
    quantity: i32,
    location: (f64, f64),
) -> Result<Uuid> {
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO resources (donor_id, resource_type, quantity, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(donor)
    .bind(resource_type)
    .bind(quantity)
    .bind(location.0)
    .bind(location.1)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn match_id(pool: &PgPool, request_id: Uuid, resource_id: Uuid) -> Result<Uuid> {
    let id = sqlx::query_scalar("SELECT id FROM matches WHERE request_id = $1 AND resource_id = $2")
        .bind(request_id)
        .bind(resource_id)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn request_state(pool: &PgPool, request_id: Uuid) -> Result<(i32, String)> {
    let row = sqlx::query("SELECT outstanding_quantity, status FROM aid_requests WHERE id = $1")
        .bind(request_id)
        .fetch_one(pool)
        .await?;
    Ok((row.get("outstanding_quantity"), row.get("status")))
}

async fn resource_quantity(pool: &PgPool, resource_id: Uuid) -> Result<i32> {
    let quantity = sqlx::query_scalar("SELECT quantity FROM resources WHERE id = $1")
        .bind(resource_id)
        .fetch_one(pool)
        .await?;
    Ok(quantity)
}

async fn match_status(pool: &PgPool, match_id: Uuid) -> Result<String> {
    let status = sqlx::query_scalar("SELECT status FROM matches WHERE id = $1")
        .bind(match_id)
        .fetch_one(pool)
        .await?;
    Ok(status)
}

async fn count(pool: &PgPool, table: &str) -> Result<i64> {
    let n = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(n)
}

struct Actors {
    requester: Uuid,
    donor: Uuid,
    volunteer: Uuid,
    admin: Uuid,
}

async fn actors(pool: &PgPool) -> Result<Actors> {
    Ok(Actors {
        requester: create_user(pool, "requester").await?,
        donor: create_user(pool, "donor").await?,
        volunteer: create_user(pool, "volunteer").await?,
        admin: create_user(pool, "admin").await?,
    })
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn discovery_respects_radius_and_is_idempotent() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "water", 3, (0.0, 0.0)).await?;
    let near = create_resource(&pool, a.donor, "water", 2, (0.0, 0.001)).await?;
    let _far = create_resource(&pool, a.donor, "water", 2, (10.0, 10.0)).await?;
    let _other_type = create_resource(&pool, a.donor, "blankets", 2, (0.0, 0.0)).await?;
    let _empty = create_resource(&pool, a.donor, "water", 0, (0.0, 0.0)).await?;

    assert_eq!(engine.discover_matches().await?, 1);
    assert!(match_id(&pool, request, near).await.is_ok());

    // Nothing changed, nothing new
    assert_eq!(engine.discover_matches().await?, 0);

    // Discovery never touches quantities or statuses
    assert_eq!(request_state(&pool, request).await?, (3, "pending".to_string()));
    assert_eq!(resource_quantity(&pool, near).await?, 2);
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn partial_confirmation_transfers_min_quantity() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "food", 10, (5.0, 5.0)).await?;
    let resource = create_resource(&pool, a.donor, "food", 6, (5.0, 5.01)).await?;
    engine.discover_matches().await?;
    let m = match_id(&pool, request, resource).await?;

    let confirmation = engine.confirm_match(m, a.volunteer, a.admin).await?;
    assert_eq!(confirmation.transferred, 6);
    assert_eq!(confirmation.remaining_outstanding, 4);
    assert_eq!(confirmation.request_status, AidRequestStatus::Pending);

    assert_eq!(resource_quantity(&pool, resource).await?, 0);
    assert_eq!(request_state(&pool, request).await?, (4, "pending".to_string()));

    let assigned: i32 =
        sqlx::query_scalar("SELECT quantity_assigned FROM assignments WHERE id = $1")
            .bind(confirmation.assignment_id)
            .fetch_one(&pool)
            .await?;
    assert_eq!(assigned, 6);

    let status: String = sqlx::query_scalar("SELECT status FROM matches WHERE id = $1")
        .bind(m)
        .fetch_one(&pool)
        .await?;
    assert_eq!(status, "confirmed");

    // A confirmed match cannot be confirmed again
    let err = engine.confirm_match(m, a.volunteer, a.admin).await.unwrap_err();
    assert!(matches!(err, MatchingError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn request_is_assigned_once_fully_covered() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "tents", 7, (1.0, 1.0)).await?;
    let first = create_resource(&pool, a.donor, "tents", 4, (1.0, 1.0)).await?;
    let second = create_resource(&pool, a.donor, "tents", 10, (1.0, 1.0)).await?;
    assert_eq!(engine.discover_matches().await?, 2);

    let c1 = engine
        .confirm_match(match_id(&pool, request, first).await?, a.volunteer, a.admin)
        .await?;
    let c2 = engine
        .confirm_match(match_id(&pool, request, second).await?, a.volunteer, a.admin)
        .await?;

    assert_eq!((c1.transferred, c2.transferred), (4, 3));
    assert_eq!(c2.request_status, AidRequestStatus::Assigned);
    assert_eq!(request_state(&pool, request).await?, (0, "assigned".to_string()));
    assert_eq!(resource_quantity(&pool, second).await?, 7);

    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity_assigned), 0) FROM assignments WHERE request_id = $1 AND origin = 'match'",
    )
    .bind(request)
    .fetch_one(&pool)
    .await?;
    assert_eq!(total, 7);

    // An assigned request is no longer a discovery candidate
    create_resource(&pool, a.donor, "tents", 3, (1.0, 1.0)).await?;
    assert_eq!(engine.discover_matches().await?, 0);
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn empty_resource_fails_without_mutation() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "water", 3, (0.0, 0.0)).await?;
    let resource = create_resource(&pool, a.donor, "water", 2, (0.0, 0.0)).await?;
    engine.discover_matches().await?;
    let m = match_id(&pool, request, resource).await?;

    sqlx::query("UPDATE resources SET quantity = 0 WHERE id = $1")
        .bind(resource)
        .execute(&pool)
        .await?;

    let err = engine.confirm_match(m, a.volunteer, a.admin).await.unwrap_err();
    assert!(matches!(err, MatchingError::InsufficientQuantity { available: 0, .. }));

    assert_eq!(request_state(&pool, request).await?, (3, "pending".to_string()));
    let assignments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assignments")
        .fetch_one(&pool)
        .await?;
    assert_eq!(assignments, 0);
    let status: String = sqlx::query_scalar("SELECT status FROM matches WHERE id = $1")
        .bind(m)
        .fetch_one(&pool)
        .await?;
    assert_eq!(status, "pending");
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn concurrent_confirmations_do_not_double_spend() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let resource = create_resource(&pool, a.donor, "medicine", 5, (2.0, 2.0)).await?;
    let r1 = create_request(&pool, a.requester, "medicine", 5, (2.0, 2.0)).await?;
    let r2 = create_request(&pool, a.requester, "medicine", 5, (2.0, 2.0)).await?;
    assert_eq!(engine.discover_matches().await?, 2);

    let m1 = match_id(&pool, r1, resource).await?;
    let m2 = match_id(&pool, r2, resource).await?;

    let (first, second) = tokio::join!(
        engine.confirm_match(m1, a.volunteer, a.admin),
        engine.confirm_match(m2, a.volunteer, a.admin),
    );

    let outcomes = [first, second];
    let succeeded: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    assert_eq!(succeeded.len(), 1);
    assert_eq!(succeeded[0].transferred, 5);
    assert!(outcomes.iter().any(|o| matches!(
        o,
        Err(MatchingError::InsufficientQuantity { available: 0, .. })
    )));

    assert_eq!(resource_quantity(&pool, resource).await?, 0);
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn completion_is_restricted_to_the_assigned_volunteer() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let stranger = create_user(&pool, "volunteer").await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "food", 2, (0.0, 0.0)).await?;
    let resource = create_resource(&pool, a.donor, "food", 2, (0.0, 0.0)).await?;
    engine.discover_matches().await?;
    let confirmation = engine
        .confirm_match(match_id(&pool, request, resource).await?, a.volunteer, a.admin)
        .await?;

    let err = engine
        .complete_assignment(confirmation.assignment_id, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, MatchingError::Forbidden(_)));
    assert_eq!(request_state(&pool, request).await?.1, "assigned");

    let done = engine
        .complete_assignment(confirmation.assignment_id, a.volunteer)
        .await?;
    assert_eq!(done.request_id, request);
    assert_eq!(request_state(&pool, request).await?.1, "fulfilled");

    let err = engine
        .complete_assignment(Uuid::new_v4(), a.volunteer)
        .await
        .unwrap_err();
    assert!(matches!(err, MatchingError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn confirmation_rejects_non_volunteers() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "food", 2, (0.0, 0.0)).await?;
    let resource = create_resource(&pool, a.donor, "food", 2, (0.0, 0.0)).await?;
    engine.discover_matches().await?;
    let m = match_id(&pool, request, resource).await?;

    let err = engine.confirm_match(m, a.donor, a.admin).await.unwrap_err();
    assert!(matches!(err, MatchingError::Validation(_)));
    assert_eq!(resource_quantity(&pool, resource).await?, 2);
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn declined_pairs_are_not_proposed_again() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "water", 1, (0.0, 0.0)).await?;
    let resource = create_resource(&pool, a.donor, "water", 1, (0.0, 0.0)).await?;
    engine.discover_matches().await?;
    let m = match_id(&pool, request, resource).await?;

    engine.decline_match(m).await?;
    assert_eq!(engine.discover_matches().await?, 0);

    let err = engine.decline_match(m).await.unwrap_err();
    assert!(matches!(err, MatchingError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn direct_assignment_conflicts_on_duplicate() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "water", 4, (0.0, 0.0)).await?;
    let input = DirectAssignment {
        request_id: request,
        volunteer_id: a.volunteer,
        quantity: None,
    };

    let assignment = engine.assign_volunteer(&input, a.admin).await?;
    assert_eq!(assignment.quantity_assigned, 4);
    assert_eq!(assignment.match_id, None);

    let err = engine.assign_volunteer(&input, a.admin).await.unwrap_err();
    assert!(matches!(err, MatchingError::Conflict(_)));

    // Direct assignments never move quantity
    assert_eq!(request_state(&pool, request).await?, (4, "pending".to_string()));
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn failed_confirmation_rolls_back_transfer() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    let request = create_request(&pool, a.requester, "water", 5, (0.0, 0.0)).await?;
    let resource = create_resource(&pool, a.donor, "water", 5, (0.0, 0.0)).await?;
    engine.discover_matches().await?;
    let m = match_id(&pool, request, resource).await?;

    // Unknown admin: the assignment insert fails after both decrements ran
    let err = engine
        .confirm_match(m, a.volunteer, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, MatchingError::Database(_)));

    assert_eq!(resource_quantity(&pool, resource).await?, 5);
    assert_eq!(request_state(&pool, request).await?, (5, "pending".to_string()));
    assert_eq!(match_status(&pool, m).await?, "pending");
    assert_eq!(count(&pool, "assignments").await?, 0);

    // The match is still confirmable afterwards
    let confirmation = engine.confirm_match(m, a.volunteer, a.admin).await?;
    assert_eq!(confirmation.transferred, 5);
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn failed_discovery_keeps_no_matches() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    create_request(&pool, a.requester, "water", 1, (0.0, 0.0)).await?;
    create_resource(&pool, a.donor, "water", 1, (0.0, 0.0)).await?;
    let fuel = create_request(&pool, a.requester, "fuel", 1, (0.0, 0.0)).await?;
    create_resource(&pool, a.donor, "fuel", 1, (0.0, 0.0)).await?;

    // The fuel pair is proposed after the water pair has been inserted
    sqlx::query("UPDATE aid_requests SET request_date = NOW() + INTERVAL '1 minute' WHERE id = $1")
        .bind(fuel)
        .execute(&pool)
        .await?;
    sqlx::raw_sql(
        r#"
        CREATE OR REPLACE FUNCTION reject_fuel_match() RETURNS trigger AS $$
        BEGIN
            IF (SELECT aid_type FROM aid_requests WHERE id = NEW.request_id) = 'fuel' THEN
                RAISE EXCEPTION 'fuel matches are rejected';
            END IF;
            RETURN NEW;
        END
        $$ LANGUAGE plpgsql;

        CREATE TRIGGER reject_fuel_matches
            BEFORE INSERT ON matches
            FOR EACH ROW EXECUTE FUNCTION reject_fuel_match();
        "#,
    )
    .execute(&pool)
    .await?;

    let result = engine.discover_matches().await;

    sqlx::raw_sql("DROP TRIGGER reject_fuel_matches ON matches; DROP FUNCTION reject_fuel_match();")
        .execute(&pool)
        .await?;

    assert!(matches!(result, Err(MatchingError::Database(_))));
    assert_eq!(count(&pool, "matches").await?, 0);

    assert_eq!(engine.discover_matches().await?, 2);
    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn deleting_a_request_during_confirmation_does_not_deadlock() -> Result<()> {
    let pool = setup().await?;
    let a = actors(&pool).await?;
    let engine = engine(&pool);

    for _ in 0..10 {
        let request = create_request(&pool, a.requester, "tents", 3, (1.0, 1.0)).await?;
        let resource = create_resource(&pool, a.donor, "tents", 3, (1.0, 1.0)).await?;
        engine.discover_matches().await?;
        let m = match_id(&pool, request, resource).await?;

        let (confirmed, deleted) = tokio::join!(
            engine.confirm_match(m, a.volunteer, a.admin),
            engine.delete_request(request),
        );

        deleted?;
        match confirmed {
            Ok(confirmation) => assert_eq!(confirmation.transferred, 3),
            Err(err) => assert!(matches!(err, MatchingError::NotFound { .. }), "{err}"),
        }

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM aid_requests WHERE id = $1")
            .bind(request)
            .fetch_one(&pool)
            .await?;
        assert_eq!(remaining, 0);
    }

    let err = engine.delete_request(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, MatchingError::NotFound { .. }));
    Ok(())
}

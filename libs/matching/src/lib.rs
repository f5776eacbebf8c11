//! Matching and fulfillment engine for the relief coordination platform
//!
//! The engine discovers candidate (aid request, resource) pairs, confirms
//! them by transferring quantity under row locks, and lets volunteers
//! complete the resulting assignments. All coordination goes through
//! PostgreSQL transactions; the engine keeps no shared in-process state.
//!
//! ```rust,no_run
//! use matching::{MatchingConfig, MatchingEngine};
//!
//! # async fn run(pool: sqlx::PgPool) -> Result<(), matching::MatchingError> {
//! let engine = MatchingEngine::new(pool, MatchingConfig::default());
//! let created = engine.discover_matches().await?;
//! println!("{created} new candidate matches");
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fulfillment;
pub mod geo;
pub mod models;

pub use completion::CompletedAssignment;
pub use config::MatchingConfig;
pub use dispatch::DirectAssignment;
pub use engine::MatchingEngine;
pub use error::{MatchingError, MatchingResult};
pub use fulfillment::Confirmation;

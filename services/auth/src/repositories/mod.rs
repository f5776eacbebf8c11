//! Database repositories

pub mod user;

pub use user::{CreateOutcome, UserRepository};

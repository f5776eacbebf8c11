//! Application state shared across handlers

use matching::MatchingEngine;
use sqlx::PgPool;

use crate::{
    middleware::TokenVerifier,
    repositories::{
        AidRequestRepository, AssignmentRepository, MatchRepository, ResourceRepository,
        UserRepository,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: MatchingEngine,
    pub token_verifier: TokenVerifier,
    pub user_repository: UserRepository,
    pub aid_request_repository: AidRequestRepository,
    pub resource_repository: ResourceRepository,
    pub match_repository: MatchRepository,
    pub assignment_repository: AssignmentRepository,
}

impl AppState {
    pub fn new(pool: PgPool, engine: MatchingEngine, token_verifier: TokenVerifier) -> Self {
        Self {
            engine,
            token_verifier,
            user_repository: UserRepository::new(pool.clone()),
            aid_request_repository: AidRequestRepository::new(pool.clone()),
            resource_repository: ResourceRepository::new(pool.clone()),
            match_repository: MatchRepository::new(pool.clone()),
            assignment_repository: AssignmentRepository::new(pool),
        }
    }
}

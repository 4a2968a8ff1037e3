use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Brief, MatchResult, NewMatchResult, Venue};

/// Errors that can occur when reading or writing match data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness constraint rejected the write: the brief already has a match set
    #[error("Match set already exists for brief {0}")]
    Conflict(i64),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

/// Read access to the venue catalog
#[async_trait]
pub trait VenueCatalog: Send + Sync {
    /// All venues whose verification status is "verified", in catalog order
    async fn list_verified_venues(&self) -> Result<Vec<Venue>, StoreError>;

    async fn get_venue(&self, venue_id: i64) -> Result<Option<Venue>, StoreError>;
}

/// Read access to event briefs
#[async_trait]
pub trait BriefSource: Send + Sync {
    async fn get_brief(&self, brief_id: i64) -> Result<Option<Brief>, StoreError>;
}

/// Persistence for ranked match sets
///
/// A match set is written once per brief. `insert_results` is atomic over the
/// whole list and must fail with [`StoreError::Conflict`] when a set already
/// exists for the brief, so concurrent writers cannot both commit.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn count_results(&self, brief_id: i64) -> Result<usize, StoreError>;

    /// Whether a generation run has completed for the brief, even with zero results
    async fn is_generated(&self, brief_id: i64) -> Result<bool, StoreError>;

    async fn insert_results(
        &self,
        brief_id: i64,
        run_id: Uuid,
        results: &[NewMatchResult],
    ) -> Result<(), StoreError>;

    /// Results for a brief ordered by rank ascending
    async fn list_results(&self, brief_id: i64) -> Result<Vec<MatchResult>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Brief, MatchResult, MatchRun, NewMatchResult, Venue};
use crate::services::store::{BriefSource, ResultStore, StoreError, VenueCatalog};

struct StoredSet {
    run: MatchRun,
    results: Vec<MatchResult>,
}

/// In-process store implementing every storage collaborator
///
/// Enforces the same constraints as the PostgreSQL schema: one match set per
/// brief, unique rank and unique venue within a set. Used by tests and for
/// running the service without a database.
pub struct MemoryStore {
    venues: RwLock<Vec<Venue>>,
    briefs: RwLock<HashMap<i64, Brief>>,
    sets: RwLock<HashMap<i64, StoredSet>>,
    next_result_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            venues: RwLock::new(Vec::new()),
            briefs: RwLock::new(HashMap::new()),
            sets: RwLock::new(HashMap::new()),
            next_result_id: AtomicI64::new(1),
        }
    }

    pub fn with_data(venues: Vec<Venue>, briefs: Vec<Brief>) -> Self {
        Self {
            venues: RwLock::new(venues),
            briefs: RwLock::new(briefs.into_iter().map(|b| (b.id, b)).collect()),
            sets: RwLock::new(HashMap::new()),
            next_result_id: AtomicI64::new(1),
        }
    }

    pub async fn add_venue(&self, venue: Venue) {
        self.venues.write().await.push(venue);
    }

    /// Completed run marker for a brief, if any
    pub async fn run_for(&self, brief_id: i64) -> Option<MatchRun> {
        self.sets.read().await.get(&brief_id).map(|set| set.run.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VenueCatalog for MemoryStore {
    async fn list_verified_venues(&self) -> Result<Vec<Venue>, StoreError> {
        Ok(self
            .venues
            .read()
            .await
            .iter()
            .filter(|v| v.verified())
            .cloned()
            .collect())
    }

    async fn get_venue(&self, venue_id: i64) -> Result<Option<Venue>, StoreError> {
        Ok(self.venues.read().await.iter().find(|v| v.id == venue_id).cloned())
    }
}

#[async_trait]
impl BriefSource for MemoryStore {
    async fn get_brief(&self, brief_id: i64) -> Result<Option<Brief>, StoreError> {
        Ok(self.briefs.read().await.get(&brief_id).cloned())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn count_results(&self, brief_id: i64) -> Result<usize, StoreError> {
        Ok(self
            .sets
            .read()
            .await
            .get(&brief_id)
            .map(|set| set.results.len())
            .unwrap_or(0))
    }

    async fn is_generated(&self, brief_id: i64) -> Result<bool, StoreError> {
        Ok(self.sets.read().await.contains_key(&brief_id))
    }

    async fn insert_results(
        &self,
        brief_id: i64,
        run_id: Uuid,
        results: &[NewMatchResult],
    ) -> Result<(), StoreError> {
        let mut sets = self.sets.write().await;

        if sets.contains_key(&brief_id) {
            return Err(StoreError::Conflict(brief_id));
        }

        let mut ranks = HashSet::new();
        let mut venues = HashSet::new();
        for result in results {
            if !ranks.insert(result.rank) || !venues.insert(result.venue_id) {
                return Err(StoreError::Conflict(brief_id));
            }
        }

        let created_at = chrono::Utc::now();
        let stored: Vec<MatchResult> = results
            .iter()
            .map(|r| MatchResult {
                id: self.next_result_id.fetch_add(1, Ordering::Relaxed),
                brief_id,
                venue_id: r.venue_id,
                score: r.score,
                explanation: r.explanation.clone(),
                rank: r.rank,
                created_at,
            })
            .collect();

        sets.insert(
            brief_id,
            StoredSet {
                run: MatchRun {
                    brief_id,
                    run_id,
                    result_count: stored.len(),
                    completed_at: created_at,
                },
                results: stored,
            },
        );

        Ok(())
    }

    async fn list_results(&self, brief_id: i64) -> Result<Vec<MatchResult>, StoreError> {
        let mut results = self
            .sets
            .read()
            .await
            .get(&brief_id)
            .map(|set| set.results.clone())
            .unwrap_or_default();
        results.sort_by_key(|r| r.rank);
        Ok(results)
    }
}

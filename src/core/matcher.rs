use crate::core::{filters::is_eligible, scoring::score_venue};
use crate::models::{Brief, ScoredVenue, ScoringWeights, Venue};
use crate::services::{StoreError, VenueCatalog};

/// Result of the matching process
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<ScoredVenue>,
    pub total_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility (verified venues only)
/// 2. Scoring of every eligible venue
/// 3. Drop venues scoring exactly zero
/// 4. Stable sort by score, descending, and truncate
///
/// Holds no mutable state; safe to call concurrently.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Load the verified catalog and rank it against a brief
    pub async fn find_matches(
        &self,
        catalog: &dyn VenueCatalog,
        brief: &Brief,
        limit: usize,
    ) -> Result<MatchOutcome, StoreError> {
        let venues = catalog.list_verified_venues().await?;
        Ok(self.rank(brief, venues, limit))
    }

    /// Score and rank candidate venues for a brief
    ///
    /// # Arguments
    /// * `brief` - The host's event requirements
    /// * `candidates` - Venues in catalog order
    /// * `limit` - Maximum number of matches to return
    ///
    /// # Returns
    /// MatchOutcome with matches ordered by descending score. Equal scores keep
    /// catalog order.
    pub fn rank(&self, brief: &Brief, candidates: Vec<Venue>, limit: usize) -> MatchOutcome {
        let total_candidates = candidates.len();

        let mut scored: Vec<ScoredVenue> = candidates
            .into_iter()
            .filter(is_eligible)
            .filter_map(|venue| {
                let (score, breakdown) = score_venue(&venue, brief, &self.weights);

                if score > 0.0 {
                    Some(ScoredVenue {
                        venue,
                        score,
                        breakdown,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Vec::sort_by is stable, so ties keep catalog order
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored.truncate(limit);

        MatchOutcome {
            matches: scored,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

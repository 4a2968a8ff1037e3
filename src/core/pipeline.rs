use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::{explainer::fallback_explanation, Explainer, Matcher};
use crate::models::{Brief, MatchSetStatus, NewMatchResult};
use crate::services::{ResultStore, StoreError, VenueCatalog};

/// Errors that abort a generation run. Nothing is committed when one occurs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a generation trigger. Both variants are successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// This run produced and committed the match set
    Generated { run_id: Uuid, count: usize },
    /// A match set already existed, or a concurrent run committed first
    AlreadyGenerated { count: usize },
}

impl GenerationOutcome {
    pub fn count(&self) -> usize {
        match self {
            GenerationOutcome::Generated { count, .. } => *count,
            GenerationOutcome::AlreadyGenerated { count } => *count,
        }
    }
}

/// Match-generation workflow for a brief
///
/// NoResults -> Generating -> Complete. The run is gated by an existence check
/// and committed in one atomic write; the storage layer's uniqueness
/// constraint settles races between concurrent triggers.
pub struct MatchPipeline {
    matcher: Matcher,
    explainer: Arc<Explainer>,
    catalog: Arc<dyn VenueCatalog>,
    results: Arc<dyn ResultStore>,
    limit: usize,
}

impl MatchPipeline {
    pub fn new(
        matcher: Matcher,
        explainer: Explainer,
        catalog: Arc<dyn VenueCatalog>,
        results: Arc<dyn ResultStore>,
        limit: usize,
    ) -> Self {
        Self {
            matcher,
            explainer: Arc::new(explainer),
            catalog,
            results,
            limit,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Size of the brief's existing match set, if it has one
    ///
    /// A set exists once a run marker is committed or any result row is
    /// stored, including rows written without a marker.
    pub async fn existing_count(&self, brief_id: i64) -> Result<Option<usize>, StoreError> {
        let count = self.results.count_results(brief_id).await?;
        if count > 0 || self.results.is_generated(brief_id).await? {
            Ok(Some(count))
        } else {
            Ok(None)
        }
    }

    /// Current state of the brief's match set
    pub async fn status(&self, brief_id: i64) -> Result<MatchSetStatus, StoreError> {
        match self.existing_count(brief_id).await? {
            Some(_) => Ok(MatchSetStatus::Complete),
            None => Ok(MatchSetStatus::NoResults),
        }
    }

    /// Run generation for a brief, at most once
    pub async fn generate(&self, brief: &Brief) -> Result<GenerationOutcome, PipelineError> {
        if let Some(count) = self.existing_count(brief.id).await? {
            tracing::info!(
                "Matches already exist for brief {} ({} results), skipping generation",
                brief.id,
                count
            );
            return Ok(GenerationOutcome::AlreadyGenerated { count });
        }

        let run_id = Uuid::new_v4();
        tracing::info!("Generating matches for brief {} (run {})", brief.id, run_id);

        let outcome = self
            .matcher
            .find_matches(self.catalog.as_ref(), brief, self.limit)
            .await?;

        tracing::debug!(
            "Run {}: {} of {} verified venues matched brief {}",
            run_id,
            outcome.matches.len(),
            outcome.total_candidates,
            brief.id
        );

        let mut results = Vec::with_capacity(outcome.matches.len());
        for (index, scored) in outcome.matches.into_iter().enumerate() {
            let explanation = self.explain_isolated(brief, &scored).await;

            results.push(NewMatchResult {
                venue_id: scored.venue.id,
                score: scored.score,
                explanation,
                rank: index as u32 + 1,
            });
        }

        match self.results.insert_results(brief.id, run_id, &results).await {
            Ok(()) => {
                tracing::info!(
                    "Generated {} matches for brief {} (run {})",
                    results.len(),
                    brief.id,
                    run_id
                );
                Ok(GenerationOutcome::Generated {
                    run_id,
                    count: results.len(),
                })
            }
            Err(StoreError::Conflict(_)) => {
                let count = self.results.count_results(brief.id).await?;
                tracing::info!(
                    "Run {} lost the race for brief {}; {} matches already committed",
                    run_id,
                    brief.id,
                    count
                );
                Ok(GenerationOutcome::AlreadyGenerated { count })
            }
            Err(e) => {
                tracing::error!("Run {} for brief {} rolled back: {}", run_id, brief.id, e);
                Err(e.into())
            }
        }
    }

    /// Explain one result on its own task so a panic cannot abort the batch
    async fn explain_isolated(&self, brief: &Brief, scored: &crate::models::ScoredVenue) -> String {
        let explainer = Arc::clone(&self.explainer);
        let venue = scored.venue.clone();
        let owned_brief = brief.clone();
        let score = scored.score;
        let breakdown = scored.breakdown.clone();

        let handle = tokio::spawn(async move {
            explainer.explain(&venue, &owned_brief, score, &breakdown).await
        });

        match handle.await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    "Explainer failed for venue {} on brief {}: {}",
                    scored.venue.id,
                    brief.id,
                    e
                );
                fallback_explanation(&scored.venue, brief, scored.score, &scored.breakdown)
            }
        }
    }

    /// Fire-and-forget generation off the request path
    pub fn spawn(self: &Arc<Self>, brief: Brief) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);

        tokio::spawn(async move {
            if let Err(e) = pipeline.generate(&brief).await {
                tracing::error!("Error generating matches for brief {}: {}", brief.id, e);
            }
        })
    }
}

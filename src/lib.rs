//! Venue Match - ranked, explained venue shortlists for event briefs
//!
//! This library provides the rules-based scorer, the matcher that ranks the
//! verified venue catalog against a brief, the explainer that turns a score
//! breakdown into bullet points, and the pipeline that persists each brief's
//! ranked match set exactly once.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{score_venue, Explainer, GenerationOutcome, MatchPipeline, Matcher};
pub use models::{Brief, MatchResult, ScoreBreakdown, ScoredVenue, ScoringWeights, Venue};

// Core algorithm exports
pub mod explainer;
pub mod filters;
pub mod location;
pub mod matcher;
pub mod pipeline;
pub mod scoring;

pub use explainer::{build_prompt, fallback_explanation, Explainer};
pub use filters::is_eligible;
pub use location::{are_adjacent, neighborhood_matches};
pub use matcher::{MatchOutcome, Matcher};
pub use pipeline::{GenerationOutcome, MatchPipeline, PipelineError};
pub use scoring::score_venue;

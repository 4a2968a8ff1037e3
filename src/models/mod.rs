// Model exports
pub mod breakdown;
pub mod domain;
pub mod requests;
pub mod responses;

pub use breakdown::{AmenitiesScore, AvailabilityScore, CapacityScore, LocationScore, PriceScore, ScoreBreakdown, ScoredVenue};
pub use domain::{AlcoholLevel, AvNeeds, Borough, Brief, EventType, FoodBevLevel, MatchResult, MatchRun, NewMatchResult, ScoringWeights, Venue, VerificationStatus};
pub use requests::PreviewMatchesQuery;
pub use responses::{ErrorResponse, GenerateMatchesResponse, HealthResponse, MatchListResponse, MatchSetStatus, PreviewMatchesResponse, RankedMatch, VenueSummary};

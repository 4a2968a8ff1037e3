use serde::{Deserialize, Serialize};
use crate::models::breakdown::ScoredVenue;
use crate::models::domain::{Borough, MatchResult, Venue};

/// Venue fields shown alongside a ranked match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub borough: Borough,
    pub neighborhood: Option<String>,
    pub address: String,
    pub capacity_min: u32,
    pub capacity_max: u32,
    pub base_price: Option<f64>,
    pub min_spend: Option<f64>,
}

impl From<&Venue> for VenueSummary {
    fn from(venue: &Venue) -> Self {
        Self {
            id: venue.id,
            name: venue.name.clone(),
            description: venue.description.clone(),
            borough: venue.borough,
            neighborhood: venue.neighborhood.clone(),
            address: venue.address.clone(),
            capacity_min: venue.capacity_min,
            capacity_max: venue.capacity_max,
            base_price: venue.base_price,
            min_spend: venue.min_spend,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatch {
    pub match_id: i64,
    pub rank: u32,
    pub score: f64,
    pub explanation: String,
    pub venue: VenueSummary,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RankedMatch {
    pub fn new(result: &MatchResult, venue: &Venue) -> Self {
        Self {
            match_id: result.id,
            rank: result.rank,
            score: result.score,
            explanation: result.explanation.clone(),
            venue: VenueSummary::from(venue),
            created_at: result.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSetStatus {
    NoResults,
    Complete,
}

/// Response for the ranked match list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub brief_id: i64,
    pub status: MatchSetStatus,
    pub match_count: usize,
    pub matches: Vec<RankedMatch>,
}

/// Response for the generate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateMatchesResponse {
    pub message: String,
    pub brief_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
}

/// Response for the preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewMatchesResponse {
    pub brief_id: i64,
    pub total_candidates: usize,
    pub matches: Vec<ScoredVenue>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

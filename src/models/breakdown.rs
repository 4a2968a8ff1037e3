use serde::{Deserialize, Serialize};

use crate::models::domain::{AlcoholLevel, AvNeeds, Borough, FoodBevLevel, Venue};

/// Capacity sub-score and the inputs it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityScore {
    pub score: f64,
    pub weight: f64,
    pub venue_min: u32,
    pub venue_max: u32,
    pub headcount: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScore {
    pub score: f64,
    pub weight: f64,
    pub venue_base: Option<f64>,
    pub venue_min_spend: Option<f64>,
    pub budget_min: Option<f64>,
    pub budget_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationScore {
    pub score: f64,
    pub weight: f64,
    pub venue_borough: Borough,
    pub venue_neighborhood: Option<String>,
    pub preferred_borough: Option<Borough>,
    pub preferred_neighborhood: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenitiesScore {
    pub score: f64,
    pub weight: f64,
    pub food_bev: FoodBevLevel,
    pub alcohol: AlcoholLevel,
    pub av: AvNeeds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityScore {
    pub score: f64,
    pub weight: f64,
    pub note: String,
}

/// Per-category scoring breakdown for one venue against one brief.
///
/// The total score is always the sum of the five sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub capacity: CapacityScore,
    pub price: PriceScore,
    pub location: LocationScore,
    pub amenities: AmenitiesScore,
    pub availability: AvailabilityScore,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.capacity.score
            + self.price.score
            + self.location.score
            + self.amenities.score
            + self.availability.score
    }

    /// (name, sub-score, weight) triples in a fixed order
    pub fn categories(&self) -> [(&'static str, f64, f64); 5] {
        [
            ("capacity", self.capacity.score, self.capacity.weight),
            ("price", self.price.score, self.price.weight),
            ("location", self.location.score, self.location.weight),
            ("amenities", self.amenities.score, self.amenities.weight),
            ("availability", self.availability.score, self.availability.weight),
        ]
    }
}

/// A venue that survived matching, with its score and breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredVenue {
    pub venue: Venue,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

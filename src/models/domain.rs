use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// New York City boroughs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Borough {
    Manhattan,
    Brooklyn,
    Queens,
    Bronx,
    StatenIsland,
}

impl fmt::Display for Borough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Borough::Manhattan => "Manhattan",
            Borough::Brooklyn => "Brooklyn",
            Borough::Queens => "Queens",
            Borough::Bronx => "Bronx",
            Borough::StatenIsland => "Staten Island",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Corporate,
    Wedding,
    Birthday,
    Anniversary,
    Networking,
    Conference,
    Other,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Corporate => "Corporate",
            EventType::Wedding => "Wedding",
            EventType::Birthday => "Birthday",
            EventType::Anniversary => "Anniversary",
            EventType::Networking => "Networking",
            EventType::Conference => "Conference",
            EventType::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Food and beverage service level requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodBevLevel {
    #[default]
    None,
    LightBites,
    FullCatering,
}

impl fmt::Display for FoodBevLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FoodBevLevel::None => "None",
            FoodBevLevel::LightBites => "Light Bites",
            FoodBevLevel::FullCatering => "Full Catering",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholLevel {
    #[default]
    None,
    BeerWine,
    FullBar,
}

impl fmt::Display for AlcoholLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlcoholLevel::None => "None",
            AlcoholLevel::BeerWine => "Beer Wine",
            AlcoholLevel::FullBar => "Full Bar",
        };
        f.write_str(name)
    }
}

/// Audio/visual requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvNeeds {
    #[default]
    None,
    BasicMic,
    FullSetup,
}

impl fmt::Display for AvNeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AvNeeds::None => "None",
            AvNeeds::BasicMic => "Basic Mic",
            AvNeeds::FullSetup => "Full Setup",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// Event brief submitted by a host. Read-only to the matching core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brief {
    pub id: i64,
    pub event_type: EventType,
    pub headcount: u32,
    pub date_preferred: NaiveDate,
    #[serde(default)]
    pub date_flexible: bool,
    #[serde(default)]
    pub borough_pref: Option<Borough>,
    #[serde(default)]
    pub neighborhood_pref: Option<String>,
    #[serde(default)]
    pub budget_min: Option<f64>,
    pub budget_max: f64,
    #[serde(default)]
    pub food_bev_level: FoodBevLevel,
    #[serde(default)]
    pub alcohol_level: AlcoholLevel,
    #[serde(default)]
    pub av_needs: AvNeeds,
}

impl Brief {
    /// Spend floor, treating a zero minimum as "no floor"
    pub fn spend_floor(&self) -> Option<f64> {
        self.budget_min.filter(|min| *min > 0.0)
    }
}

/// Bookable venue. Read-only to the matching core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub borough: Borough,
    #[serde(default)]
    pub neighborhood: Option<String>,
    pub address: String,
    pub capacity_min: u32,
    pub capacity_max: u32,
    #[serde(default)]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub min_spend: Option<f64>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
}

impl Venue {
    pub fn verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    /// The binding cost constraint: the higher of base price and minimum spend.
    /// Zero or missing values count as unknown; `None` when neither is known.
    pub fn estimated_cost(&self) -> Option<f64> {
        let base = self.base_price.filter(|p| *p > 0.0);
        let spend = self.min_spend.filter(|s| *s > 0.0);
        match (base, spend) {
            (None, None) => None,
            (base, spend) => Some(base.unwrap_or(0.0).max(spend.unwrap_or(0.0))),
        }
    }
}

/// Persisted match result for a brief-venue pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: i64,
    pub brief_id: i64,
    pub venue_id: i64,
    pub score: f64,
    pub explanation: String,
    pub rank: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Match result ready to be committed as part of a ranked set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMatchResult {
    pub venue_id: i64,
    pub score: f64,
    pub explanation: String,
    pub rank: u32,
}

/// Marker recording that a generation run completed for a brief
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRun {
    pub brief_id: i64,
    pub run_id: Uuid,
    pub result_count: usize,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Scoring weights, in points. They must total 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub capacity: f64,
    pub price: f64,
    pub location: f64,
    pub amenities: f64,
    pub availability: f64,
}

impl ScoringWeights {
    pub const TOTAL: f64 = 100.0;

    pub fn total(&self) -> f64 {
        self.capacity + self.price + self.location + self.amenities + self.availability
    }

    pub fn is_valid(&self) -> bool {
        let all_non_negative = [
            self.capacity,
            self.price,
            self.location,
            self.amenities,
            self.availability,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0);

        all_non_negative && (self.total() - Self::TOTAL).abs() < 1e-9
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            capacity: 30.0,
            price: 25.0,
            location: 20.0,
            amenities: 15.0,
            availability: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(base_price: Option<f64>, min_spend: Option<f64>) -> Venue {
        Venue {
            id: 1,
            name: "Loft".to_string(),
            description: None,
            borough: Borough::Brooklyn,
            neighborhood: None,
            address: "1 Main St".to_string(),
            capacity_min: 10,
            capacity_max: 50,
            base_price,
            min_spend,
            verification_status: VerificationStatus::Verified,
        }
    }

    #[test]
    fn test_default_weights_total_100() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.total(), 100.0);
        assert!(weights.is_valid());
    }

    #[test]
    fn test_invalid_weights() {
        let weights = ScoringWeights {
            capacity: 40.0,
            ..ScoringWeights::default()
        };
        assert!(!weights.is_valid());
    }

    #[test]
    fn test_estimated_cost_takes_higher_value() {
        assert_eq!(venue(Some(4000.0), Some(6000.0)).estimated_cost(), Some(6000.0));
        assert_eq!(venue(Some(4000.0), None).estimated_cost(), Some(4000.0));
        assert_eq!(venue(None, Some(2500.0)).estimated_cost(), Some(2500.0));
        assert_eq!(venue(None, None).estimated_cost(), None);
        assert_eq!(venue(Some(0.0), Some(0.0)).estimated_cost(), None);
    }

    #[test]
    fn test_borough_serde_and_display() {
        let borough: Borough = serde_json::from_str("\"staten_island\"").unwrap();
        assert_eq!(borough, Borough::StatenIsland);
        assert_eq!(borough.to_string(), "Staten Island");
    }
}

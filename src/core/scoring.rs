use crate::core::location::{are_adjacent, neighborhood_matches};
use crate::models::{
    AlcoholLevel, AmenitiesScore, AvNeeds, AvailabilityScore, Brief, CapacityScore, FoodBevLevel,
    LocationScore, PriceScore, ScoreBreakdown, ScoringWeights, Venue,
};

const AVAILABILITY_NOTE: &str = "Calendar sync not implemented; availability is assumed";

/// Calculate a match score (0-100) and its breakdown for a venue against a brief
///
/// Scoring formula (default weights):
/// score = (
///     capacity      (30)   # headcount inside the venue's range
///     price         (25)   # binding venue cost against the budget
///     location      (20)   # borough, adjacency and neighborhood
///     amenities     (15)   # difficulty of the requested service levels
///     availability  (10)   # fixed, no calendar check
/// )
///
/// Every sub-score is computed even when another one is zero, so callers
/// always get the full breakdown.
pub fn score_venue(venue: &Venue, brief: &Brief, weights: &ScoringWeights) -> (f64, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        capacity: CapacityScore {
            score: calculate_capacity_score(venue, brief.headcount, weights.capacity),
            weight: weights.capacity,
            venue_min: venue.capacity_min,
            venue_max: venue.capacity_max,
            headcount: brief.headcount,
        },
        price: PriceScore {
            score: calculate_price_score(venue, brief, weights.price),
            weight: weights.price,
            venue_base: venue.base_price,
            venue_min_spend: venue.min_spend,
            budget_min: brief.budget_min,
            budget_max: brief.budget_max,
        },
        location: LocationScore {
            score: calculate_location_score(venue, brief, weights.location),
            weight: weights.location,
            venue_borough: venue.borough,
            venue_neighborhood: venue.neighborhood.clone(),
            preferred_borough: brief.borough_pref,
            preferred_neighborhood: brief.neighborhood_pref.clone(),
        },
        amenities: AmenitiesScore {
            score: calculate_amenities_score(brief, weights.amenities),
            weight: weights.amenities,
            food_bev: brief.food_bev_level,
            alcohol: brief.alcohol_level,
            av: brief.av_needs,
        },
        availability: AvailabilityScore {
            score: weights.availability,
            weight: weights.availability,
            note: AVAILABILITY_NOTE.to_string(),
        },
    };

    (breakdown.total(), breakdown)
}

/// Percentage of a weight, computed as `weight * pct / 100`
#[inline]
fn share(weight: f64, pct: f64) -> f64 {
    weight * pct / 100.0
}

/// Capacity score
/// In range = full weight. A venue that is too small is a near-reject:
/// within 20% over capacity = 70%, otherwise 0. A venue that is too large
/// is always usable: within 20% under the minimum = 70%, otherwise 50%.
#[inline]
fn calculate_capacity_score(venue: &Venue, headcount: u32, weight: f64) -> f64 {
    let guests = headcount as f64;
    let min = venue.capacity_min as f64;
    let max = venue.capacity_max as f64;

    if venue.capacity_min <= headcount && headcount <= venue.capacity_max {
        return weight;
    }

    if headcount > venue.capacity_max {
        if guests <= max * 1.2 {
            return share(weight, 70.0);
        }
        return 0.0;
    }

    if guests >= min * 0.8 {
        share(weight, 70.0)
    } else {
        share(weight, 50.0)
    }
}

/// Price score
/// Unknown pricing is neutral (50%). Within budget = full weight, or 70% when
/// the cost falls under the host's spend floor. Up to 10% over budget = 60%.
#[inline]
fn calculate_price_score(venue: &Venue, brief: &Brief, weight: f64) -> f64 {
    let cost = match venue.estimated_cost() {
        Some(cost) => cost,
        None => return share(weight, 50.0),
    };

    if cost <= brief.budget_max {
        return match brief.spend_floor() {
            Some(floor) if cost < floor => share(weight, 70.0),
            _ => weight,
        };
    }

    if cost <= brief.budget_max * 1.1 {
        return share(weight, 60.0);
    }

    0.0
}

/// Location score
/// No preference = full weight. Same borough = full weight, 90% when the
/// neighborhood preference misses. Adjacent borough = 50%, any other = 30%.
#[inline]
fn calculate_location_score(venue: &Venue, brief: &Brief, weight: f64) -> f64 {
    let preferred = match brief.borough_pref {
        Some(borough) => borough,
        None => return weight,
    };

    if venue.borough == preferred {
        return match (brief.neighborhood_pref.as_deref(), venue.neighborhood.as_deref()) {
            (Some(wanted), Some(actual)) if !neighborhood_matches(wanted, actual) => {
                share(weight, 90.0)
            }
            _ => weight,
        };
    }

    if are_adjacent(venue.borough, preferred) {
        share(weight, 50.0)
    } else {
        share(weight, 30.0)
    }
}

/// Amenities score
/// Each requirement contributes about a third of the weight; harder
/// requirements contribute less because no venue capability data is consulted.
#[inline]
fn calculate_amenities_score(brief: &Brief, weight: f64) -> f64 {
    let food = match brief.food_bev_level {
        FoodBevLevel::None => 33.0,
        FoodBevLevel::LightBites => 25.0,
        FoodBevLevel::FullCatering => 20.0,
    };
    let alcohol = match brief.alcohol_level {
        AlcoholLevel::None => 33.0,
        AlcoholLevel::BeerWine => 25.0,
        AlcoholLevel::FullBar => 20.0,
    };
    let av = match brief.av_needs {
        AvNeeds::None => 34.0,
        AvNeeds::BasicMic => 25.0,
        AvNeeds::FullSetup => 20.0,
    };

    (share(weight, food) + share(weight, alcohol) + share(weight, av)).min(weight)
}

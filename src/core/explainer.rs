use std::sync::Arc;
use std::time::Duration;

use crate::models::{Brief, ScoreBreakdown, Venue};
use crate::services::TextGenerator;

/// Produces human-readable explanations for why a venue matches a brief
///
/// The primary path asks an external text-generation service for markdown
/// bullets. Any failure on that path (no service configured, transport error,
/// timeout, empty reply) falls back to a deterministic template built from the
/// same breakdown. `explain` never fails.
#[derive(Clone)]
pub struct Explainer {
    service: Option<TextService>,
}

/// Generator and the deadline applied to each call
#[derive(Clone)]
struct TextService {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Explainer {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            service: Some(TextService { generator, timeout }),
        }
    }

    /// Explainer that always uses the deterministic template
    pub fn fallback_only() -> Self {
        Self { service: None }
    }

    /// Explain a scored match
    pub async fn explain(
        &self,
        venue: &Venue,
        brief: &Brief,
        score: f64,
        breakdown: &ScoreBreakdown,
    ) -> String {
        let prompt = build_prompt(venue, brief, score, breakdown);

        match self.try_generate(&prompt).await {
            Some(text) => text,
            None => fallback_explanation(venue, brief, score, breakdown),
        }
    }

    /// The single failure boundary around the external service
    async fn try_generate(&self, prompt: &str) -> Option<String> {
        let service = self.service.as_ref()?;

        match tokio::time::timeout(service.timeout, service.generator.generate(prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
            Ok(Ok(_)) => {
                tracing::warn!("Explanation service returned empty text, using fallback");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("Explanation service failed, using fallback: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Explanation service timed out after {:?}, using fallback",
                    service.timeout
                );
                None
            }
        }
    }
}

fn money(amount: f64) -> String {
    format!("${:.0}", amount)
}

/// Build the prompt sent to the text-generation service
pub fn build_prompt(venue: &Venue, brief: &Brief, score: f64, breakdown: &ScoreBreakdown) -> String {
    let event_type = brief.event_type.to_string();
    let venue_borough = venue.borough.to_string();
    let pref_borough = brief
        .borough_pref
        .map(|b| b.to_string())
        .unwrap_or_else(|| "Any".to_string());
    let date = if brief.date_flexible {
        format!("{} (flexible)", brief.date_preferred)
    } else {
        brief.date_preferred.to_string()
    };
    let base_price = venue
        .base_price
        .map(money)
        .unwrap_or_else(|| "Contact for pricing".to_string());
    let min_spend = venue.min_spend.map(money).unwrap_or_else(|| "N/A".to_string());

    let scoring = breakdown
        .categories()
        .iter()
        .map(|(name, score, weight)| {
            format!("- {} Match: {:.1}/{:.0} points", title_case(name), score, weight)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a venue matching expert. Generate a concise explanation (3-5 bullet points) for why this venue is a good match for this event.

EVENT DETAILS:
- Type: {event_type}
- Guest Count: {headcount} people
- Date: {date}
- Location Preference: {pref_borough}
- Budget: {budget_min} - {budget_max}
- Food/Beverage: {food_bev}
- Alcohol: {alcohol}
- AV Needs: {av}

VENUE DETAILS:
- Name: {venue_name}
- Location: {venue_borough}, {neighborhood}
- Capacity: {capacity_min}-{capacity_max} people
- Base Price: {base_price}
- Minimum Spend: {min_spend}

MATCH SCORE: {score:.1}/100

SCORING BREAKDOWN:
{scoring}

Generate 3-5 bullet points explaining why this venue is a good match. Focus on:
1. The strongest match aspects (highest scoring categories)
2. Specific details that make it suitable for this event type
3. Any standout features or advantages

Format as markdown bullet points. Keep each point concise (one sentence). Be enthusiastic but honest.

Example format:
- Perfect capacity for your {headcount}-person {event_lower}
- Excellent location in {venue_borough}, matching your preference
- Within your budget with transparent pricing

DO NOT include a heading or title. Start directly with the bullet points."#,
        headcount = brief.headcount,
        budget_min = money(brief.budget_min.unwrap_or(0.0)),
        budget_max = money(brief.budget_max),
        food_bev = brief.food_bev_level,
        alcohol = brief.alcohol_level,
        av = brief.av_needs,
        venue_name = venue.name,
        neighborhood = venue.neighborhood.as_deref().unwrap_or("NYC"),
        capacity_min = venue.capacity_min,
        capacity_max = venue.capacity_max,
        event_lower = event_type.to_lowercase(),
    )
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Deterministic explanation built from the score breakdown
///
/// One bullet per category scoring above its threshold share of the weight
/// (capacity 20/30, location 15/20, price 15/25, amenities 10/15), then an
/// overall bullet at 80+ or 60+. Order is fixed: capacity, location, price,
/// amenities, overall.
pub fn fallback_explanation(
    venue: &Venue,
    brief: &Brief,
    score: f64,
    breakdown: &ScoreBreakdown,
) -> String {
    let mut bullets = Vec::new();

    let capacity = &breakdown.capacity;
    if capacity.score > capacity.weight * 20.0 / 30.0 {
        bullets.push(format!(
            "- Comfortably accommodates your {} guests (capacity: {}-{})",
            brief.headcount, venue.capacity_min, venue.capacity_max
        ));
    }

    let location = &breakdown.location;
    if location.score > location.weight * 15.0 / 20.0 {
        bullets.push(format!("- Great location in {}", venue.borough));
    }

    let price = &breakdown.price;
    if price.score > price.weight * 15.0 / 25.0 {
        bullets.push(format!("- Within your budget of {}", money(brief.budget_max)));
    }

    let amenities = &breakdown.amenities;
    if amenities.score > amenities.weight * 10.0 / 15.0 {
        bullets.push("- Has the amenities you need for your event".to_string());
    }

    if score >= 80.0 {
        bullets.push("- Excellent overall match for your requirements".to_string());
    } else if score >= 60.0 {
        bullets.push("- Strong match for your event needs".to_string());
    }

    if bullets.is_empty() {
        "- Matches your event requirements".to_string()
    } else {
        bullets.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::score_venue;
    use crate::models::{
        AlcoholLevel, AvNeeds, Borough, EventType, FoodBevLevel, ScoringWeights, VerificationStatus,
    };
    use crate::services::TextGenError;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FixedGenerator(Result<String, ()>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, TextGenError> {
            self.0
                .clone()
                .map_err(|_| TextGenError::InvalidResponse("boom".into()))
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, TextGenError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("- too late".to_string())
        }
    }

    fn create_venue() -> Venue {
        Venue {
            id: 1,
            name: "The Foundry".to_string(),
            description: None,
            borough: Borough::StatenIsland,
            neighborhood: None,
            address: "1 Bay St".to_string(),
            capacity_min: 50,
            capacity_max: 100,
            base_price: Some(4000.0),
            min_spend: None,
            verification_status: VerificationStatus::Verified,
        }
    }

    fn create_brief() -> Brief {
        Brief {
            id: 1,
            event_type: EventType::Wedding,
            headcount: 80,
            date_preferred: NaiveDate::from_ymd_opt(2026, 5, 30).unwrap(),
            date_flexible: false,
            borough_pref: None,
            neighborhood_pref: None,
            budget_min: None,
            budget_max: 5000.0,
            food_bev_level: FoodBevLevel::FullCatering,
            alcohol_level: AlcoholLevel::FullBar,
            av_needs: AvNeeds::BasicMic,
        }
    }

    fn scored() -> (Venue, Brief, f64, ScoreBreakdown) {
        let venue = create_venue();
        let brief = create_brief();
        let (score, breakdown) = score_venue(&venue, &brief, &ScoringWeights::default());
        (venue, brief, score, breakdown)
    }

    #[test]
    fn test_fallback_two_category_bullets() {
        let (venue, brief, _, mut breakdown) = scored();
        breakdown.capacity.score = 25.0;
        breakdown.location.score = 18.0;
        breakdown.price.score = 10.0;
        breakdown.amenities.score = 5.0;

        let text = fallback_explanation(&venue, &brief, 58.0, &breakdown);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "- Comfortably accommodates your 80 guests (capacity: 50-100)",
                "- Great location in Staten Island",
            ]
        );
    }

    #[test]
    fn test_fallback_full_match_order() {
        let (venue, mut brief, _, _) = scored();
        brief.food_bev_level = FoodBevLevel::None;
        brief.alcohol_level = AlcoholLevel::None;
        brief.av_needs = AvNeeds::None;
        let (score, breakdown) = score_venue(&venue, &brief, &ScoringWeights::default());

        let text = fallback_explanation(&venue, &brief, score, &breakdown);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("capacity: 50-100"));
        assert!(lines[1].contains("Staten Island"));
        assert_eq!(lines[2], "- Within your budget of $5000");
        assert_eq!(lines[3], "- Has the amenities you need for your event");
        assert_eq!(lines[4], "- Excellent overall match for your requirements");
    }

    #[test]
    fn test_fallback_strong_match_bullet() {
        let (venue, brief, _, mut breakdown) = scored();
        breakdown.capacity.score = 15.0;
        breakdown.location.score = 10.0;
        breakdown.price.score = 15.0;
        breakdown.amenities.score = 9.0;

        let text = fallback_explanation(&venue, &brief, 65.0, &breakdown);

        assert_eq!(text, "- Strong match for your event needs");
    }

    #[test]
    fn test_fallback_generic_bullet() {
        let (venue, brief, _, mut breakdown) = scored();
        breakdown.capacity.score = 0.0;
        breakdown.location.score = 6.0;
        breakdown.price.score = 0.0;
        breakdown.amenities.score = 9.0;

        let text = fallback_explanation(&venue, &brief, 25.0, &breakdown);

        assert_eq!(text, "- Matches your event requirements");
    }

    #[test]
    fn test_prompt_contains_requirements_and_breakdown() {
        let (venue, brief, score, breakdown) = scored();

        let prompt = build_prompt(&venue, &brief, score, &breakdown);

        assert!(prompt.contains("- Type: Wedding"));
        assert!(prompt.contains("- Guest Count: 80 people"));
        assert!(prompt.contains("- Location Preference: Any"));
        assert!(prompt.contains("- Budget: $0 - $5000"));
        assert!(prompt.contains("- Food/Beverage: Full Catering"));
        assert!(prompt.contains("- Location: Staten Island, NYC"));
        assert!(prompt.contains("- Minimum Spend: N/A"));
        assert!(prompt.contains("- Capacity Match: 30.0/30 points"));
        assert!(prompt.contains("- Availability Match: 10.0/10 points"));
        assert!(prompt.contains("3-5 bullet points"));
    }

    #[tokio::test]
    async fn test_explain_uses_generated_text() {
        let (venue, brief, score, breakdown) = scored();
        let explainer = Explainer::new(
            Arc::new(FixedGenerator(Ok("- Lovely room".to_string()))),
            Duration::from_secs(1),
        );

        let text = explainer.explain(&venue, &brief, score, &breakdown).await;

        assert_eq!(text, "- Lovely room");
    }

    #[tokio::test]
    async fn test_explain_falls_back_on_error() {
        let (venue, brief, score, breakdown) = scored();
        let explainer = Explainer::new(Arc::new(FixedGenerator(Err(()))), Duration::from_secs(1));

        let text = explainer.explain(&venue, &brief, score, &breakdown).await;

        assert_eq!(text, fallback_explanation(&venue, &brief, score, &breakdown));
    }

    #[tokio::test]
    async fn test_explain_falls_back_on_blank_text() {
        let (venue, brief, score, breakdown) = scored();
        let explainer = Explainer::new(
            Arc::new(FixedGenerator(Ok("   \n".to_string()))),
            Duration::from_secs(1),
        );

        let text = explainer.explain(&venue, &brief, score, &breakdown).await;

        assert_eq!(text, fallback_explanation(&venue, &brief, score, &breakdown));
    }

    #[tokio::test]
    async fn test_explain_falls_back_on_timeout() {
        let (venue, brief, score, breakdown) = scored();
        let explainer = Explainer::new(Arc::new(SlowGenerator), Duration::from_millis(50));

        let text = explainer.explain(&venue, &brief, score, &breakdown).await;

        assert_eq!(text, fallback_explanation(&venue, &brief, score, &breakdown));
    }

    #[test]
    fn test_fallback_only_explainer() {
        let (venue, brief, score, breakdown) = scored();
        let explainer = Explainer::fallback_only();

        let text = tokio_test::block_on(explainer.explain(&venue, &brief, score, &breakdown));
        assert!(!text.is_empty());
        assert_eq!(text, fallback_explanation(&venue, &brief, score, &breakdown));
    }
}

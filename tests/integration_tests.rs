// Integration tests for venue matching and match generation

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use venue_match::core::{Explainer, GenerationOutcome, MatchPipeline, Matcher};
use venue_match::models::{
    AlcoholLevel, AvNeeds, Borough, Brief, EventType, FoodBevLevel, MatchResult, NewMatchResult,
    Venue, VerificationStatus,
};
use venue_match::services::{AnthropicClient, MemoryStore, ResultStore, StoreError};

fn create_venue(
    id: i64,
    capacity: (u32, u32),
    borough: Borough,
    base_price: Option<f64>,
) -> Venue {
    Venue {
        id,
        name: format!("Venue {}", id),
        description: None,
        borough,
        neighborhood: None,
        address: format!("{} Greenwich St", id),
        capacity_min: capacity.0,
        capacity_max: capacity.1,
        base_price,
        min_spend: None,
        verification_status: VerificationStatus::Verified,
    }
}

fn create_brief(id: i64) -> Brief {
    Brief {
        id,
        event_type: EventType::Birthday,
        headcount: 80,
        date_preferred: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
        date_flexible: true,
        borough_pref: Some(Borough::Manhattan),
        neighborhood_pref: None,
        budget_min: None,
        budget_max: 5000.0,
        food_bev_level: FoodBevLevel::None,
        alcohol_level: AlcoholLevel::None,
        av_needs: AvNeeds::None,
    }
}

fn sample_catalog() -> Vec<Venue> {
    vec![
        create_venue(1, (200, 300), Borough::Brooklyn, Some(3000.0)),
        create_venue(2, (50, 100), Borough::Manhattan, Some(4000.0)),
    ]
}

fn pipeline_for(store: Arc<MemoryStore>, explainer: Explainer) -> MatchPipeline {
    MatchPipeline::new(
        Matcher::with_default_weights(),
        explainer,
        store.clone(),
        store,
        10,
    )
}

/// Result store whose writes always fail
struct FailingWrites {
    inner: MemoryStore,
}

#[async_trait]
impl ResultStore for FailingWrites {
    async fn count_results(&self, brief_id: i64) -> Result<usize, StoreError> {
        self.inner.count_results(brief_id).await
    }

    async fn is_generated(&self, brief_id: i64) -> Result<bool, StoreError> {
        self.inner.is_generated(brief_id).await
    }

    async fn insert_results(
        &self,
        _brief_id: i64,
        _run_id: Uuid,
        _results: &[NewMatchResult],
    ) -> Result<(), StoreError> {
        Err(StoreError::InvalidRow("disk full".to_string()))
    }

    async fn list_results(&self, brief_id: i64) -> Result<Vec<MatchResult>, StoreError> {
        self.inner.list_results(brief_id).await
    }
}

#[tokio::test]
async fn test_integration_end_to_end_matching() {
    let store = MemoryStore::with_data(sample_catalog(), vec![]);
    let matcher = Matcher::with_default_weights();

    let outcome = matcher.find_matches(&store, &create_brief(1), 10).await.unwrap();

    assert_eq!(outcome.matches.len(), 2);

    let a = &outcome.matches[0];
    let b = &outcome.matches[1];
    assert_eq!(a.venue.id, 2);
    assert_eq!(b.venue.id, 1);
    assert!(a.score >= 90.0);
    assert!(a.score > b.score);
    assert_eq!(b.breakdown.location.score, 10.0);
}

#[tokio::test]
async fn test_find_matches_sorted_and_positive() {
    let mut venues = Vec::new();
    for i in 0..40i64 {
        let borough = [Borough::Manhattan, Borough::Brooklyn, Borough::Queens][(i % 3) as usize];
        let capacity = (10 + (i as u32 % 7) * 20, 60 + (i as u32 % 5) * 40);
        let price = if i % 4 == 0 { None } else { Some(1000.0 + i as f64 * 150.0) };
        venues.push(create_venue(i + 1, capacity, borough, price));
    }
    let store = MemoryStore::with_data(venues, vec![]);
    let matcher = Matcher::with_default_weights();

    let outcome = matcher.find_matches(&store, &create_brief(1), 15).await.unwrap();

    assert_eq!(outcome.total_candidates, 40);
    assert_eq!(outcome.matches.len(), 15);
    assert!(outcome.matches.iter().all(|m| m.score > 0.0));
    assert!(outcome.matches.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_generate_twice_is_idempotent() {
    let store = Arc::new(MemoryStore::with_data(sample_catalog(), vec![]));
    let pipeline = pipeline_for(store.clone(), Explainer::fallback_only());
    let brief = create_brief(5);

    let first = pipeline.generate(&brief).await.unwrap();
    let after_first = store.list_results(5).await.unwrap();
    let run = store.run_for(5).await.unwrap();

    let second = pipeline.generate(&brief).await.unwrap();
    let after_second = store.list_results(5).await.unwrap();

    assert!(matches!(first, GenerationOutcome::Generated { count: 2, .. }));
    assert_eq!(second, GenerationOutcome::AlreadyGenerated { count: 2 });
    assert_eq!(after_first.len(), after_second.len());
    assert_eq!(
        after_first.iter().map(|r| (r.id, r.rank, r.venue_id)).collect::<Vec<_>>(),
        after_second.iter().map(|r| (r.id, r.rank, r.venue_id)).collect::<Vec<_>>()
    );
    assert_eq!(store.run_for(5).await.unwrap().run_id, run.run_id);
}

#[tokio::test]
async fn test_concurrent_generation_commits_once() {
    let store = Arc::new(MemoryStore::with_data(sample_catalog(), vec![]));
    let pipeline = Arc::new(pipeline_for(store.clone(), Explainer::fallback_only()));
    let brief = create_brief(9);

    let (a, b) = tokio::join!(pipeline.generate(&brief), pipeline.generate(&brief));
    let (a, b) = (a.unwrap(), b.unwrap());

    let generated = [&a, &b]
        .iter()
        .filter(|o| matches!(o, GenerationOutcome::Generated { .. }))
        .count();

    assert_eq!(generated, 1);
    assert_eq!(a.count(), b.count());
    assert_eq!(store.count_results(9).await.unwrap(), 2);
}

#[tokio::test]
async fn test_empty_catalog_completes_with_zero_results() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_for(store.clone(), Explainer::fallback_only());
    let brief = create_brief(3);

    let first = pipeline.generate(&brief).await.unwrap();
    assert!(matches!(first, GenerationOutcome::Generated { count: 0, .. }));
    assert!(store.is_generated(3).await.unwrap());

    // A venue added later must not trigger regeneration
    store
        .add_venue(create_venue(1, (50, 100), Borough::Manhattan, Some(4000.0)))
        .await;

    let second = pipeline.generate(&brief).await.unwrap();
    assert_eq!(second, GenerationOutcome::AlreadyGenerated { count: 0 });
    assert_eq!(store.count_results(3).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_write_leaves_no_results() {
    let catalog = Arc::new(MemoryStore::with_data(sample_catalog(), vec![]));
    let results = Arc::new(FailingWrites {
        inner: MemoryStore::new(),
    });
    let pipeline = MatchPipeline::new(
        Matcher::with_default_weights(),
        Explainer::fallback_only(),
        catalog,
        results.clone(),
        10,
    );

    let outcome = pipeline.generate(&create_brief(4)).await;

    assert!(outcome.is_err());
    assert!(!results.is_generated(4).await.unwrap());
    assert_eq!(results.count_results(4).await.unwrap(), 0);
}

#[tokio::test]
async fn test_generation_falls_back_when_service_errors() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .with_status(500)
        .with_body("internal error")
        .expect(2)
        .create_async()
        .await;

    let client = AnthropicClient::new(
        server.url(),
        "test-key".to_string(),
        "claude-3-haiku-20240307".to_string(),
        500,
        0.7,
        Duration::from_secs(5),
    )
    .unwrap();
    let explainer = Explainer::new(Arc::new(client), Duration::from_secs(5));

    let store = Arc::new(MemoryStore::with_data(sample_catalog(), vec![]));
    let pipeline = pipeline_for(store.clone(), explainer);

    pipeline.generate(&create_brief(6)).await.unwrap();

    let results = store.list_results(6).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0]
        .explanation
        .contains("Comfortably accommodates your 80 guests"));
    assert!(results[0]
        .explanation
        .contains("Excellent overall match for your requirements"));
    assert!(results.iter().all(|r| !r.explanation.trim().is_empty()));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generation_uses_service_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content":[{"type":"text","text":"- Sized right for 80 guests"}]}"#)
        .create_async()
        .await;

    let client = AnthropicClient::new(
        server.url(),
        "test-key".to_string(),
        "claude-3-haiku-20240307".to_string(),
        500,
        0.7,
        Duration::from_secs(5),
    )
    .unwrap();
    let explainer = Explainer::new(Arc::new(client), Duration::from_secs(5));

    let store = Arc::new(MemoryStore::with_data(sample_catalog(), vec![]));
    let pipeline = pipeline_for(store.clone(), explainer);

    pipeline.generate(&create_brief(8)).await.unwrap();

    let results = store.list_results(8).await.unwrap();
    assert!(results.iter().all(|r| r.explanation == "- Sized right for 80 guests"));
}

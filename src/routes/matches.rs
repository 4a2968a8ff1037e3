use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::MatchPipeline;
use crate::models::{
    Brief, ErrorResponse, GenerateMatchesResponse, HealthResponse, MatchListResponse,
    MatchSetStatus, PreviewMatchesQuery, PreviewMatchesResponse, RankedMatch,
};
use crate::services::{BriefSource, ResultStore, StoreError, VenueCatalog};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub briefs: Arc<dyn BriefSource>,
    pub catalog: Arc<dyn VenueCatalog>,
    pub results: Arc<dyn ResultStore>,
    pub pipeline: Arc<MatchPipeline>,
    pub default_limit: u16,
    pub max_limit: u16,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/briefs/{brief_id}/matches/generate", web::post().to(generate_matches))
        .route("/briefs/{brief_id}/matches/preview", web::get().to(preview_matches))
        .route("/briefs/{brief_id}/matches", web::get().to(list_matches));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn store_failure(context: &str, brief_id: i64, e: StoreError) -> HttpResponse {
    tracing::error!("{} for brief {}: {}", context, brief_id, e);
    error_response(
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        context,
        e.to_string(),
    )
}

/// Resolve the brief or build the 404/500 response
async fn load_brief(state: &AppState, brief_id: i64) -> Result<Brief, HttpResponse> {
    match state.briefs.get_brief(brief_id).await {
        Ok(Some(brief)) => Ok(brief),
        Ok(None) => Err(error_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Brief not found",
            format!("No event brief with id {}", brief_id),
        )),
        Err(e) => Err(store_failure("Failed to fetch brief", brief_id, e)),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.results.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Trigger match generation
///
/// POST /api/v1/briefs/{brief_id}/matches/generate
///
/// Returns 200 with the existing count when the brief already has a match set,
/// otherwise starts the pipeline in the background and returns 202.
async fn generate_matches(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let brief_id = path.into_inner();

    let brief = match load_brief(&state, brief_id).await {
        Ok(brief) => brief,
        Err(response) => return response,
    };

    match state.pipeline.existing_count(brief_id).await {
        Ok(Some(count)) => {
            tracing::info!("Brief {} already has {} matches", brief_id, count);

            HttpResponse::Ok().json(GenerateMatchesResponse {
                message: "Matches already generated".to_string(),
                brief_id,
                match_count: Some(count),
            })
        }
        Ok(None) => {
            tracing::info!("Queueing match generation for brief {}", brief_id);
            state.pipeline.spawn(brief);

            HttpResponse::Accepted().json(GenerateMatchesResponse {
                message: "Match generation started".to_string(),
                brief_id,
                match_count: None,
            })
        }
        Err(e) => store_failure("Failed to check match status", brief_id, e),
    }
}

/// Ranked match list for a brief
///
/// GET /api/v1/briefs/{brief_id}/matches
async fn list_matches(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let brief_id = path.into_inner();

    if let Err(response) = load_brief(&state, brief_id).await {
        return response;
    }

    let status = match state.pipeline.status(brief_id).await {
        Ok(status) => status,
        Err(e) => return store_failure("Failed to check match status", brief_id, e),
    };

    let results = match state.results.list_results(brief_id).await {
        Ok(results) => results,
        Err(e) => return store_failure("Failed to fetch matches", brief_id, e),
    };

    let mut matches = Vec::with_capacity(results.len());
    for result in &results {
        match state.catalog.get_venue(result.venue_id).await {
            Ok(Some(venue)) => matches.push(RankedMatch::new(result, &venue)),
            Ok(None) => {
                tracing::warn!(
                    "Venue {} for match {} no longer exists, omitting",
                    result.venue_id,
                    result.id
                );
            }
            Err(e) => return store_failure("Failed to fetch venue", brief_id, e),
        }
    }

    HttpResponse::Ok().json(MatchListResponse {
        brief_id,
        status,
        match_count: matches.len(),
        matches,
    })
}

/// Current ranking with full score breakdowns, nothing persisted
///
/// GET /api/v1/briefs/{brief_id}/matches/preview?limit=N
async fn preview_matches(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<PreviewMatchesQuery>,
) -> impl Responder {
    let brief_id = path.into_inner();

    if let Err(errors) = query.validate() {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    let limit = query.limit.unwrap_or(state.default_limit);
    if limit > state.max_limit {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            format!("limit must not exceed {}", state.max_limit),
        );
    }

    let brief = match load_brief(&state, brief_id).await {
        Ok(brief) => brief,
        Err(response) => return response,
    };

    let outcome = match state
        .pipeline
        .matcher()
        .find_matches(state.catalog.as_ref(), &brief, limit as usize)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return store_failure("Failed to rank venues", brief_id, e),
    };

    tracing::debug!(
        "Preview for brief {}: {} of {} candidates",
        brief_id,
        outcome.matches.len(),
        outcome.total_candidates
    );

    HttpResponse::Ok().json(PreviewMatchesResponse {
        brief_id,
        total_candidates: outcome.total_candidates,
        matches: outcome.matches,
    })
}

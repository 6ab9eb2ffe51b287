use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{RecommendationRequest, RecommendationsResponse},
    routes::AppState,
    services::recommendations,
};

/// Handler for recommendations endpoint
///
/// Validation runs before the credential check, and both run before any
/// upstream call.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationsResponse>> {
    let Json(request) = payload?;
    let query = request.validate()?;
    let provider = state.provider()?;

    tracing::info!(
        request_id = %request_id,
        media_type = %query.media_type,
        count = query.count,
        "Processing recommendation request"
    );

    let recommendations = recommendations::get_recommendations(provider.as_ref(), &query).await?;

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.len(),
        "Recommendation request completed"
    );

    Ok(Json(RecommendationsResponse { recommendations }))
}

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use futures::TryStreamExt;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    routes::AppState,
    services::generation,
};

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

impl GenerateRequest {
    pub fn validate(self) -> AppResult<String> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::InvalidInput("prompt: must not be blank".to_string()));
        }
        Ok(self.prompt)
    }
}

/// Handler for the streamed free-text endpoint
///
/// Responds with a chunked plain-text body. Errors after the headers are
/// sent can only abort the body, so they are logged here.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    let prompt = request.validate()?;
    let provider = state.provider()?;

    let stream = generation::stream_completion(provider.as_ref(), &prompt).await?;

    let stream = stream.inspect_err(move |e| {
        tracing::error!(request_id = %request_id, error = %e, "Completion stream aborted");
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

// Joke routes
//
// - GET  /joke       - acquire a joke (served or freshly generated), JSON
// - GET  /joke/text  - same, as plain text
// - POST /joke       - save a joke as submitted

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{AcquiredJoke, Joke, JokeOrigin};
use crate::services::JokeAcquisitionService;
use crate::utils::error::{AppError, Result};

/// Joke router state
#[derive(Clone)]
pub struct JokeState {
    pub acquisition: Arc<JokeAcquisitionService>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JokeResponse {
    pub id: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<JokeOrigin>,
}

impl From<AcquiredJoke> for JokeResponse {
    fn from(acquired: AcquiredJoke) -> Self {
        Self {
            id: acquired.joke.id,
            text: acquired.joke.text,
            origin: Some(acquired.origin),
        }
    }
}

impl From<Joke> for JokeResponse {
    fn from(joke: Joke) -> Self {
        Self {
            id: joke.id,
            text: joke.text,
            origin: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitJokeRequest {
    pub text: String,
}

/// Create the joke router
pub fn create_router(state: JokeState) -> Router {
    Router::new()
        .route("/joke", get(handle_get_joke).post(handle_submit_joke))
        .route("/joke/text", get(handle_get_joke_text))
        .with_state(state)
}

async fn acquire(state: &JokeState) -> Result<AcquiredJoke> {
    state.acquisition.acquire_joke().await.map_err(|e| {
        error!("❌ Joke acquisition failed: {}", e);
        e
    })
}

/// GET /joke
async fn handle_get_joke(State(state): State<JokeState>) -> Result<Json<JokeResponse>> {
    let acquired = acquire(&state).await?;
    info!(origin = ?acquired.origin, "📨 Serving joke");
    Ok(Json(acquired.into()))
}

/// GET /joke/text
async fn handle_get_joke_text(State(state): State<JokeState>) -> Result<String> {
    let acquired = acquire(&state).await?;
    Ok(format!("Joke: {}", acquired.joke.text))
}

/// POST /joke
async fn handle_submit_joke(
    State(state): State<JokeState>,
    request: std::result::Result<Json<SubmitJokeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JokeResponse>)> {
    let Json(request) = request.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let joke = state.acquisition.submit_joke(&request.text).await?;
    Ok((StatusCode::CREATED, Json(joke.into())))
}

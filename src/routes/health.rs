use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::redis::RedisPool;
use crate::services::JokeStore;

/// State for the health endpoints
#[derive(Clone)]
pub struct AppState {
    pub redis: RedisPool,
    pub store: Arc<dyn JokeStore>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub components: HealthComponents,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthComponents {
    pub redis: ComponentStatus,
    pub store: ComponentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joke_count: Option<u64>,
}

impl ComponentStatus {
    fn healthy(joke_count: Option<u64>) -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
            joke_count,
        }
    }

    fn unhealthy(message: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message),
            joke_count: None,
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// GET /health - Redis reachability and stored joke count
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let redis = match state.redis.ping().await {
        Ok(_) => ComponentStatus::healthy(None),
        Err(e) => ComponentStatus::unhealthy(format!("Redis ping failed: {}", e)),
    };

    let store = match state.store.count().await {
        Ok(count) => ComponentStatus::healthy(Some(count)),
        Err(e) => ComponentStatus::unhealthy(e.to_string()),
    };

    let healthy = redis.is_healthy() && store.is_healthy();
    let (overall_status, status_code) = if healthy {
        ("healthy", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: HealthComponents { redis, store },
    };

    (status_code, Json(response))
}

/// GET /ping
pub async fn ping() -> &'static str {
    "pong"
}

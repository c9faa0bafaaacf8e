use reqwest::Client;
use std::time::Duration;

use crate::config::Settings;
use crate::utils::{AppError, Result};

/// Shared HTTP client for upstream API calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_millis(settings.server.request_timeout);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("dadjokes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST a JSON body authenticated with a bearer token
    pub async fn post_json_with_bearer<T: serde::Serialize>(
        &self,
        url: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        self.client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(AppError::from)
    }
}

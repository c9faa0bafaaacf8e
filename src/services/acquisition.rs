//! Duplicate-aware joke acquisition
//!
//! `acquire_joke` counts the stored jokes and either serves an existing one
//! (from the cache when it mirrors the whole store, otherwise from the store)
//! or generates candidates until one is not a near-duplicate of anything
//! stored, then persists and caches it.
//!
//! Uniqueness is checked against the store snapshot visible when the candidate
//! is evaluated. Two concurrent acquisitions can both pass the check and
//! persist similar jokes; there is no cross-request locking.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::config::JokeSettings;
use crate::models::{AcquiredJoke, Joke, JokeOrigin};
use crate::services::joke_generator::JokeGenerator;
use crate::services::joke_store::{JokeCache, JokeStore};
use crate::utils::error::{AppError, Result};
use crate::utils::similarity::{collapse_whitespace, find_similar, DEFAULT_SIMILARITY_THRESHOLD};

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Stored joke count at which generation stops
    pub serve_threshold: u64,
    pub similarity_threshold: f64,
    /// Candidates generated before giving up on duplicates
    pub max_generation_attempts: u32,
    /// Deadline for one whole acquisition
    pub timeout: Duration,
    pub check_duplicates_on_submit: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            serve_threshold: 20,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_generation_attempts: 5,
            timeout: Duration::from_secs(30),
            check_duplicates_on_submit: false,
        }
    }
}

impl From<&JokeSettings> for AcquisitionConfig {
    fn from(settings: &JokeSettings) -> Self {
        Self {
            serve_threshold: settings.serve_threshold,
            similarity_threshold: settings.similarity_threshold,
            max_generation_attempts: settings.max_generation_attempts,
            timeout: settings.acquisition_timeout(),
            check_duplicates_on_submit: settings.check_duplicates_on_submit,
        }
    }
}

pub struct JokeAcquisitionService {
    config: AcquisitionConfig,
    generator: Arc<dyn JokeGenerator>,
    store: Arc<dyn JokeStore>,
    cache: Arc<dyn JokeCache>,
}

impl JokeAcquisitionService {
    pub fn new(
        config: AcquisitionConfig,
        generator: Arc<dyn JokeGenerator>,
        store: Arc<dyn JokeStore>,
        cache: Arc<dyn JokeCache>,
    ) -> Self {
        Self {
            config,
            generator,
            store,
            cache,
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Serve an existing joke or generate a new unique one, within the deadline
    pub async fn acquire_joke(&self) -> Result<AcquiredJoke> {
        let deadline = Instant::now() + self.config.timeout;

        match timeout_at(deadline, self.run_acquisition()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "⏱️  Joke acquisition exceeded {}ms",
                    self.config.timeout.as_millis()
                );
                Err(AppError::GenerationTimeout(format!(
                    "Joke acquisition exceeded {}ms",
                    self.config.timeout.as_millis()
                )))
            }
        }
    }

    async fn run_acquisition(&self) -> Result<AcquiredJoke> {
        let count = self.store.count().await.map_err(AppError::into_persistence)?;
        debug!(
            count,
            threshold = self.config.serve_threshold,
            "Counted stored jokes"
        );

        if count >= self.config.serve_threshold {
            self.serve_existing(count).await
        } else {
            self.generate_unique().await
        }
    }

    /// A cached subset would skew the draw, so the cache only answers once it
    /// holds as many jokes as the store.
    async fn serve_existing(&self, stored: u64) -> Result<AcquiredJoke> {
        match self.cache.count().await {
            Ok(cached) if cached >= stored => match self.cache.random().await {
                Ok(Some(joke)) => return Ok(AcquiredJoke::new(joke, JokeOrigin::Cache)),
                Ok(None) => debug!("Cache miss, falling back to store"),
                Err(e) => warn!("⚠️  {}, falling back to store", e.into_cache()),
            },
            Ok(cached) => debug!(cached, stored, "Cache incomplete, serving from store"),
            Err(e) => warn!("⚠️  {}, falling back to store", e.into_cache()),
        }

        let joke = self
            .store
            .random()
            .await
            .map_err(AppError::into_persistence)?
            .ok_or_else(|| AppError::NoJokeAvailable("Joke store is empty".to_string()))?;

        self.cache_best_effort(&joke).await;
        Ok(AcquiredJoke::new(joke, JokeOrigin::Store))
    }

    async fn generate_unique(&self) -> Result<AcquiredJoke> {
        let max_attempts = self.config.max_generation_attempts.max(1);

        for attempt in 1..=max_attempts {
            let candidate = collapse_whitespace(&self.generator.generate().await?);
            if candidate.is_empty() {
                return Err(AppError::GenerationError(
                    "Content source returned an empty joke".to_string(),
                ));
            }

            let existing = self
                .store
                .all_texts()
                .await
                .map_err(AppError::into_persistence)?;

            if let Some(duplicate) = find_similar(
                &candidate,
                existing.iter().map(String::as_str),
                self.config.similarity_threshold,
            ) {
                info!(attempt, max_attempts, "🔁 Rejected near-duplicate joke");
                debug!(candidate = %candidate, duplicate = %duplicate, "Duplicate detail");
                continue;
            }

            let joke = self
                .store
                .insert(&candidate)
                .await
                .map_err(AppError::into_persistence)?;
            self.cache_best_effort(&joke).await;

            info!(
                id = joke.id.as_deref().unwrap_or_default(),
                attempt,
                "✅ Accepted new joke"
            );
            return Ok(AcquiredJoke::new(joke, JokeOrigin::Generated));
        }

        Err(AppError::DuplicateRetriesExhausted(max_attempts))
    }

    /// Persist a joke as submitted, skipping the uniqueness check unless configured
    pub async fn submit_joke(&self, text: &str) -> Result<Joke> {
        let text = collapse_whitespace(text);
        if text.is_empty() {
            return Err(AppError::BadRequest("Joke text must not be empty".to_string()));
        }

        if self.config.check_duplicates_on_submit {
            let existing = self
                .store
                .all_texts()
                .await
                .map_err(AppError::into_persistence)?;

            if let Some(duplicate) = find_similar(
                &text,
                existing.iter().map(String::as_str),
                self.config.similarity_threshold,
            ) {
                return Err(AppError::DuplicateJoke(format!(
                    "Too similar to an existing joke: {}",
                    duplicate
                )));
            }
        }

        let joke = self
            .store
            .insert(&text)
            .await
            .map_err(AppError::into_persistence)?;
        self.cache_best_effort(&joke).await;

        info!(id = joke.id.as_deref().unwrap_or_default(), "💾 Saved submitted joke");
        Ok(joke)
    }

    /// Generate `count` jokes and save them through the submission path
    ///
    /// Failures are logged and skipped. Returns how many jokes were saved.
    pub async fn seed_jokes(&self, count: usize) -> usize {
        let mut saved = 0;

        for index in 0..count {
            let text = match self.generator.generate().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(index, "⚠️  Failed to generate joke: {}", e);
                    continue;
                }
            };

            match self.submit_joke(&text).await {
                Ok(_) => saved += 1,
                Err(e) => warn!(index, "⚠️  Failed to save joke: {}", e),
            }
        }

        info!(saved, requested = count, "🌱 Seeding finished");
        saved
    }

    async fn cache_best_effort(&self, joke: &Joke) {
        if let Err(e) = self.cache.insert(joke).await {
            warn!("⚠️  {}", e.into_cache());
        }
    }
}

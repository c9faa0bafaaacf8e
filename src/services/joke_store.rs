use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::config::JokeSettings;
use crate::models::Joke;
use crate::redis::RedisPool;
use crate::utils::error::{AppError, Result};

/// Durable joke storage
///
/// The store assigns identifiers and is the source of truth for counting and
/// duplicate scanning. Implementations only need single-key atomicity.
#[async_trait]
pub trait JokeStore: Send + Sync {
    /// Number of persisted jokes
    async fn count(&self) -> Result<u64>;

    /// A uniformly random persisted joke, `None` when the store is empty
    async fn random(&self) -> Result<Option<Joke>>;

    /// Texts of every persisted joke, for similarity scanning
    async fn all_texts(&self) -> Result<Vec<String>>;

    /// Persist a new joke and return it with its assigned identifier
    async fn insert(&self, text: &str) -> Result<Joke>;
}

/// Expiring cache in front of the store
///
/// Entries expire individually, so the cache usually holds a subset of the
/// store. Callers compare `count` with the store's before trusting `random`.
#[async_trait]
pub trait JokeCache: Send + Sync {
    /// Number of live cached jokes
    async fn count(&self) -> Result<u64>;

    /// A random cached joke, `None` on a miss
    async fn random(&self) -> Result<Option<Joke>>;

    /// Cache a persisted joke
    async fn insert(&self, joke: &Joke) -> Result<()>;
}

fn decode_joke(raw: &str) -> Result<Joke> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::InternalError(format!("Corrupt joke record: {}", e)))
}

/// Store backed by a single Redis hash (field = id, value = JSON joke)
#[derive(Clone)]
pub struct RedisJokeStore {
    redis: Arc<RedisPool>,
    key: String,
}

impl RedisJokeStore {
    pub fn new(redis: Arc<RedisPool>, key: impl Into<String>) -> Self {
        Self {
            redis,
            key: key.into(),
        }
    }

    pub fn from_settings(redis: Arc<RedisPool>, settings: &JokeSettings) -> Self {
        Self::new(redis, settings.store_key.clone())
    }
}

#[async_trait]
impl JokeStore for RedisJokeStore {
    async fn count(&self) -> Result<u64> {
        self.redis
            .hlen(&self.key)
            .await
            .map_err(AppError::into_persistence)
    }

    async fn random(&self) -> Result<Option<Joke>> {
        let Some(id) = self
            .redis
            .hrandfield(&self.key)
            .await
            .map_err(AppError::into_persistence)?
        else {
            return Ok(None);
        };

        let raw: Option<String> = self
            .redis
            .hget(&self.key, &id)
            .await
            .map_err(AppError::into_persistence)?;

        raw.map(|raw| decode_joke(&raw))
            .transpose()
            .map_err(AppError::into_persistence)
    }

    async fn all_texts(&self) -> Result<Vec<String>> {
        let values = self
            .redis
            .hvals(&self.key)
            .await
            .map_err(AppError::into_persistence)?;

        let texts = values
            .iter()
            .filter_map(|raw| match decode_joke(raw) {
                Ok(joke) => Some(joke.text),
                Err(e) => {
                    warn!("⚠️  Skipping stored joke: {}", e);
                    None
                }
            })
            .collect();

        Ok(texts)
    }

    async fn insert(&self, text: &str) -> Result<Joke> {
        let joke = Joke::persisted(Uuid::new_v4().to_string(), text);
        let id = joke.id.clone().unwrap_or_default();
        let raw = serde_json::to_string(&joke)?;

        self.redis
            .hset(&self.key, &id, &raw)
            .await
            .map_err(AppError::into_persistence)?;

        Ok(joke)
    }
}

/// Cache of individual `{prefix}{id}` keys with a TTL
#[derive(Clone)]
pub struct RedisJokeCache {
    redis: Arc<RedisPool>,
    prefix: String,
    ttl_seconds: u64,
}

impl RedisJokeCache {
    pub fn new(redis: Arc<RedisPool>, prefix: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
            ttl_seconds,
        }
    }

    pub fn from_settings(redis: Arc<RedisPool>, settings: &JokeSettings) -> Self {
        Self::new(redis, settings.cache_prefix.clone(), settings.cache_ttl_seconds)
    }

    fn cache_key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }
}

#[async_trait]
impl JokeCache for RedisJokeCache {
    async fn count(&self) -> Result<u64> {
        let keys = self
            .redis
            .keys(&format!("{}*", self.prefix))
            .await
            .map_err(AppError::into_cache)?;

        Ok(keys.len() as u64)
    }

    async fn random(&self) -> Result<Option<Joke>> {
        let keys = self
            .redis
            .keys(&format!("{}*", self.prefix))
            .await
            .map_err(AppError::into_cache)?;

        let key = {
            let mut rng = rand::thread_rng();
            keys.choose(&mut rng).cloned()
        };
        let Some(key) = key else {
            return Ok(None);
        };

        // The key may expire between KEYS and GET, which is just a miss
        let raw: Option<String> = self.redis.get(&key).await.map_err(AppError::into_cache)?;

        raw.map(|raw| decode_joke(&raw))
            .transpose()
            .map_err(AppError::into_cache)
    }

    async fn insert(&self, joke: &Joke) -> Result<()> {
        let id = joke
            .id
            .as_deref()
            .ok_or_else(|| AppError::CacheError("Cannot cache a joke without an id".to_string()))?;
        let raw = serde_json::to_string(joke)?;

        self.redis
            .setex(&self.cache_key(id), &raw, self.ttl_seconds)
            .await
            .map_err(AppError::into_cache)
    }
}

use async_trait::async_trait;
use rand::seq::{IteratorRandom, SliceRandom};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Joke;
use crate::services::joke_store::{JokeCache, JokeStore};
use crate::utils::error::{AppError, Result};

/// Process-local store, for tests and local runs without Redis
#[derive(Default)]
pub struct MemoryJokeStore {
    jokes: RwLock<Vec<Joke>>,
}

impl MemoryJokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the given texts
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let jokes = texts
            .into_iter()
            .map(|text| Joke::persisted(Uuid::new_v4().to_string(), text))
            .collect();

        Self {
            jokes: RwLock::new(jokes),
        }
    }

    pub async fn snapshot(&self) -> Vec<Joke> {
        self.jokes.read().await.clone()
    }
}

#[async_trait]
impl JokeStore for MemoryJokeStore {
    async fn count(&self) -> Result<u64> {
        Ok(self.jokes.read().await.len() as u64)
    }

    async fn random(&self) -> Result<Option<Joke>> {
        let jokes = self.jokes.read().await;
        Ok(jokes.choose(&mut rand::thread_rng()).cloned())
    }

    async fn all_texts(&self) -> Result<Vec<String>> {
        let jokes = self.jokes.read().await;
        Ok(jokes.iter().map(|joke| joke.text.clone()).collect())
    }

    async fn insert(&self, text: &str) -> Result<Joke> {
        let joke = Joke::persisted(Uuid::new_v4().to_string(), text);
        self.jokes.write().await.push(joke.clone());
        Ok(joke)
    }
}

/// Process-local cache without expiry
#[derive(Default)]
pub struct MemoryJokeCache {
    jokes: RwLock<HashMap<String, Joke>>,
}

impl MemoryJokeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jokes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jokes.read().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.jokes.read().await.contains_key(id)
    }
}

#[async_trait]
impl JokeCache for MemoryJokeCache {
    async fn count(&self) -> Result<u64> {
        Ok(self.jokes.read().await.len() as u64)
    }

    async fn random(&self) -> Result<Option<Joke>> {
        let jokes = self.jokes.read().await;
        Ok(jokes.values().choose(&mut rand::thread_rng()).cloned())
    }

    async fn insert(&self, joke: &Joke) -> Result<()> {
        let id = joke
            .id
            .clone()
            .ok_or_else(|| AppError::CacheError("Cannot cache a joke without an id".to_string()))?;
        self.jokes.write().await.insert(id, joke.clone());
        Ok(())
    }
}

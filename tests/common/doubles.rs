//! Test doubles for the acquisition collaborators

use async_trait::async_trait;
use dadjokes::models::Joke;
use dadjokes::services::{JokeCache, JokeGenerator, JokeStore, MemoryJokeStore};
use dadjokes::utils::{AppError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Fails the test if the content source is ever consulted
pub struct PanickingGenerator;

#[async_trait]
impl JokeGenerator for PanickingGenerator {
    async fn generate(&self) -> Result<String> {
        panic!("content source must not be called when serving existing jokes");
    }
}

/// Returns the scripted texts in order, then fails with a generation error
pub struct ScriptedGenerator {
    texts: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            texts: Mutex::new(texts.iter().map(|t| t.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JokeGenerator for ScriptedGenerator {
    async fn generate(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::GenerationError("script exhausted".to_string()))
    }
}

/// Always returns the same text, optionally after a delay
pub struct RepeatingGenerator {
    text: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl RepeatingGenerator {
    pub fn new(text: &str) -> Self {
        Self::with_delay(text, Duration::ZERO)
    }

    pub fn with_delay(text: &str, delay: Duration) -> Self {
        Self {
            text: text.to_string(),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JokeGenerator for RepeatingGenerator {
    async fn generate(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.text.clone())
    }
}

/// Upstream that is down
pub struct FailingGenerator;

#[async_trait]
impl JokeGenerator for FailingGenerator {
    async fn generate(&self) -> Result<String> {
        Err(AppError::GenerationError("connection refused".to_string()))
    }
}

/// Memory store whose writes fail
pub struct ReadOnlyStore {
    pub inner: MemoryJokeStore,
}

#[async_trait]
impl JokeStore for ReadOnlyStore {
    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    async fn random(&self) -> Result<Option<Joke>> {
        self.inner.random().await
    }

    async fn all_texts(&self) -> Result<Vec<String>> {
        self.inner.all_texts().await
    }

    async fn insert(&self, _text: &str) -> Result<Joke> {
        Err(AppError::RedisError("READONLY You can't write against a read only replica.".to_string()))
    }
}

/// Cache that is unreachable
pub struct BrokenCache;

#[async_trait]
impl JokeCache for BrokenCache {
    async fn count(&self) -> Result<u64> {
        Err(AppError::RedisError("connection reset".to_string()))
    }

    async fn random(&self) -> Result<Option<Joke>> {
        Err(AppError::RedisError("connection reset".to_string()))
    }

    async fn insert(&self, _joke: &Joke) -> Result<()> {
        Err(AppError::RedisError("connection reset".to_string()))
    }
}

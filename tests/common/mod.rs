#![allow(dead_code)]

pub mod doubles;

use dadjokes::services::{RedisJokeCache, RedisJokeStore};
use dadjokes::{RedisPool, Settings};
use once_cell::sync::Lazy;
use std::sync::Arc;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::redis::Redis;

/// Global Docker client (reused across all tests)
static DOCKER: Lazy<Cli> = Lazy::new(Cli::default);

/// Test context with automatic Redis container management
///
/// Honours `REDIS_URL` (redis://host:port) and `USE_LOCAL_REDIS` so the
/// suite can run against an existing Redis instead of Docker. Every context
/// gets its own key namespace.
pub struct TestContext {
    pub redis: Arc<RedisPool>,
    pub settings: Settings,
    _container: Option<Container<'static, Redis>>,
}

impl TestContext {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (container, host, port) = if let Ok(redis_url) = std::env::var("REDIS_URL") {
            let url_parts: Vec<&str> = redis_url
                .strip_prefix("redis://")
                .unwrap_or(&redis_url)
                .split(':')
                .collect();
            let host = url_parts.first().unwrap_or(&"127.0.0.1").to_string();
            let port = url_parts
                .get(1)
                .and_then(|p| p.trim_end_matches('/').parse().ok())
                .unwrap_or(6379);
            (None, host, port)
        } else if std::env::var("USE_LOCAL_REDIS").is_ok() {
            (None, "127.0.0.1".to_string(), 6379)
        } else {
            let container = DOCKER.run(Redis);
            let port = container.get_host_port_ipv4(6379);
            (Some(container), "127.0.0.1".to_string(), port)
        };

        let namespace = uuid::Uuid::new_v4().simple().to_string();

        let mut settings = Settings::new()?;
        settings.redis.host = host;
        settings.redis.port = port;
        settings.redis.password = None;
        settings.jokes.store_key = format!("test:{}:jokes", namespace);
        settings.jokes.cache_prefix = format!("test:{}:joke:", namespace);

        let redis = RedisPool::new(&settings)?;
        redis.ping().await?;

        Ok(TestContext {
            redis: Arc::new(redis),
            settings,
            _container: container,
        })
    }

    pub fn store(&self) -> RedisJokeStore {
        RedisJokeStore::from_settings(self.redis.clone(), &self.settings.jokes)
    }

    pub fn cache(&self) -> RedisJokeCache {
        RedisJokeCache::from_settings(self.redis.clone(), &self.settings.jokes)
    }

    pub fn cache_with_ttl(&self, ttl_seconds: u64) -> RedisJokeCache {
        RedisJokeCache::new(
            self.redis.clone(),
            self.settings.jokes.cache_prefix.clone(),
            ttl_seconds,
        )
    }
}

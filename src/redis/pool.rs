use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

use crate::config::Settings;
use crate::utils::{AppError, Result};

/// Redis connection pool wrapper
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl RedisPool {
    /// Create a new Redis connection pool
    pub fn new(settings: &Settings) -> Result<Self> {
        let redis_url = settings.redis_url();

        let mut cfg = Config::from_url(redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig::new(settings.redis.pool_size));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AppError::RedisError(format!("Failed to create Redis pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to get Redis connection: {}", e)))
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::RedisError(format!("Redis ping failed: {}", e)))?;
        Ok(())
    }

    /// Get a value from Redis
    pub async fn get<T: redis::FromRedisValue>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        conn.get(key)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to get key '{}': {}", key, e)))
    }

    /// Set a value with expiration
    pub async fn setex(&self, key: &str, value: &str, seconds: u64) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.set_ex(key, value, seconds)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to setex key '{}': {}", key, e)))
    }

    /// Get hash field value
    pub async fn hget<T: redis::FromRedisValue>(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        conn.hget(key, field).await.map_err(|e| {
            AppError::RedisError(format!(
                "Failed to hget field '{}' from '{}': {}",
                field, key, e
            ))
        })
    }

    /// Set hash field value
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.hset(key, field, value).await.map_err(|e| {
            AppError::RedisError(format!(
                "Failed to hset field '{}' in '{}': {}",
                field, key, e
            ))
        })
    }

    /// Number of fields in a hash
    pub async fn hlen(&self, key: &str) -> Result<u64> {
        let mut conn = self.get_connection().await?;
        conn.hlen(key)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to hlen for '{}': {}", key, e)))
    }

    /// All values of a hash
    pub async fn hvals(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.get_connection().await?;
        conn.hvals(key)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to hvals for '{}': {}", key, e)))
    }

    /// Pick a random field of a hash, `None` when the hash is empty or missing
    pub async fn hrandfield(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        redis::cmd("HRANDFIELD")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                AppError::RedisError(format!("Failed to hrandfield for '{}': {}", key, e))
            })
    }

    /// Get keys matching pattern using KEYS command
    /// Note: In production with large datasets, consider using SCAN instead
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.get_connection().await?;
        redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                AppError::RedisError(format!(
                    "Failed to get keys with pattern '{}': {}",
                    pattern, e
                ))
            })
    }
}

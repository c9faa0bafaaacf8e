use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub redis: RedisSettings,
    pub openai: OpenAISettings,
    pub jokes: JokeSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // milliseconds
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u8,
    pub pool_size: usize,
}

/// Chat completion API used to generate jokes
#[derive(Debug, Deserialize, Clone)]
pub struct OpenAISettings {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub empty_retry_delay_ms: u64,
}

/// Acquisition policy knobs
#[derive(Debug, Deserialize, Clone)]
pub struct JokeSettings {
    /// Stored joke count at which the service stops generating and serves existing jokes
    pub serve_threshold: u64,
    pub similarity_threshold: f64,
    pub max_generation_attempts: u32,
    pub acquisition_timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
    pub store_key: String,
    pub cache_prefix: String,
    pub check_duplicates_on_submit: bool,
    /// Jokes generated in the background at startup
    pub seed_count: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.request_timeout", 60000)? // 1 minute
            .set_default("redis.host", "localhost")?
            .set_default("redis.port", 6379)?
            .set_default("redis.db", 0)?
            .set_default("redis.pool_size", 10)?
            .set_default("openai.api_key", "")?
            .set_default("openai.api_base_url", "https://api.openai.com/v1")?
            .set_default("openai.model", "gpt-3.5-turbo")?
            .set_default("openai.timeout_seconds", 30)?
            .set_default("openai.empty_retry_delay_ms", 500)?
            .set_default("jokes.serve_threshold", 20)?
            .set_default("jokes.similarity_threshold", 0.8)?
            .set_default("jokes.max_generation_attempts", 5)?
            .set_default("jokes.acquisition_timeout_seconds", 30)?
            .set_default("jokes.cache_ttl_seconds", 300)? // 5 minutes
            .set_default("jokes.store_key", "jokes:store")?
            .set_default("jokes.cache_prefix", "joke:")?
            .set_default("jokes.check_duplicates_on_submit", false)?
            .set_default("jokes.seed_count", 0)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/config").required(false))
            .add_source(File::with_name(&format!("config/config.{}", run_mode)).required(false));

        // Explicit environment overrides, DADJOKES_<SECTION>__<KEY>
        const OVERRIDES: &[(&str, &str)] = &[
            ("DADJOKES_SERVER__HOST", "server.host"),
            ("DADJOKES_SERVER__PORT", "server.port"),
            ("DADJOKES_SERVER__REQUEST_TIMEOUT", "server.request_timeout"),
            ("DADJOKES_REDIS__HOST", "redis.host"),
            ("DADJOKES_REDIS__PORT", "redis.port"),
            ("DADJOKES_REDIS__PASSWORD", "redis.password"),
            ("DADJOKES_REDIS__DB", "redis.db"),
            ("DADJOKES_REDIS__POOL_SIZE", "redis.pool_size"),
            ("DADJOKES_OPENAI__API_BASE_URL", "openai.api_base_url"),
            ("DADJOKES_OPENAI__MODEL", "openai.model"),
            ("DADJOKES_OPENAI__TIMEOUT_SECONDS", "openai.timeout_seconds"),
            ("DADJOKES_OPENAI__EMPTY_RETRY_DELAY_MS", "openai.empty_retry_delay_ms"),
            ("DADJOKES_JOKES__SERVE_THRESHOLD", "jokes.serve_threshold"),
            ("DADJOKES_JOKES__SIMILARITY_THRESHOLD", "jokes.similarity_threshold"),
            ("DADJOKES_JOKES__MAX_GENERATION_ATTEMPTS", "jokes.max_generation_attempts"),
            (
                "DADJOKES_JOKES__ACQUISITION_TIMEOUT_SECONDS",
                "jokes.acquisition_timeout_seconds",
            ),
            ("DADJOKES_JOKES__CACHE_TTL_SECONDS", "jokes.cache_ttl_seconds"),
            ("DADJOKES_JOKES__STORE_KEY", "jokes.store_key"),
            ("DADJOKES_JOKES__CACHE_PREFIX", "jokes.cache_prefix"),
            (
                "DADJOKES_JOKES__CHECK_DUPLICATES_ON_SUBMIT",
                "jokes.check_duplicates_on_submit",
            ),
            ("DADJOKES_JOKES__SEED_COUNT", "jokes.seed_count"),
            ("DADJOKES_LOGGING__LEVEL", "logging.level"),
            ("DADJOKES_LOGGING__FORMAT", "logging.format"),
        ];
        for (var, key) in OVERRIDES {
            if let Ok(val) = env::var(var) {
                builder = builder.set_override(*key, val)?;
            }
        }

        // The API key keeps its conventional name
        if let Ok(val) = env::var("OPENAI_API_KEY") {
            builder = builder.set_override("openai.api_key", val)?;
        }
        if let Ok(val) = env::var("DADJOKES_OPENAI__API_KEY") {
            builder = builder.set_override("openai.api_key", val)?;
        }

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.openai.api_key.trim().is_empty() {
            return Err("OPENAI_API_KEY environment variable is not set".to_string());
        }

        if !(0.0..=1.0).contains(&self.jokes.similarity_threshold) {
            return Err(format!(
                "Similarity threshold must be within 0.0..=1.0, got {}",
                self.jokes.similarity_threshold
            ));
        }

        if self.jokes.max_generation_attempts == 0 {
            return Err("max_generation_attempts must be greater than 0".to_string());
        }

        if self.jokes.acquisition_timeout_seconds == 0 || self.openai.timeout_seconds == 0 {
            return Err("Timeouts must be greater than 0".to_string());
        }

        if self.jokes.cache_ttl_seconds == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }

        // Validate Redis pool size
        if self.redis.pool_size == 0 {
            return Err("Redis pool size must be greater than 0".to_string());
        }

        // Validate logging level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid logging level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        Ok(())
    }

    /// Get Redis connection string
    pub fn redis_url(&self) -> String {
        match &self.redis.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis.host, self.redis.port, self.redis.db
            ),
            None => format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.db
            ),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl JokeSettings {
    pub fn acquisition_timeout(&self) -> Duration {
        Duration::from_secs(self.acquisition_timeout_seconds)
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: 60000,
        },
        redis: RedisSettings {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            pool_size: 10,
        },
        openai: OpenAISettings {
            api_key: "sk-test".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout_seconds: 30,
            empty_retry_delay_ms: 500,
        },
        jokes: JokeSettings {
            serve_threshold: 20,
            similarity_threshold: 0.8,
            max_generation_attempts: 5,
            acquisition_timeout_seconds: 30,
            cache_ttl_seconds: 300,
            store_key: "jokes:store".to_string(),
            cache_prefix: "joke:".to_string(),
            check_duplicates_on_submit: false,
            seed_count: 0,
        },
        logging: LoggingSettings {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

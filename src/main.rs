use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use dadjokes::routes::{create_joke_router, health_check, ping, AppState, JokeState};
use dadjokes::services::{
    AcquisitionConfig, JokeAcquisitionService, JokeCache, JokeGenerator, JokeStore,
    OpenAIJokeConfig, OpenAIJokeGenerator, RedisJokeCache, RedisJokeStore,
};
use dadjokes::utils::{init_logger, HttpClient};
use dadjokes::{RedisPool, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional, the environment wins either way
    dotenvy::dotenv().ok();

    // Load configuration first (needed for logger initialization)
    let settings = Settings::new()?;

    init_logger(&settings)?;

    info!("🚀 Dad joke service starting...");

    if let Err(e) = settings.validate() {
        error!("❌ Configuration validation failed: {}", e);
        return Err(anyhow::anyhow!("Invalid configuration: {}", e));
    }
    info!("✅ Configuration validated");

    let redis = RedisPool::new(&settings)?;
    match redis.ping().await {
        Ok(_) => info!("✅ Redis connection established"),
        Err(e) => {
            error!("❌ Redis connection failed: {}", e);
            return Err(anyhow::anyhow!("Failed to connect to Redis: {}", e));
        }
    }
    let redis_arc = Arc::new(redis.clone());

    let http_client = HttpClient::new(&settings)?;
    let generator: Arc<dyn JokeGenerator> = Arc::new(OpenAIJokeGenerator::new(
        OpenAIJokeConfig::from(&settings.openai),
        http_client,
    ));
    info!("🤖 Joke generator using model {}", settings.openai.model);

    let store: Arc<dyn JokeStore> =
        Arc::new(RedisJokeStore::from_settings(redis_arc.clone(), &settings.jokes));
    let cache: Arc<dyn JokeCache> =
        Arc::new(RedisJokeCache::from_settings(redis_arc, &settings.jokes));

    let acquisition = Arc::new(JokeAcquisitionService::new(
        AcquisitionConfig::from(&settings.jokes),
        generator,
        store.clone(),
        cache,
    ));
    info!(
        "🎯 Acquisition policy: serve at {} jokes, similarity threshold {}",
        settings.jokes.serve_threshold, settings.jokes.similarity_threshold
    );

    if settings.jokes.seed_count > 0 {
        let seeder = acquisition.clone();
        let count = settings.jokes.seed_count;
        info!("🌱 Seeding {} jokes in the background", count);
        tokio::spawn(async move {
            seeder.seed_jokes(count).await;
        });
    }

    let health_state = Arc::new(AppState {
        redis,
        store,
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/ping", get(ping))
        .with_state(health_state)
        .merge(create_joke_router(JokeState { acquisition }))
        .layer(TraceLayer::new_for_http());

    let bind_addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("🚀 Server ready on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("👋 Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, starting graceful shutdown");
}

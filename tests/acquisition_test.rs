// Acquisition policy integration tests
//
// Exercises the serve-or-generate decision, duplicate rejection, deadline and
// failure handling against in-memory gateways and scripted content sources.

mod common;

use common::doubles::{
    BrokenCache, FailingGenerator, PanickingGenerator, ReadOnlyStore, RepeatingGenerator,
    ScriptedGenerator,
};
use dadjokes::models::JokeOrigin;
use dadjokes::services::{
    AcquisitionConfig, JokeAcquisitionService, JokeCache, JokeStore, MemoryJokeCache,
    MemoryJokeStore,
};
use dadjokes::utils::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

const NOODLE: &str = "What do you call a fake noodle? An impasta.";
const SKELETON: &str = "Why don't skeletons fight each other? They don't have the guts.";
const CALENDAR: &str = "I'm afraid for the calendar. Its days are numbered.";

fn config(serve_threshold: u64) -> AcquisitionConfig {
    AcquisitionConfig {
        serve_threshold,
        ..AcquisitionConfig::default()
    }
}

fn numbered_jokes(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("Joke number {} walks into a bar.", i))
        .collect()
}

#[tokio::test]
async fn test_serves_cached_joke_without_generating() {
    let store = Arc::new(MemoryJokeStore::with_texts(numbered_jokes(20)));
    let cache = Arc::new(MemoryJokeCache::new());
    for joke in store.snapshot().await {
        cache.insert(&joke).await.unwrap();
    }

    let service = JokeAcquisitionService::new(
        config(20),
        Arc::new(PanickingGenerator),
        store.clone(),
        cache.clone(),
    );

    let acquired = service.acquire_joke().await.expect("Acquisition failed");

    assert_eq!(acquired.origin, JokeOrigin::Cache);
    assert!(store.snapshot().await.contains(&acquired.joke));
    assert_eq!(store.count().await.unwrap(), 20);
}

#[tokio::test]
async fn test_partial_cache_is_not_consulted() {
    let store = Arc::new(MemoryJokeStore::with_texts(numbered_jokes(20)));
    let cache = Arc::new(MemoryJokeCache::new());
    let cached = store.random().await.unwrap().unwrap();
    cache.insert(&cached).await.unwrap();

    let service = JokeAcquisitionService::new(
        config(20),
        Arc::new(PanickingGenerator),
        store.clone(),
        cache.clone(),
    );

    let acquired = service.acquire_joke().await.expect("Acquisition failed");

    assert_eq!(acquired.origin, JokeOrigin::Store);
}

#[tokio::test]
async fn test_falls_back_to_store_and_warms_cache() {
    let store = Arc::new(MemoryJokeStore::with_texts(numbered_jokes(5)));
    let cache = Arc::new(MemoryJokeCache::new());

    let service = JokeAcquisitionService::new(
        config(5),
        Arc::new(PanickingGenerator),
        store.clone(),
        cache.clone(),
    );

    let acquired = service.acquire_joke().await.expect("Acquisition failed");

    assert_eq!(acquired.origin, JokeOrigin::Store);
    let id = acquired.joke.id.as_deref().expect("Served joke should have an id");
    assert!(cache.contains(id).await, "Served joke should be cached");

    // Store fallbacks keep warming until the cache mirrors the store
    let mut requests = 1;
    while cache.len().await < 5 {
        let next = service.acquire_joke().await.expect("Acquisition failed");
        assert_eq!(next.origin, JokeOrigin::Store);
        requests += 1;
        assert!(requests < 1_000, "Cache never filled");
    }

    let again = service.acquire_joke().await.expect("Acquisition failed");
    assert_eq!(again.origin, JokeOrigin::Cache);
}

#[tokio::test]
async fn test_serving_draws_from_whole_store() {
    let store = Arc::new(MemoryJokeStore::with_texts(numbered_jokes(20)));
    let cache = Arc::new(MemoryJokeCache::new());

    let service = JokeAcquisitionService::new(
        config(20),
        Arc::new(PanickingGenerator),
        store.clone(),
        cache.clone(),
    );

    let mut served = HashSet::new();
    for _ in 0..400 {
        let acquired = service.acquire_joke().await.expect("Acquisition failed");
        served.insert(acquired.joke.text);
    }

    // 400 uniform draws over 20 jokes miss one with probability below 1e-7
    assert_eq!(served.len(), 20, "served {} distinct jokes", served.len());
}

#[tokio::test]
async fn test_broken_cache_falls_back_to_store() {
    let store = Arc::new(MemoryJokeStore::with_texts([NOODLE]));

    let service = JokeAcquisitionService::new(
        config(1),
        Arc::new(PanickingGenerator),
        store,
        Arc::new(BrokenCache),
    );

    let acquired = service.acquire_joke().await.expect("Acquisition failed");

    assert_eq!(acquired.origin, JokeOrigin::Store);
    assert_eq!(acquired.joke.text, NOODLE);
}

#[tokio::test]
async fn test_nothing_to_serve_is_no_joke_available() {
    let service = JokeAcquisitionService::new(
        config(0),
        Arc::new(PanickingGenerator),
        Arc::new(MemoryJokeStore::new()),
        Arc::new(MemoryJokeCache::new()),
    );

    let err = service.acquire_joke().await.unwrap_err();
    assert!(matches!(err, AppError::NoJokeAvailable(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_generates_below_threshold_and_persists() {
    let store = Arc::new(MemoryJokeStore::with_texts([NOODLE]));
    let cache = Arc::new(MemoryJokeCache::new());
    let generator = Arc::new(ScriptedGenerator::new(&[SKELETON]));

    let service = JokeAcquisitionService::new(config(20), generator.clone(), store.clone(), cache.clone());

    let acquired = service.acquire_joke().await.expect("Acquisition failed");

    assert_eq!(acquired.origin, JokeOrigin::Generated);
    assert_eq!(acquired.joke.text, SKELETON);
    assert!(acquired.joke.is_persisted());
    assert_eq!(generator.calls(), 1);
    assert_eq!(store.count().await.unwrap(), 2);
    assert!(cache.contains(acquired.joke.id.as_deref().unwrap()).await);
}

#[tokio::test]
async fn test_rejects_near_duplicate_and_retries() {
    let store = Arc::new(MemoryJokeStore::with_texts([NOODLE]));
    let generator = Arc::new(ScriptedGenerator::new(&[
        "What do you call a fake noodle? An impasta!",
        CALENDAR,
    ]));

    let service = JokeAcquisitionService::new(
        config(20),
        generator.clone(),
        store.clone(),
        Arc::new(MemoryJokeCache::new()),
    );

    let acquired = service.acquire_joke().await.expect("Acquisition failed");

    assert_eq!(acquired.joke.text, CALENDAR);
    assert_eq!(generator.calls(), 2);
    assert_eq!(
        store.all_texts().await.unwrap(),
        vec![NOODLE.to_string(), CALENDAR.to_string()]
    );
}

#[tokio::test]
async fn test_saturated_content_exhausts_attempts() {
    let store = Arc::new(MemoryJokeStore::with_texts([NOODLE]));
    let generator = Arc::new(RepeatingGenerator::new(NOODLE));

    let service = JokeAcquisitionService::new(
        AcquisitionConfig {
            serve_threshold: 20,
            max_generation_attempts: 4,
            ..AcquisitionConfig::default()
        },
        generator.clone(),
        store.clone(),
        Arc::new(MemoryJokeCache::new()),
    );

    let err = service.acquire_joke().await.unwrap_err();

    assert!(matches!(err, AppError::DuplicateRetriesExhausted(4)), "got {:?}", err);
    assert_eq!(generator.calls(), 4);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_saturated_content_stops_at_deadline() {
    let store = Arc::new(MemoryJokeStore::with_texts([NOODLE]));
    let generator = Arc::new(RepeatingGenerator::with_delay(NOODLE, Duration::from_millis(20)));

    let service = JokeAcquisitionService::new(
        AcquisitionConfig {
            serve_threshold: 20,
            max_generation_attempts: u32::MAX,
            timeout: Duration::from_millis(200),
            ..AcquisitionConfig::default()
        },
        generator.clone(),
        store,
        Arc::new(MemoryJokeCache::new()),
    );

    let started = Instant::now();
    let err = service.acquire_joke().await.unwrap_err();

    assert!(matches!(err, AppError::GenerationTimeout(_)), "got {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(generator.calls() >= 2);
}

#[tokio::test]
async fn test_generation_failure_aborts() {
    let store = Arc::new(MemoryJokeStore::new());

    let service = JokeAcquisitionService::new(
        config(20),
        Arc::new(FailingGenerator),
        store.clone(),
        Arc::new(MemoryJokeCache::new()),
    );

    let err = service.acquire_joke().await.unwrap_err();

    assert!(matches!(err, AppError::GenerationError(_)), "got {:?}", err);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_persistence_failure_is_surfaced() {
    let cache = Arc::new(MemoryJokeCache::new());

    let service = JokeAcquisitionService::new(
        config(20),
        Arc::new(ScriptedGenerator::new(&[SKELETON])),
        Arc::new(ReadOnlyStore {
            inner: MemoryJokeStore::new(),
        }),
        cache.clone(),
    );

    let err = service.acquire_joke().await.unwrap_err();

    assert!(matches!(err, AppError::PersistenceError(_)), "got {:?}", err);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_cache_failure_is_absorbed() {
    let store = Arc::new(MemoryJokeStore::new());

    let service = JokeAcquisitionService::new(
        config(20),
        Arc::new(ScriptedGenerator::new(&[SKELETON])),
        store.clone(),
        Arc::new(BrokenCache),
    );

    let acquired = service.acquire_joke().await.expect("Cache errors must not fail acquisition");

    assert_eq!(acquired.origin, JokeOrigin::Generated);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_threshold_switches_from_generating_to_serving() {
    let store = Arc::new(MemoryJokeStore::new());
    let generator = Arc::new(ScriptedGenerator::new(&[NOODLE, SKELETON, CALENDAR]));

    let service = JokeAcquisitionService::new(
        config(2),
        generator.clone(),
        store.clone(),
        Arc::new(MemoryJokeCache::new()),
    );

    assert_eq!(service.acquire_joke().await.unwrap().origin, JokeOrigin::Generated);
    assert_eq!(service.acquire_joke().await.unwrap().origin, JokeOrigin::Generated);
    assert_eq!(service.acquire_joke().await.unwrap().origin, JokeOrigin::Cache);
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_submit_skips_uniqueness_by_default() {
    let store = Arc::new(MemoryJokeStore::with_texts([NOODLE]));

    let service = JokeAcquisitionService::new(
        config(20),
        Arc::new(PanickingGenerator),
        store.clone(),
        Arc::new(MemoryJokeCache::new()),
    );

    let joke = service
        .submit_joke("What do you call a fake noodle?\nAn impasta!")
        .await
        .expect("Submission failed");

    assert_eq!(joke.text, "What do you call a fake noodle? An impasta!");
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_submit_with_uniqueness_check() {
    let store = Arc::new(MemoryJokeStore::with_texts([NOODLE]));

    let service = JokeAcquisitionService::new(
        AcquisitionConfig {
            check_duplicates_on_submit: true,
            ..AcquisitionConfig::default()
        },
        Arc::new(PanickingGenerator),
        store.clone(),
        Arc::new(MemoryJokeCache::new()),
    );

    let err = service
        .submit_joke("what do you call a fake noodle? an impasta")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateJoke(_)), "got {:?}", err);

    service.submit_joke(CALENDAR).await.expect("Unique joke should be saved");
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_submit_rejects_blank_text() {
    let service = JokeAcquisitionService::new(
        AcquisitionConfig::default(),
        Arc::new(PanickingGenerator),
        Arc::new(MemoryJokeStore::new()),
        Arc::new(MemoryJokeCache::new()),
    );

    let err = service.submit_joke(" \n\t ").await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_seed_saves_generated_jokes_unchecked() {
    let store = Arc::new(MemoryJokeStore::new());
    let generator = Arc::new(RepeatingGenerator::new(NOODLE));

    let service = JokeAcquisitionService::new(
        AcquisitionConfig::default(),
        generator.clone(),
        store.clone(),
        Arc::new(MemoryJokeCache::new()),
    );

    assert_eq!(service.seed_jokes(3).await, 3);
    assert_eq!(store.count().await.unwrap(), 3);
    assert_eq!(generator.calls(), 3);
}

pub mod acquisition;
pub mod joke_generator;
pub mod joke_store;
pub mod memory_store;

pub use acquisition::{AcquisitionConfig, JokeAcquisitionService};
pub use joke_generator::{JokeGenerator, OpenAIJokeConfig, OpenAIJokeGenerator, JOKE_PROMPT};
pub use joke_store::{JokeCache, JokeStore, RedisJokeCache, RedisJokeStore};
pub use memory_store::{MemoryJokeCache, MemoryJokeStore};

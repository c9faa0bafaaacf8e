pub mod config;
pub mod models;
pub mod redis;
pub mod routes;
pub mod services;
pub mod utils;

pub use crate::config::Settings;
pub use crate::redis::RedisPool;

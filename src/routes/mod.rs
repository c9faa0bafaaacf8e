pub mod health;
pub mod jokes;

pub use health::{health_check, ping, AppState};
pub use jokes::{create_router as create_joke_router, JokeState};

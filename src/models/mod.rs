pub mod joke;

pub use joke::{AcquiredJoke, Joke, JokeOrigin};

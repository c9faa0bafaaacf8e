use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A joke, with an identifier once the store has accepted it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joke {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Joke {
    /// A proposed joke that has not been persisted yet
    pub fn proposed(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            created_at: None,
        }
    }

    /// A joke as the store records it
    pub fn persisted(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Where an acquired joke came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JokeOrigin {
    Cache,
    Store,
    Generated,
}

/// Result of a successful acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredJoke {
    pub joke: Joke,
    pub origin: JokeOrigin,
}

impl AcquiredJoke {
    pub fn new(joke: Joke, origin: JokeOrigin) -> Self {
        Self { joke, origin }
    }
}

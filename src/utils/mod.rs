pub mod error;
pub mod http_client;
pub mod logger;
pub mod similarity;

pub use error::{AppError, Result};
pub use http_client::HttpClient;
pub use logger::init_logger;
pub use similarity::{is_similar, similarity_score, DEFAULT_SIMILARITY_THRESHOLD};

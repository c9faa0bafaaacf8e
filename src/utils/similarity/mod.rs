//! Near-duplicate detection for joke texts
//!
//! # Architecture
//!
//! - `normalizer`: case, whitespace and punctuation folding
//! - `algorithm`: Levenshtein distance and the similarity score
//!
//! # Usage
//!
//! ```rust
//! use dadjokes::utils::similarity::{is_similar, DEFAULT_SIMILARITY_THRESHOLD};
//!
//! assert!(is_similar(
//!     "Why did the chicken cross the road?",
//!     "Why did the chicken cross the road!",
//!     DEFAULT_SIMILARITY_THRESHOLD,
//! ));
//! ```

pub mod algorithm;
pub mod normalizer;

pub use algorithm::{find_similar, is_similar, levenshtein, similarity_score};
pub use normalizer::{collapse_whitespace, normalize_text};

/// Score at or above which two jokes count as duplicates
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

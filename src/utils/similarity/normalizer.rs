//! Text normalization for joke comparison
//!
//! Provides the folding applied before edit distance is computed, and the
//! whitespace cleanup applied to every generated or submitted joke.

/// Normalize text for comparison
///
/// Performs the following transformations:
/// 1. Lowercases
/// 2. Collapses whitespace runs into single spaces and trims
/// 3. Drops every character that is neither alphanumeric nor a space
///
/// # Examples
///
/// ```
/// use dadjokes::utils::similarity::normalize_text;
///
/// assert_eq!(normalize_text("  Why?\n\tBecause!  "), "why because");
/// ```
pub fn normalize_text(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect()
}

/// Collapse consecutive whitespace characters into single spaces
///
/// Handles spaces, tabs, newlines, and other whitespace characters.
///
/// # Examples
///
/// ```
/// use dadjokes::utils::similarity::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("hello  \t\n  world"), "hello world");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

//! Edit-distance similarity between two joke texts
//!
//! Score formula: `1 - levenshtein(norm(a), norm(b)) / max(len(a), len(b))`
//!
//! Distance is taken over the normalized texts, while the denominator uses the
//! raw character counts. Punctuation or whitespace padding therefore lowers the
//! relative weight of an edit: `"abc!!!!!!!"` vs `"abd"` scores 0.9 although
//! `"abc"` vs `"abd"` scores about 0.67.

use super::normalizer::normalize_text;

/// Levenshtein distance with unit costs, counted in Unicode scalar values
///
/// # Examples
///
/// ```
/// use dadjokes::utils::similarity::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity score in `0.0..=1.0`; two empty strings score 1.0
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(&normalize_text(a), &normalize_text(b));
    1.0 - distance as f64 / max_len as f64
}

/// Whether two texts are near-duplicates at the given threshold
///
/// # Examples
///
/// ```
/// use dadjokes::utils::similarity::is_similar;
///
/// assert!(is_similar("Why did the chicken cross the road?", "Why did the chicken cross the road!", 0.8));
/// assert!(!is_similar("Why did the chicken cross the road?", "The sky is blue today.", 0.8));
/// ```
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    similarity_score(a, b) >= threshold
}

/// First text in `existing` that `candidate` is similar to
pub fn find_similar<'a, I>(candidate: &str, existing: I, threshold: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .find(|text| is_similar(candidate, text, threshold))
}

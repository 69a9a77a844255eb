//! Slug generation and validation.
//!
//! Slugs use the URL-safe alphabet `[A-Za-z0-9_-]`, so they can be placed in
//! a path segment or query string without escaping.

use rand::Rng;

/// Length of generated slugs.
pub const SLUG_LENGTH: usize = 6;

/// URL-safe alphabet used for generated slugs (64 symbols).
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generates a random 6-character slug.
///
/// Uniqueness is not guaranteed here; the repository rejects duplicates on
/// insert and the service retries.
///
/// # Examples
///
/// ```
/// use slug_shortener::utils::slug::{generate_slug, is_valid_slug};
///
/// let slug = generate_slug();
/// assert_eq!(slug.len(), 6);
/// assert!(is_valid_slug(&slug));
/// ```
pub fn generate_slug() -> String {
    let mut rng = rand::rng();

    (0..SLUG_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Returns `true` when `candidate` is a non-empty string of ASCII letters,
/// digits, hyphens and underscores.
///
/// # Examples
///
/// ```
/// use slug_shortener::utils::slug::is_valid_slug;
///
/// assert!(is_valid_slug("promo_2024-q1"));
/// assert!(!is_valid_slug("has space"));
/// assert!(!is_valid_slug(""));
/// ```
pub fn is_valid_slug(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

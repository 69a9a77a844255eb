//! URL mapping entity.

use chrono::{DateTime, Utc};

/// A stored mapping from a slug to its redirect target.
///
/// `slug`, `original_url` and `created_at` are fixed at creation. Only
/// `visits` changes afterwards, and only upward in steps of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub slug: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub visits: i64,
}

impl UrlMapping {
    /// Creates a new UrlMapping instance.
    pub fn new(
        slug: String,
        original_url: String,
        created_at: DateTime<Utc>,
        visits: i64,
    ) -> Self {
        Self {
            slug,
            original_url,
            created_at,
            visits,
        }
    }
}

/// Input data for creating a new mapping.
#[derive(Debug, Clone)]
pub struct NewUrlMapping {
    pub slug: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl NewUrlMapping {
    /// Stamps the mapping with the current time.
    pub fn new(slug: String, original_url: String) -> Self {
        Self {
            slug,
            original_url,
            created_at: Utc::now(),
        }
    }

    /// A freshly created mapping starts with zero visits.
    pub fn into_mapping(self) -> UrlMapping {
        UrlMapping::new(self.slug, self.original_url, self.created_at, 0)
    }
}

/// What a successful resolve returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub original_url: String,
    /// Visit count after this resolve was counted.
    pub visits: i64,
    pub created_at: DateTime<Utc>,
}

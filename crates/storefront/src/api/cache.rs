//! Cache types for API responses that change rarely.

use super::types::{CategorySection, Navigation};

/// Cache key for shared, user-independent documents.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Navigation,
    CategorySections,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Navigation(Navigation),
    CategorySections(Vec<CategorySection>),
}

//! Navigation, home page sections, products and search.

use macstorm_core::ProductId;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::client::segment;
use super::de;
use super::types::{Autocomplete, CategorySection, Navigation, Product, SearchResults};
use super::{ApiClient, ApiError};
use crate::catalog::ProductFilters;

/// Default number of autocomplete entries requested.
pub const AUTOCOMPLETE_LIMIT: u32 = 8;

#[derive(Deserialize)]
struct NavigationEnvelope {
    #[serde(default)]
    navigation: Navigation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionsEnvelope {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    category_sections: Vec<CategorySection>,
}

#[derive(Deserialize)]
struct ProductsEnvelope {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct ProductEnvelope {
    product: Product,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: Option<T>,
}

impl ApiClient {
    /// The navigation menu tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn navigation(&self) -> Result<Navigation, ApiError> {
        if let Some(CacheValue::Navigation(nav)) = self.cache().get(&CacheKey::Navigation).await {
            debug!("Cache hit for navigation");
            return Ok(nav);
        }

        let envelope: NavigationEnvelope = self.get("navigation", None).await?;
        self.cache()
            .insert(
                CacheKey::Navigation,
                CacheValue::Navigation(envelope.navigation.clone()),
            )
            .await;
        Ok(envelope.navigation)
    }

    /// Home page sections with their category tiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn category_sections(&self) -> Result<Vec<CategorySection>, ApiError> {
        if let Some(CacheValue::CategorySections(sections)) =
            self.cache().get(&CacheKey::CategorySections).await
        {
            debug!("Cache hit for category sections");
            return Ok(sections);
        }

        let envelope: SectionsEnvelope = self.get("category-sections", None).await?;
        self.cache()
            .insert(
                CacheKey::CategorySections,
                CacheValue::CategorySections(envelope.category_sections.clone()),
            )
            .await;
        Ok(envelope.category_sections)
    }

    /// The full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        let envelope: ProductsEnvelope = self.get("products", None).await?;
        Ok(envelope.products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let envelope: ProductEnvelope = self
            .get(&format!("products/{}", segment(id.as_str())), None)
            .await?;
        Ok(envelope.product)
    }

    /// Full-text search with optional facet filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, filters), fields(active_filters = filters.active_count()))]
    pub async fn search(
        &self,
        query: &str,
        filters: &ProductFilters,
    ) -> Result<SearchResults, ApiError> {
        let params = filters.search_params(query);
        let envelope: DataEnvelope<SearchResults> =
            self.get_query("search", &params, None).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Suggestions for the search box.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn autocomplete(&self, query: &str, limit: u32) -> Result<Autocomplete, ApiError> {
        let limit = limit.to_string();
        let params = [
            ("q", query),
            ("autocomplete", "true"),
            ("suggest", "true"),
            ("limit", limit.as_str()),
        ];
        let envelope: DataEnvelope<Autocomplete> =
            self.get_query("search", &params, None).await?;
        Ok(envelope.data.unwrap_or_default())
    }
}

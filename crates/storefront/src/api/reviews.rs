//! Product reviews.

use macstorm_core::ProductId;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;

use super::client::segment;
use super::de;
use super::types::{Ack, Review, ReviewImage};
use super::{ApiClient, ApiError, SessionToken};

/// Most photos a single review may carry.
pub const MAX_REVIEW_IMAGES: usize = 5;

/// `GET /reviews/{id}` returns a bare array.
#[derive(Deserialize)]
struct ReviewList(#[serde(deserialize_with = "de::skip_invalid")] Vec<Review>);

/// A review ready to upload.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: ProductId,
    pub rating: u32,
    pub comment: String,
    pub images: Vec<ReviewImage>,
}

impl ApiClient {
    /// Reviews for a product, newest as the backend orders them.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn reviews(&self, product: &ProductId) -> Result<Vec<Review>, ApiError> {
        let list: ReviewList = self
            .get(&format!("reviews/{}", segment(product.as_str())), None)
            .await?;
        Ok(list.0)
    }

    /// Upload a review as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns an error if an image has an invalid content type or the
    /// request fails.
    #[instrument(skip(self, token, review), fields(product_id = %review.product_id, images = review.images.len()))]
    pub async fn submit_review(
        &self,
        review: NewReview,
        token: Option<&SessionToken>,
    ) -> Result<Ack, ApiError> {
        let mut form = Form::new()
            .text("productId", review.product_id.into_inner())
            .text("rating", review.rating.to_string())
            .text("comment", review.comment);

        for image in review.images.into_iter().take(MAX_REVIEW_IMAGES) {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }

        self.post_multipart("reviews", form, token).await
    }
}

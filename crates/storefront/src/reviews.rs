//! Review summaries and submission checks.

use thiserror::Error;

use crate::api::types::Review;
use crate::api::MAX_REVIEW_IMAGES;

pub const REVIEW_SUBMITTED: &str = "Review submitted successfully!";
pub const REVIEW_FAILED: &str = "Failed to submit review";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Please select a rating")]
    MissingRating,
    #[error("Please write a review comment")]
    MissingComment,
    #[error("You can only upload up to 5 images")]
    TooManyImages,
}

/// Average and per-star counts for a product's reviews.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub average: f64,
    pub total: usize,
    /// Counts for 5 down to 1 stars.
    pub distribution: [(u32, usize); 5],
}

impl ReviewSummary {
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut distribution = [(5, 0), (4, 0), (3, 0), (2, 0), (1, 0)];
        let mut sum = 0_u64;
        for review in reviews {
            sum += u64::from(review.rating);
            if let Some(slot) = distribution.iter_mut().find(|(stars, _)| *stars == review.rating) {
                slot.1 += 1;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let average = if reviews.is_empty() {
            0.0
        } else {
            sum as f64 / reviews.len() as f64
        };
        Self {
            average,
            total: reviews.len(),
            distribution,
        }
    }

    /// Average to one decimal place, e.g. `4.3`.
    #[must_use]
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average)
    }

    /// Share of reviews with `count` entries, as a whole percentage.
    #[must_use]
    pub fn percent(&self, count: usize) -> usize {
        if self.total == 0 {
            0
        } else {
            count * 100 / self.total
        }
    }
}

/// Check a review before it is uploaded.
///
/// # Errors
///
/// Returns the first failing [`ReviewError`].
pub fn validate_review(rating: u32, comment: &str, images: usize) -> Result<(), ReviewError> {
    if !(1..=5).contains(&rating) {
        return Err(ReviewError::MissingRating);
    }
    if comment.trim().is_empty() {
        return Err(ReviewError::MissingComment);
    }
    if images > MAX_REVIEW_IMAGES {
        return Err(ReviewError::TooManyImages);
    }
    Ok(())
}

/// Filled, half and empty star counts for a rating out of 5.
#[must_use]
pub fn stars(rating: f64) -> (usize, bool, usize) {
    let clamped = rating.clamp(0.0, 5.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let full = clamped.floor() as usize;
    let half = clamped - clamped.floor() >= 0.5;
    let empty = 5 - full - usize::from(half);
    (full, half, empty)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reviews(ratings: &[u32]) -> Vec<Review> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, r)| {
                serde_json::from_value(json!({"_id": format!("r{i}"), "rating": r, "comment": "ok"}))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_summary() {
        let summary = ReviewSummary::from_reviews(&reviews(&[5, 4, 4, 1]));
        assert!((summary.average - 3.5).abs() < f64::EPSILON);
        assert_eq!(summary.average_label(), "3.5");
        assert_eq!(summary.distribution[1], (4, 2));
        assert_eq!(summary.distribution[4], (1, 1));
        assert_eq!(summary.percent(2), 50);
    }

    #[test]
    fn test_empty_summary() {
        let summary = ReviewSummary::from_reviews(&[]);
        assert!(summary.average.abs() < f64::EPSILON);
        assert_eq!(summary.percent(0), 0);
    }

    #[test]
    fn test_validate_review() {
        assert_eq!(validate_review(0, "nice", 0), Err(ReviewError::MissingRating));
        assert_eq!(validate_review(6, "nice", 0), Err(ReviewError::MissingRating));
        assert_eq!(validate_review(4, "  ", 0), Err(ReviewError::MissingComment));
        assert_eq!(validate_review(4, "nice", 6), Err(ReviewError::TooManyImages));
        assert!(validate_review(4, "nice", 5).is_ok());
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(4.5), (4, true, 0));
        assert_eq!(stars(3.2), (3, false, 2));
        assert_eq!(stars(0.0), (0, false, 5));
        assert_eq!(stars(7.0), (5, false, 0));
    }
}

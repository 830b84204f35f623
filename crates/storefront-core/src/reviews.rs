use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

pub const MAX_COMMENT_CHARS: usize = 2000;

/// A persisted product review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    /// Not referentially enforced against the catalog.
    pub product_id: i64,
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default)]
    pub review_image: Option<ReviewImage>,
    pub rating: u8,
    pub comment: String,
    /// Assigned by the datastore. Records written before the server stamp
    /// landed decode as the Unix epoch and sort last.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// Metadata about an image attached to a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewImage {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub last_modified: Option<i64>,
    /// Client-side data URL preview. Accepted on input, never persisted.
    #[serde(default, skip_serializing)]
    pub preview_url: Option<String>,
}

/// Identity of the reviewer, copied onto the review at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAuthor {
    pub user_id: String,
    pub user_name: String,
    pub user_image: Option<String>,
}

/// A review as submitted, before the datastore assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: i64,
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default)]
    pub review_image: Option<ReviewImage>,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    #[must_use]
    pub fn new(
        product_id: i64,
        author: ReviewAuthor,
        rating: u8,
        comment: impl Into<String>,
        review_image: Option<ReviewImage>,
    ) -> Self {
        Self {
            product_id,
            user_id: author.user_id,
            user_name: author.user_name,
            user_image: author.user_image,
            review_image: review_image.map(|mut image| {
                image.preview_url = None;
                image
            }),
            rating,
            comment: comment.into().trim().to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError`] for an out-of-range rating or an empty/oversized comment.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=5).contains(&self.rating) {
            return Err(CoreError::InvalidRating(self.rating));
        }
        if self.comment.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "comment" });
        }
        if self.comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(CoreError::FieldTooLong {
                field: "comment",
                max: MAX_COMMENT_CHARS,
            });
        }
        if self.user_id.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "userId" });
        }
        Ok(())
    }

    #[must_use]
    pub fn into_review(self, id: String, created_at: DateTime<Utc>) -> Review {
        Review {
            id,
            product_id: self.product_id,
            user_id: self.user_id,
            user_name: self.user_name,
            user_image: self.user_image,
            review_image: self.review_image,
            rating: self.rating,
            comment: self.comment,
            created_at,
        }
    }
}

/// Sorts reviews newest first. Ties keep their relative order.
pub fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Aggregate rating computed on read from a set of reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
    /// Number of reviews per star, index 0 = one star.
    pub distribution: [u32; 5],
}

impl RatingSummary {
    #[must_use]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut summary = RatingSummary::default();
        let mut sum = 0u64;

        for review in reviews.iter().filter(|r| (1..=5).contains(&r.rating)) {
            summary.distribution[usize::from(review.rating - 1)] += 1;
            summary.count += 1;
            sum += u64::from(review.rating);
        }

        if summary.count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let average = sum as f64 / f64::from(summary.count);
            summary.average = average;
        }

        summary
    }
}

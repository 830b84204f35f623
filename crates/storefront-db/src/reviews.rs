//! Review access on top of any [`Datastore`].

use storefront_core::{sort_newest_first, NewReview, Review};

use crate::store::{newest_first_with_fallback, Datastore};
use crate::StoreError;

/// Validates and persists a review. Write failures are logged and returned
/// to the caller; nothing is retried.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] for a rejected review, or the backend error.
pub async fn create_review(store: &dyn Datastore, review: NewReview) -> Result<Review, StoreError> {
    review.validate()?;
    match store.insert_review(&review).await {
        Ok(saved) => {
            tracing::info!(review_id = %saved.id, product_id = saved.product_id, "review created");
            Ok(saved)
        }
        Err(e) => {
            tracing::error!(product_id = review.product_id, error = %e, "failed to create review");
            Err(e)
        }
    }
}

/// Reviews for one product, newest first.
///
/// # Errors
///
/// Returns any backend error other than a missing sort index.
pub async fn list_reviews_by_product(
    store: &dyn Datastore,
    product_id: i64,
) -> Result<Vec<Review>, StoreError> {
    newest_first_with_fallback(
        "reviews",
        move |order| store.query_reviews(Some(product_id), order),
        sort_newest_first,
    )
    .await
}

/// Same as [`list_reviews_by_product`], but a failed read yields an empty
/// list so the product page still renders.
pub async fn list_reviews_for_display(store: &dyn Datastore, product_id: i64) -> Vec<Review> {
    match list_reviews_by_product(store, product_id).await {
        Ok(reviews) => reviews,
        Err(e) => {
            tracing::warn!(product_id, error = %e, "review read failed; showing none");
            Vec::new()
        }
    }
}

/// Every review across all products, newest first.
///
/// # Errors
///
/// Returns any backend error other than a missing sort index.
pub async fn list_all_reviews(store: &dyn Datastore) -> Result<Vec<Review>, StoreError> {
    newest_first_with_fallback(
        "reviews",
        move |order| store.query_reviews(None, order),
        sort_newest_first,
    )
    .await
}

/// # Errors
///
/// Returns [`StoreError::NotFound`] if no review has this id.
pub async fn delete_review(store: &dyn Datastore, id: &str) -> Result<(), StoreError> {
    store.delete_review(id).await?;
    tracing::info!(review_id = %id, "review deleted");
    Ok(())
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;

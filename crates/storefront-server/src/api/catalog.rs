//! Assembles the merged catalog from the product API, the supplemental list
//! and the datastore's custom products.

use storefront_catalog::CatalogError;
use storefront_core::{merge_catalog, Product};
use storefront_db::{get_custom_product, list_custom_products};

use super::AppState;

/// Every product, including inactive ones. An unreachable product API
/// yields an empty listing.
pub(super) async fn merged_catalog(state: &AppState) -> Vec<Product> {
    let (api, custom) = tokio::join!(
        state.product_api.fetch_products(),
        list_custom_products(state.store.as_ref()),
    );

    match api {
        Ok(api) => merge_catalog(api, state.supplemental.as_ref().clone(), custom),
        Err(e) => {
            tracing::warn!(error = %e, "product API fetch failed; serving empty catalog");
            Vec::new()
        }
    }
}

/// Resolves one product: custom record, then product API, then supplemental.
/// Read failures on either remote source fall through to the next one.
pub(super) async fn find_product(state: &AppState, id: i64) -> Option<Product> {
    match get_custom_product(state.store.as_ref(), id).await {
        Ok(Some(product)) => return Some(product),
        Ok(None) => {}
        Err(e) => tracing::warn!(product_id = id, error = %e, "custom product read failed"),
    }

    match state.product_api.fetch_product(id).await {
        Ok(product) => return Some(product),
        Err(CatalogError::NotFound(_)) => {}
        Err(e) => tracing::warn!(product_id = id, error = %e, "product API fetch failed"),
    }

    state.supplemental.iter().find(|p| p.id == id).cloned()
}

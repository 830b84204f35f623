//! Admin-authored ("custom") product access on top of any [`Datastore`].

use storefront_core::Product;

use crate::store::Datastore;
use crate::StoreError;

/// Custom products for merging into the catalog. A failed read yields an
/// empty list; the external and supplemental products still show.
pub async fn list_custom_products(store: &dyn Datastore) -> Vec<Product> {
    match store.list_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(backend = store.backend(), error = %e, "custom product read failed");
            Vec::new()
        }
    }
}

/// # Errors
///
/// Returns the backend error; a missing product is `Ok(None)`.
pub async fn get_custom_product(
    store: &dyn Datastore,
    id: i64,
) -> Result<Option<Product>, StoreError> {
    store.get_product(id).await
}

/// Writes the full product record, creating or replacing it.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] if the product fails validation, or the
/// backend error.
pub async fn save_product(store: &dyn Datastore, product: &Product) -> Result<(), StoreError> {
    product.validate()?;
    if let Err(e) = store.upsert_product(product).await {
        tracing::error!(product_id = product.id, error = %e, "failed to save product");
        return Err(e);
    }
    tracing::info!(product_id = product.id, active = product.is_active, "product saved");
    Ok(())
}

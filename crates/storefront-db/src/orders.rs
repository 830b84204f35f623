//! Order access on top of any [`Datastore`].

use storefront_core::{sort_orders_newest_first, NewOrder, Order, OrderStatus};

use crate::store::{newest_first_with_fallback, Datastore};
use crate::StoreError;

/// Persists a placed order. The caller builds it with [`NewOrder::from_cart`],
/// which snapshots the items and computes the total.
///
/// # Errors
///
/// Returns [`StoreError::Invalid`] for an empty order, or the backend error.
pub async fn create_order(store: &dyn Datastore, order: NewOrder) -> Result<Order, StoreError> {
    if order.items.is_empty() {
        return Err(StoreError::Invalid(storefront_core::CoreError::EmptyOrder));
    }
    match store.insert_order(&order).await {
        Ok(saved) => {
            tracing::info!(
                order_id = %saved.id,
                user_id = %saved.user_id,
                total = %saved.total_amount,
                items = saved.items.len(),
                "order created"
            );
            Ok(saved)
        }
        Err(e) => {
            tracing::error!(user_id = %order.user_id, error = %e, "failed to create order");
            Err(e)
        }
    }
}

/// # Errors
///
/// Returns the backend error; a missing order is `Ok(None)`.
pub async fn get_order(store: &dyn Datastore, id: &str) -> Result<Option<Order>, StoreError> {
    store.get_order(id).await
}

/// A user's orders, newest first.
///
/// # Errors
///
/// Returns any backend error other than a missing sort index.
pub async fn list_orders_by_user(
    store: &dyn Datastore,
    user_id: &str,
) -> Result<Vec<Order>, StoreError> {
    newest_first_with_fallback(
        "orders",
        move |order| store.query_orders(Some(user_id), order),
        sort_orders_newest_first,
    )
    .await
}

/// Every order, newest first.
///
/// # Errors
///
/// Returns any backend error other than a missing sort index.
pub async fn list_all_orders(store: &dyn Datastore) -> Result<Vec<Order>, StoreError> {
    newest_first_with_fallback(
        "orders",
        move |order| store.query_orders(None, order),
        sort_orders_newest_first,
    )
    .await
}

/// Sets an order's status. Any status may follow any other.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if no order has this id.
pub async fn update_order_status(
    store: &dyn Datastore,
    id: &str,
    status: OrderStatus,
) -> Result<Order, StoreError> {
    let order = store.update_order_status(id, status).await?;
    tracing::info!(order_id = %id, status = %status, "order status updated");
    Ok(order)
}

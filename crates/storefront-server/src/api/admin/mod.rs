//! Admin handlers. Every route here sits behind `require_admin_auth`.
//!
//! - `GET  /api/v1/admin/products`              - full catalog, inactive included
//! - `POST /api/v1/admin/products`              - author a product (next free id)
//! - `PUT  /api/v1/admin/products/{id}`         - replace a product record
//! - `PATCH /api/v1/admin/products/{id}/active` - soft-delete or restore
//! - `GET  /api/v1/admin/reviews`               - all reviews with a rating summary
//! - `DELETE /api/v1/admin/reviews/{id}`        - hard delete
//! - `GET  /api/v1/admin/orders`                - all orders, newest first
//! - `PATCH /api/v1/admin/orders/{id}/status`   - overwrite the order status

mod orders;
mod products;
mod reviews;

pub(super) use orders::{list_orders, update_order_status};
pub(super) use products::{create_product, list_all_products, set_product_active, update_product};
pub(super) use reviews::{delete_review, list_reviews};

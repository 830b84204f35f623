//! `orders`: read-only order listing.

use storefront_core::Order;
use storefront_db::Datastore;

/// # Errors
///
/// Returns an error if the datastore query fails.
pub(crate) async fn run_list_orders(
    store: &dyn Datastore,
    user_filter: Option<&str>,
) -> anyhow::Result<()> {
    let orders = match user_filter {
        Some(user_id) => storefront_db::list_orders_by_user(store, user_id).await?,
        None => storefront_db::list_all_orders(store).await?,
    };

    if orders.is_empty() {
        println!(
            "no orders found{}",
            user_filter
                .map(|u| format!(" for user '{u}'"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "{:<34}{:<18}{:<24}{:>7}{:>12}  STATUS",
        "ID", "CREATED", "USER", "ITEMS", "TOTAL"
    );
    for order in &orders {
        println!("{}", format_row(order));
    }

    Ok(())
}

fn format_row(order: &Order) -> String {
    let created = order.created_at.format("%Y-%m-%d %H:%M").to_string();
    format!(
        "{:<34}{:<18}{:<24}{:>7}{:>12.2}  {}",
        order.id,
        created,
        order.user_id,
        order.item_count(),
        order.total_amount,
        order.status
    )
}

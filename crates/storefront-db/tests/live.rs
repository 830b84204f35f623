//! Live integration tests for `PgStore` using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. They need `DATABASE_URL` pointing at a server the
//! harness can create databases on, so they are ignored by default:
//! `cargo test -p storefront-db --test live -- --ignored`.

use chrono::Utc;
use rust_decimal::Decimal;
use storefront_core::{
    Address, CardBrand, CartLine, NewOrder, NewReview, OrderStatus, PaymentInfo, Product, Rating,
    ReviewAuthor, ReviewImage,
};
use storefront_db::{
    create_order, create_review, delete_review, get_order, list_all_orders, list_custom_products,
    list_orders_by_user, list_reviews_by_product, save_product, update_order_status, PgStore,
    StoreError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn author(user_id: &str) -> ReviewAuthor {
    ReviewAuthor {
        user_id: user_id.to_string(),
        user_name: format!("User {user_id}"),
        user_image: None,
    }
}

fn address() -> Address {
    Address {
        full_name: "Sam Lee".to_string(),
        street_address: "1 King St".to_string(),
        city: "Toronto".to_string(),
        state: "ON".to_string(),
        zip_code: "M5H".to_string(),
        country: "CA".to_string(),
        phone_number: "+1 416 000 0000".to_string(),
    }
}

fn cart_line(id: i64, price: Decimal, quantity: u32) -> CartLine {
    CartLine {
        id,
        title: format!("Product {id}"),
        price,
        description: "desc".to_string(),
        category: "Home".to_string(),
        image: Some(format!("https://img.example.com/{id}.jpg")),
        rating: Rating::default(),
        quantity,
    }
}

fn placed(user_id: &str) -> NewOrder {
    NewOrder::from_cart(
        user_id,
        "Sam",
        &[
            cart_line(1, Decimal::new(1250, 2), 2),
            cart_line(2, Decimal::from(5), 1),
        ],
        address(),
        None,
        "card",
        Some(PaymentInfo {
            card_brand: CardBrand::Mastercard,
            last_four: "5454".to_string(),
            payment_completed: false,
            payment_completed_at: None,
        }),
        Utc::now(),
    )
    .expect("valid order")
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres (DATABASE_URL)"]
async fn review_create_list_delete(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);

    let image = ReviewImage {
        name: "unboxing.jpg".to_string(),
        size: 52_000,
        content_type: "image/jpeg".to_string(),
        last_modified: Some(1_717_000_000_000),
        preview_url: Some("data:image/jpeg;base64,AAAA".to_string()),
    };
    let first = create_review(&store, NewReview::new(9, author("a"), 5, "Loved it", Some(image)))
        .await
        .expect("create first");
    create_review(&store, NewReview::new(9, author("b"), 2, "Broke fast", None))
        .await
        .expect("create second");
    create_review(&store, NewReview::new(10, author("c"), 4, "Fine", None))
        .await
        .expect("create other");

    let reviews = list_reviews_by_product(&store, 9).await.expect("list");
    assert_eq!(reviews.len(), 2);
    assert!(reviews[0].created_at >= reviews[1].created_at);
    let stored_image = reviews
        .iter()
        .find(|r| r.id == first.id)
        .and_then(|r| r.review_image.clone())
        .expect("image metadata persisted");
    assert!(stored_image.preview_url.is_none());

    delete_review(&store, &first.id).await.expect("delete");
    assert_eq!(list_reviews_by_product(&store, 9).await.unwrap().len(), 1);
    assert!(matches!(
        delete_review(&store, &first.id).await,
        Err(StoreError::NotFound)
    ));
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres (DATABASE_URL)"]
async fn order_lifecycle(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);

    let saved = create_order(&store, placed("u1")).await.expect("create");
    assert_eq!(saved.total_amount, Decimal::from(30));
    assert_eq!(saved.status, OrderStatus::Pending);

    let fetched = get_order(&store, &saved.id).await.unwrap().expect("exists");
    assert_eq!(fetched.items, saved.items);
    assert_eq!(fetched.payment_info, saved.payment_info);

    create_order(&store, placed("u2")).await.expect("create other user");
    assert_eq!(list_orders_by_user(&store, "u1").await.unwrap().len(), 1);
    assert_eq!(list_all_orders(&store).await.unwrap().len(), 2);

    let updated = update_order_status(&store, &saved.id, OrderStatus::Shipped)
        .await
        .expect("update");
    assert_eq!(updated.status, OrderStatus::Shipped);
    assert!(get_order(&store, "not-a-uuid").await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres (DATABASE_URL)"]
async fn product_upsert_replaces_record(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let mut product = Product {
        id: 21,
        title: "Standing Desk".to_string(),
        price: Decimal::new(39900, 2),
        description: "Electric lift".to_string(),
        category: "Furniture".to_string(),
        image: Some("https://img.example.com/desk.jpg".to_string()),
        rating: Rating { rate: 4.5, count: 12 },
        is_active: true,
    };

    save_product(&store, &product).await.expect("insert");
    product.is_active = false;
    product.price = Decimal::new(34900, 2);
    save_product(&store, &product).await.expect("update");

    let products = list_custom_products(&store).await;
    assert_eq!(products.len(), 1);
    assert!(!products[0].is_active);
    assert_eq!(products[0].price, Decimal::new(34900, 2));
    assert_eq!(products[0].rating.count, 12);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres (DATABASE_URL)"]
async fn sub_cent_prices_and_totals_are_stored_exactly(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let price = Decimal::new(19_999, 3);

    let product = Product {
        id: 22,
        title: "Bulk Screws".to_string(),
        price,
        description: "Priced per screw".to_string(),
        category: "Hardware".to_string(),
        image: None,
        rating: Rating::default(),
        is_active: true,
    };
    save_product(&store, &product).await.expect("insert");
    let products = list_custom_products(&store).await;
    assert_eq!(products[0].price, price);

    let order = NewOrder::from_cart(
        "u1",
        "Sam",
        &[cart_line(22, price, 3)],
        address(),
        None,
        "card",
        None,
        Utc::now(),
    )
    .expect("valid order");
    assert_eq!(order.total_amount, Decimal::new(59_997, 3));

    let saved = create_order(&store, order).await.expect("create");
    let fetched = get_order(&store, &saved.id).await.unwrap().expect("exists");
    assert_eq!(fetched.total_amount, Decimal::new(59_997, 3));
    assert_eq!(fetched.items[0].price, price);
}

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::CoreError;

/// Days added to the order time to produce the delivery estimate.
pub const ESTIMATED_DELIVERY_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Confirmed,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "confirmed" => Ok(OrderStatus::Confirmed),
            other => Err(CoreError::UnknownOrderStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone_number: String,
}

impl Address {
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyField`] for the first missing required field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("fullName", &self.full_name),
            ("streetAddress", &self.street_address),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::EmptyField { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    #[serde(rename = "American Express")]
    AmericanExpress,
    Other,
}

/// Card metadata kept with an order. Only the brand and last four digits are
/// ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    #[serde(rename = "cardType")]
    pub card_brand: CardBrand,
    #[serde(rename = "cardLastFour")]
    pub last_four: String,
    #[serde(default)]
    pub payment_completed: bool,
    #[serde(default)]
    pub payment_completed_at: Option<DateTime<Utc>>,
}

impl PaymentInfo {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCardLastFour`] unless `last_four` is four ASCII digits.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.last_four.len() == 4 && self.last_four.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(CoreError::InvalidCardLastFour)
        }
    }
}

/// Product details copied into an order when it is placed. Later catalog
/// edits do not reach these copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn snapshot(line: &CartLine) -> Self {
        let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            id: line.id,
            title: line.title.clone(),
            price: line.price,
            quantity: line.quantity.max(1),
            image: line.image.clone(),
            category: non_empty(&line.category),
            description: non_empty(&line.description),
        }
    }

    /// `None` if `price * quantity` overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// An order as placed at checkout, before the datastore assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub user_name: String,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: String,
    #[serde(default)]
    pub payment_info: Option<PaymentInfo>,
    pub status: OrderStatus,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl NewOrder {
    /// Snapshots the cart into a pending order. The total is recomputed from
    /// the snapshot lines. A missing billing address defaults to the
    /// shipping address.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the cart is empty, an address is incomplete,
    /// the payment metadata is malformed, or the total overflows.
    #[allow(clippy::too_many_arguments)]
    pub fn from_cart(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        lines: &[CartLine],
        shipping_address: Address,
        billing_address: Option<Address>,
        payment_method: impl Into<String>,
        payment_info: Option<PaymentInfo>,
        placed_at: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if lines.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        shipping_address.validate()?;
        let billing_address = billing_address.unwrap_or_else(|| shipping_address.clone());
        billing_address.validate()?;
        if let Some(info) = &payment_info {
            info.validate()?;
        }

        let items: Vec<OrderItem> = lines.iter().map(OrderItem::snapshot).collect();
        let total_amount = items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
            .ok_or(CoreError::TotalOutOfRange)?;

        Ok(Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            items,
            total_amount,
            shipping_address,
            billing_address,
            payment_method: payment_method.into(),
            payment_info,
            status: OrderStatus::Pending,
            estimated_delivery: Some(placed_at + Duration::days(ESTIMATED_DELIVERY_DAYS)),
        })
    }

    #[must_use]
    pub fn into_order(self, id: String, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            user_name: self.user_name,
            items: self.items,
            total_amount: self.total_amount,
            shipping_address: self.shipping_address,
            billing_address: self.billing_address,
            payment_method: self.payment_method,
            payment_info: self.payment_info,
            status: self.status,
            created_at,
            estimated_delivery: self.estimated_delivery,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: String,
    #[serde(default)]
    pub payment_info: Option<PaymentInfo>,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl Order {
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Sorts orders newest first. Ties keep their relative order.
pub fn sort_orders_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

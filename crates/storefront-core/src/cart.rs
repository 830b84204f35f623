//! Client-held cart and favorites state.
//!
//! The state is an explicit value: callers own a [`CartState`] and feed it
//! [`CartAction`]s. Nothing here performs I/O, so every transition succeeds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::{Product, Rating};

/// A product in the cart together with how many units the shopper wants.
///
/// Invariant: `quantity >= 1`. A line whose quantity would drop to zero is
/// removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i64,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

impl CartLine {
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            description: product.description.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            rating: product.rating,
            quantity: quantity.max(1),
        }
    }

    /// `price * quantity` for this line, or `None` if it overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CartAction {
    /// Adds the line, or bumps the existing line's quantity by the line's quantity.
    AddToCart(CartLine),
    IncreaseQuantity(i64),
    /// Drops one unit; a line at quantity 1 is removed.
    DecreaseQuantity(i64),
    DeleteProduct(i64),
    ResetCart,
    AddToFavorite(Product),
    RemoveFavorite(i64),
    ResetFavorites,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub favorites: Vec<Product>,
}

impl CartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the line invariants on state that came from a client.
    /// Zero-quantity lines are dropped, repeated ids fold into their first
    /// line with quantities summed, and favorites keep one entry per id.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut items: Vec<CartLine> = Vec::with_capacity(self.items.len());
        for line in self.items {
            if line.quantity == 0 {
                continue;
            }
            if let Some(existing) = items.iter_mut().find(|l| l.id == line.id) {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                items.push(line);
            }
        }

        let mut favorites: Vec<Product> = Vec::with_capacity(self.favorites.len());
        for product in self.favorites {
            if !favorites.iter().any(|p| p.id == product.id) {
                favorites.push(product);
            }
        }

        Self { items, favorites }
    }

    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::AddToCart(mut line) => {
                let quantity = line.quantity.max(1);
                if let Some(existing) = self.items.iter_mut().find(|l| l.id == line.id) {
                    existing.quantity = existing.quantity.saturating_add(quantity);
                } else {
                    line.quantity = quantity;
                    self.items.push(line);
                }
            }
            CartAction::IncreaseQuantity(id) => {
                if let Some(existing) = self.items.iter_mut().find(|l| l.id == id) {
                    existing.quantity = existing.quantity.saturating_add(1);
                }
            }
            CartAction::DecreaseQuantity(id) => {
                if let Some(pos) = self.items.iter().position(|l| l.id == id) {
                    if self.items[pos].quantity <= 1 {
                        self.items.remove(pos);
                    } else {
                        self.items[pos].quantity -= 1;
                    }
                }
            }
            CartAction::DeleteProduct(id) => self.items.retain(|l| l.id != id),
            CartAction::ResetCart => self.items.clear(),
            CartAction::AddToFavorite(product) => {
                if !self.favorites.iter().any(|p| p.id == product.id) {
                    self.favorites.push(product);
                }
            }
            CartAction::RemoveFavorite(id) => self.favorites.retain(|p| p.id != id),
            CartAction::ResetFavorites => self.favorites.clear(),
        }
    }

    /// Sum of `price * quantity` over all lines. `None` when the sum does not
    /// fit in a [`Decimal`].
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.line_total()?))
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn quantity_of(&self, id: i64) -> Option<u32> {
        self.items.iter().find(|l| l.id == id).map(|l| l.quantity)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pure form of [`CartState::apply`]. The incoming state is normalized first,
/// so the result holds the line invariants whatever the caller sent.
#[must_use]
pub fn reduce(state: CartState, action: CartAction) -> CartState {
    let mut state = state.normalized();
    state.apply(action);
    state
}

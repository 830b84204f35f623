//! Builds the hosted-checkout session request from cart lines.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use storefront_core::{AppConfig, CartLine};

use crate::error::PaymentError;

pub const MAX_DESCRIPTION_CHARS: usize = 255;
const SHIPPING_MIN_BUSINESS_DAYS: u32 = 3;
const SHIPPING_MAX_BUSINESS_DAYS: u32 = 7;

/// Deployment-level inputs to a session request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Public base URL of the storefront, without a trailing slash.
    pub public_url: String,
    /// Lowercase ISO 4217 code.
    pub currency: String,
    pub shipping_countries: Vec<String>,
}

impl SessionSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            public_url: config.public_url.clone(),
            currency: config.currency.clone(),
            shipping_countries: config.shipping_countries.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLineItem {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Price in the currency's minor unit.
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub line_items: Vec<SessionLineItem>,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub allowed_countries: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Builds one session line item per cart line, plus redirect URLs, the
/// allowed shipping countries and a free 3 to 7 business-day shipping option.
///
/// # Errors
///
/// Returns [`PaymentError::InvalidRequest`] for an empty cart or a price that
/// cannot be expressed in minor units.
pub fn build_session_request(
    lines: &[CartLine],
    email: Option<&str>,
    order_id: Option<&str>,
    settings: &SessionSettings,
) -> Result<CheckoutSessionRequest, PaymentError> {
    if lines.is_empty() {
        return Err(PaymentError::InvalidRequest("no items provided".to_string()));
    }

    let line_items = lines
        .iter()
        .map(|line| -> Result<SessionLineItem, PaymentError> {
            Ok(SessionLineItem {
                name: line.title.clone(),
                description: truncate_description(&line.description),
                image: line.image.clone(),
                unit_amount: to_minor_units(line.price).ok_or_else(|| {
                    PaymentError::InvalidRequest(format!(
                        "price {} for product {} is not a valid amount",
                        line.price, line.id
                    ))
                })?,
                quantity: line.quantity.max(1),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut metadata = BTreeMap::new();
    metadata.insert("email".to_string(), email.unwrap_or_default().to_string());
    metadata.insert("orderId".to_string(), order_id.unwrap_or_default().to_string());
    metadata.insert("items_count".to_string(), lines.len().to_string());

    Ok(CheckoutSessionRequest {
        line_items,
        currency: settings.currency.clone(),
        success_url: format!(
            "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
            settings.public_url
        ),
        cancel_url: format!("{}/checkout", settings.public_url),
        allowed_countries: settings.shipping_countries.clone(),
        metadata,
    })
}

/// `round(price × 100)`, half away from zero. `None` for negative or
/// out-of-range prices.
fn to_minor_units(price: Decimal) -> Option<i64> {
    if price.is_sign_negative() {
        return None;
    }
    price
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

fn truncate_description(description: &str) -> Option<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect())
}

impl CheckoutSessionRequest {
    /// Flattens the request into the provider's bracketed form encoding
    /// (`line_items[0][price_data][unit_amount]=...`).
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("success_url".into(), self.success_url.clone()),
            ("cancel_url".into(), self.cancel_url.clone()),
        ];

        for (i, country) in self.allowed_countries.iter().enumerate() {
            form.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                country.clone(),
            ));
        }

        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
            form.push((format!("{prefix}[price_data][currency]"), self.currency.clone()));
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            if let Some(description) = &item.description {
                form.push((
                    format!("{prefix}[price_data][product_data][description]"),
                    description.clone(),
                ));
            }
            if let Some(image) = &item.image {
                form.push((
                    format!("{prefix}[price_data][product_data][images][0]"),
                    image.clone(),
                ));
            }
        }

        let rate = "shipping_options[0][shipping_rate_data]";
        form.push((format!("{rate}[type]"), "fixed_amount".into()));
        form.push((format!("{rate}[fixed_amount][amount]"), "0".into()));
        form.push((format!("{rate}[fixed_amount][currency]"), self.currency.clone()));
        form.push((format!("{rate}[display_name]"), "Free shipping".into()));
        for (bound, days) in [
            ("minimum", SHIPPING_MIN_BUSINESS_DAYS),
            ("maximum", SHIPPING_MAX_BUSINESS_DAYS),
        ] {
            form.push((
                format!("{rate}[delivery_estimate][{bound}][unit]"),
                "business_day".into(),
            ));
            form.push((
                format!("{rate}[delivery_estimate][{bound}][value]"),
                days.to_string(),
            ));
        }

        for (key, value) in &self.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        form
    }
}

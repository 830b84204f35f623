use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ConfigError, CoreError};

/// Supplemental products compiled into the binary. Overridable at runtime via
/// `STOREFRONT_SUPPLEMENTAL_PRODUCTS_PATH`.
const BUNDLED_SUPPLEMENTAL_PRODUCTS: &str =
    include_str!("../../../config/supplemental_products.yaml");

/// A catalog product, whether it came from the external product API, the
/// bundled supplemental list, or an admin-authored datastore record.
///
/// Field names follow the camelCase shape the external API and the document
/// store already use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    /// Price in the display currency's major unit (e.g. `109.95`).
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Empty strings from upstream are normalized to `None`.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Rating,
    /// Soft-delete marker. Records without the field are active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Aggregate score as published by the product source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

impl Product {
    /// Checks the fields an admin must supply when authoring a product.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "title" });
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::EmptyField {
                field: "description",
            });
        }
        if self.category.trim().is_empty() {
            return Err(CoreError::EmptyField { field: "category" });
        }
        if self.image.as_deref().map_or(true, |i| i.trim().is_empty()) {
            return Err(CoreError::EmptyField { field: "image" });
        }
        if self.price.is_sign_negative() {
            return Err(CoreError::NegativePrice);
        }
        Ok(())
    }
}

fn default_active() -> bool {
    true
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Deserialize)]
struct SupplementalFile {
    products: Vec<Product>,
}

/// Parses the supplemental product list bundled with the application.
///
/// # Errors
///
/// Returns `ConfigError` if the bundled YAML is malformed or fails validation.
pub fn bundled_supplemental_products() -> Result<Vec<Product>, ConfigError> {
    parse_supplemental(BUNDLED_SUPPLEMENTAL_PRODUCTS)
}

/// Loads the supplemental product list from `path`, or the bundled list when
/// `path` is `None`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_supplemental_products(path: Option<&Path>) -> Result<Vec<Product>, ConfigError> {
    let Some(path) = path else {
        return bundled_supplemental_products();
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::SupplementalFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
    parse_supplemental(&content)
}

fn parse_supplemental(content: &str) -> Result<Vec<Product>, ConfigError> {
    let file: SupplementalFile = serde_yaml::from_str(content)?;
    validate_supplemental(&file.products)?;
    Ok(file.products)
}

fn validate_supplemental(products: &[Product]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for product in products {
        if product.title.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "supplemental product {} has an empty title",
                product.id
            )));
        }

        if product.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "supplemental product {} has a negative price",
                product.id
            )));
        }

        if !seen_ids.insert(product.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate supplemental product id: {}",
                product.id
            )));
        }
    }

    Ok(())
}

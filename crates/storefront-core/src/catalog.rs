//! Merging and filtering the product catalog.

use std::collections::HashSet;

use crate::products::Product;

/// Combines the three product sources into one listing.
///
/// External API records come first, then supplemental records, skipping any
/// id already seen. Admin-authored `custom` records override a same-id entry
/// in place; unmatched custom records are appended.
#[must_use]
pub fn merge_catalog(
    api: Vec<Product>,
    supplemental: Vec<Product>,
    custom: Vec<Product>,
) -> Vec<Product> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Product> = api
        .into_iter()
        .chain(supplemental)
        .filter(|p| seen.insert(p.id))
        .collect();

    for product in custom {
        match merged.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => merged.push(product),
        }
    }

    merged
}

/// Drops soft-deleted products.
#[must_use]
pub fn active_only(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(|p| p.is_active).collect()
}

/// Next id for an admin-authored product: one past the highest id in use.
#[must_use]
pub fn next_product_id(products: &[Product]) -> i64 {
    products.iter().map(|p| p.id).max().unwrap_or(0) + 1
}

/// The `category` query parameter, with the storefront's named shortcuts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    BestSellers,
    /// Last `n` entries of the merged listing.
    NewReleases(usize),
    /// First `n` entries of the merged listing.
    TodaysDeals(usize),
    /// Case-insensitive equality on the category string.
    Exact(String),
}

impl CategoryFilter {
    #[must_use]
    pub fn parse(raw: Option<&str>, new_releases: usize, deals: usize) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return CategoryFilter::All;
        };

        match raw.to_lowercase().as_str() {
            "best sellers" => CategoryFilter::BestSellers,
            "new releases" => CategoryFilter::NewReleases(new_releases),
            "today's deals" | "todays deals" => CategoryFilter::TodaysDeals(deals),
            _ => CategoryFilter::Exact(raw.to_string()),
        }
    }

    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        match self {
            CategoryFilter::All | CategoryFilter::BestSellers => products,
            CategoryFilter::NewReleases(n) => {
                let skip = products.len().saturating_sub(*n);
                products.into_iter().skip(skip).collect()
            }
            CategoryFilter::TodaysDeals(n) => products.into_iter().take(*n).collect(),
            CategoryFilter::Exact(category) => {
                let wanted = category.to_lowercase();
                products
                    .into_iter()
                    .filter(|p| p.category.to_lowercase() == wanted)
                    .collect()
            }
        }
    }
}

/// Case-insensitive substring search over title, description and category.
/// A blank query matches nothing.
#[must_use]
pub fn search_products(products: &[Product], query: &str) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    products
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::products::Rating;

    fn product(id: i64, title: &str, category: &str) -> Product {
        Product {
            id,
            title: title.to_string(),
            price: Decimal::from(id),
            description: format!("{title} description"),
            category: category.to_string(),
            image: None,
            rating: Rating::default(),
            is_active: true,
        }
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn merge_custom_overrides_api_and_supplemental() {
        let api = vec![
            product(1, "Backpack", "men's clothing"),
            product(2, "Shirt", "men's clothing"),
        ];
        let supplemental = vec![product(101, "iPhone", "Mobiles")];
        let mut edited = product(2, "Shirt (edited)", "men's clothing");
        edited.price = Decimal::from(99);
        let custom = vec![
            edited,
            product(500, "Admin item", "Misc"),
            product(101, "iPhone 15", "Mobiles"),
        ];

        let merged = merge_catalog(api, supplemental, custom);

        assert_eq!(ids(&merged), vec![1, 2, 101, 500]);
        assert_eq!(merged[1].title, "Shirt (edited)");
        assert_eq!(merged[1].price, Decimal::from(99));
        assert_eq!(merged[2].title, "iPhone 15");
    }

    #[test]
    fn merge_keeps_first_of_api_and_supplemental_collision() {
        let merged = merge_catalog(
            vec![product(7, "From API", "x")],
            vec![product(7, "From supplemental", "x")],
            vec![],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "From API");
    }

    #[test]
    fn exact_category_is_case_insensitive_and_not_substring() {
        let products = vec![
            product(1, "TV", "Electronics"),
            product(2, "Cable", "electronics"),
            product(3, "Phone", "Consumer Electronics"),
            product(4, "Lamp", "Home"),
        ];
        let filter = CategoryFilter::parse(Some("ELECTRONICS"), 10, 8);
        assert_eq!(ids(&filter.apply(products)), vec![1, 2]);
    }

    #[test]
    fn named_categories_are_pass_through_slices() {
        let products: Vec<Product> = (1..=12).map(|i| product(i, "p", "c")).collect();

        let best = CategoryFilter::parse(Some("Best Sellers"), 10, 8);
        assert_eq!(best, CategoryFilter::BestSellers);
        assert_eq!(best.apply(products.clone()).len(), 12);

        let new = CategoryFilter::parse(Some("New Releases"), 3, 8);
        assert_eq!(ids(&new.apply(products.clone())), vec![10, 11, 12]);

        let deals = CategoryFilter::parse(Some("Today's Deals"), 10, 2);
        assert_eq!(ids(&deals.apply(products.clone())), vec![1, 2]);

        let deals = CategoryFilter::parse(Some("Todays Deals"), 10, 2);
        assert_eq!(deals, CategoryFilter::TodaysDeals(2));
    }

    #[test]
    fn new_releases_larger_than_listing_returns_everything() {
        let products: Vec<Product> = (1..=3).map(|i| product(i, "p", "c")).collect();
        let filter = CategoryFilter::NewReleases(10);
        assert_eq!(filter.apply(products).len(), 3);
    }

    #[test]
    fn blank_category_means_all() {
        assert_eq!(CategoryFilter::parse(Some("  "), 10, 8), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse(None, 10, 8), CategoryFilter::All);
    }

    #[test]
    fn search_matches_title_description_and_category() {
        let products = vec![
            product(1, "Mechanical Keyboard", "Computers"),
            product(2, "Linen Shirt", "Fashion"),
            product(3, "Mouse", "computers"),
        ];
        assert_eq!(ids(&search_products(&products, "KEYBOARD")), vec![1]);
        assert_eq!(ids(&search_products(&products, "computer")), vec![1, 3]);
        assert_eq!(ids(&search_products(&products, "shirt desc")), vec![2]);
        assert!(search_products(&products, "   ").is_empty());
    }

    #[test]
    fn active_only_drops_soft_deleted() {
        let mut hidden = product(2, "Hidden", "c");
        hidden.is_active = false;
        let listing = active_only(vec![product(1, "Shown", "c"), hidden]);
        assert_eq!(ids(&listing), vec![1]);
    }

    #[test]
    fn next_product_id_is_one_past_max() {
        let products = vec![product(3, "a", "c"), product(402, "b", "c"), product(20, "c", "c")];
        assert_eq!(next_product_id(&products), 403);
        assert_eq!(next_product_id(&[]), 1);
    }
}

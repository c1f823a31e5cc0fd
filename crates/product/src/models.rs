//! Catalog records and the payloads that create, change, and query them.

use chrono::{DateTime, Utc};
use common::{CategoryId, Money, ProductId};
use serde::{Deserialize, Serialize};

/// A product category, addressed by its slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Payload creating a category. The slug is derived from the name when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// A product in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: CategoryId,
    pub stock_quantity: u32,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// A product rendered with its category name and derived flags.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
    pub is_in_stock: bool,
}

/// Payload creating a product, also used for full (`PUT`) updates.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub category: CategoryId,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial (`PATCH`) update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category: Option<CategoryId>,
    pub stock_quantity: Option<u32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl From<NewProduct> for ProductUpdate {
    fn from(p: NewProduct) -> Self {
        Self {
            name: Some(p.name),
            description: Some(p.description),
            price: Some(p.price),
            category: Some(p.category),
            stock_quantity: Some(p.stock_quantity),
            image_url: Some(p.image_url),
            is_active: Some(p.is_active),
        }
    }
}

/// Field a product listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingField {
    Name,
    Price,
    #[default]
    CreatedAt,
}

/// Sort order of a product listing, parsed from `name`, `-price`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductOrdering {
    pub field: OrderingField,
    pub descending: bool,
}

impl ProductOrdering {
    /// Parses an ordering parameter. Unknown fields give `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (descending, name) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let field = match name {
            "name" => OrderingField::Name,
            "price" => OrderingField::Price,
            "created_at" => OrderingField::CreatedAt,
            _ => return None,
        };
        Some(Self { field, descending })
    }
}

/// Query parameters accepted by the product listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// Only `"true"` (any case) restricts the listing to products in stock.
    pub in_stock: Option<String>,
    pub ordering: Option<String>,
}

impl ProductFilter {
    /// Returns true if `product` passes every criterion.
    ///
    /// Inactive products never match.
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active {
            return false;
        }
        if self.category.is_some_and(|c| c != product.category) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.only_in_stock() && !product.is_in_stock() {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                contains_ignore_case(&product.name, term)
                    || contains_ignore_case(&product.description, term)
            }
            _ => true,
        }
    }

    fn only_in_stock(&self) -> bool {
        self.in_stock
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Returns the requested ordering, or the default for unknown values.
    pub fn ordering(&self) -> ProductOrdering {
        self.ordering
            .as_deref()
            .and_then(ProductOrdering::parse)
            .unwrap_or_default()
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Derives a URL slug: lowercase alphanumerics, words joined by `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64, stock: u32) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            name: name.to_string(),
            description: "A sturdy thing".to_string(),
            price: Money::from_cents(price),
            category: CategoryId::new(1),
            stock_quantity: stock,
            image_url: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn slugify_joins_words() {
        assert_eq!(slugify("Home & Garden"), "home-garden");
        assert_eq!(slugify("  Power--Tools "), "power-tools");
        assert_eq!(slugify("Books!"), "books");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn ordering_parses_direction() {
        assert_eq!(
            ProductOrdering::parse("-price"),
            Some(ProductOrdering {
                field: OrderingField::Price,
                descending: true
            })
        );
        assert_eq!(
            ProductOrdering::parse("name").map(|o| o.descending),
            Some(false)
        );
        assert_eq!(ProductOrdering::parse("stock"), None);
    }

    #[test]
    fn filter_by_price_range_and_stock() {
        let filter = ProductFilter {
            min_price: Some(Money::from_cents(500)),
            max_price: Some(Money::from_cents(1500)),
            in_stock: Some("TRUE".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&product("Widget", 1000, 3)));
        assert!(!filter.matches(&product("Widget", 1000, 0)));
        assert!(!filter.matches(&product("Widget", 2000, 3)));
        assert!(!filter.matches(&product("Widget", 100, 3)));
    }

    #[test]
    fn filter_search_is_case_insensitive() {
        let filter = ProductFilter {
            search: Some("STURDY".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&product("Widget", 1000, 3)));

        let filter = ProductFilter {
            search: Some("gadget".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&product("Widget", 1000, 3)));
    }

    #[test]
    fn inactive_products_never_match() {
        let mut p = product("Widget", 1000, 3);
        p.is_active = false;
        assert!(!ProductFilter::default().matches(&p));
    }

    #[test]
    fn filter_deserializes_from_query_values() {
        let filter: ProductFilter =
            serde_json::from_str(r#"{"min_price": "5.50", "category": 2}"#).unwrap();
        assert_eq!(filter.min_price, Some(Money::from_cents(550)));
        assert_eq!(filter.category, Some(CategoryId::new(2)));
    }
}

//! In-memory catalog tables.
//!
//! [`Catalog`] is plain data with synchronous operations; the service keeps
//! it behind one write lock, which makes every stock mutation atomic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use common::{CategoryId, IdSequence, Money, ProductId};

use crate::error::ProductError;
use crate::models::{
    Category, NewCategory, NewProduct, OrderingField, Product, ProductDetail, ProductFilter,
    ProductUpdate, contains_ignore_case, slugify,
};

#[derive(Debug, Default)]
pub struct Catalog {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    category_ids: IdSequence,
    product_ids: IdSequence,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_category(
        &mut self,
        new: NewCategory,
        now: DateTime<Utc>,
    ) -> Result<Category, ProductError> {
        let name = required_name(&new.name)?;
        let slug = match new.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => slugify(s),
            _ => slugify(&name),
        };
        if slug.is_empty() {
            return Err(ProductError::Validation(
                "Category slug must not be empty.".to_string(),
            ));
        }
        if self
            .categories
            .values()
            .any(|c| c.name.eq_ignore_ascii_case(&name) || c.slug == slug)
        {
            return Err(ProductError::DuplicateName { kind: "category" });
        }

        let category = Category {
            id: CategoryId::new(self.category_ids.next_value()),
            name,
            slug,
            description: new.description,
            created_at: now,
        };
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Lists categories ordered by name, optionally searching name and
    /// description.
    pub fn categories(&self, search: Option<&str>) -> Vec<Category> {
        let term = search.map(str::trim).filter(|t| !t.is_empty());
        let mut categories: Vec<Category> = self
            .categories
            .values()
            .filter(|c| {
                term.is_none_or(|t| {
                    contains_ignore_case(&c.name, t) || contains_ignore_case(&c.description, t)
                })
            })
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    pub fn category_by_slug(&self, slug: &str) -> Result<&Category, ProductError> {
        self.categories
            .values()
            .find(|c| c.slug == slug)
            .ok_or_else(|| ProductError::CategoryNotFound {
                slug: slug.to_string(),
            })
    }

    pub fn product(&self, product_id: ProductId) -> Result<&Product, ProductError> {
        self.products
            .get(&product_id)
            .ok_or(ProductError::NotFound { product_id })
    }

    pub fn detail(&self, product: &Product) -> ProductDetail {
        let category_name = self
            .categories
            .get(&product.category)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        ProductDetail {
            is_in_stock: product.is_in_stock(),
            category_name,
            product: product.clone(),
        }
    }

    /// Lists active products matching `filter`, in the requested order.
    pub fn list(&self, filter: &ProductFilter) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        let ordering = filter.ordering();
        products.sort_by(|a, b| {
            let ord = match ordering.field {
                OrderingField::Name => a.name.cmp(&b.name),
                OrderingField::Price => a.price.cmp(&b.price),
                OrderingField::CreatedAt => a.created_at.cmp(&b.created_at),
            }
            .then(a.id.cmp(&b.id));
            if ordering.descending { ord.reverse() } else { ord }
        });
        products
    }

    pub fn create_product(
        &mut self,
        new: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductError> {
        let name = required_name(&new.name)?;
        self.ensure_unique_name(&name, None)?;
        self.ensure_category(new.category)?;
        validate_price(new.price)?;
        validate_image_url(&new.image_url)?;

        let product = Product {
            id: ProductId::new(self.product_ids.next_value()),
            name,
            description: new.description,
            price: new.price,
            category: new.category,
            stock_quantity: new.stock_quantity,
            image_url: new.image_url,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// Applies every present field of `update`. Nothing changes if any
    /// field is invalid.
    pub fn update_product(
        &mut self,
        product_id: ProductId,
        update: ProductUpdate,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductError> {
        self.product(product_id)?;

        let name = update.name.as_deref().map(required_name).transpose()?;
        if let Some(name) = &name {
            self.ensure_unique_name(name, Some(product_id))?;
        }
        if let Some(category) = update.category {
            self.ensure_category(category)?;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
        }
        if let Some(url) = &update.image_url {
            validate_image_url(url)?;
        }

        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(ProductError::NotFound { product_id })?;
        if let Some(name) = name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(category) = update.category {
            product.category = category;
        }
        if let Some(stock) = update.stock_quantity {
            product.stock_quantity = stock;
        }
        if let Some(url) = update.image_url {
            product.image_url = url;
        }
        if let Some(active) = update.is_active {
            product.is_active = active;
        }
        product.updated_at = now;
        Ok(product.clone())
    }

    pub fn delete_product(&mut self, product_id: ProductId) -> Result<Product, ProductError> {
        self.products
            .remove(&product_id)
            .ok_or(ProductError::NotFound { product_id })
    }

    /// Takes `quantity` units out of stock and returns the remaining stock.
    ///
    /// Fails without mutation when stock is insufficient.
    pub fn reserve(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, ProductError> {
        check_quantity(quantity)?;
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(ProductError::NotFound { product_id })?;

        let remaining = product.stock_quantity.checked_sub(quantity).ok_or(
            ProductError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.stock_quantity,
            },
        )?;
        product.stock_quantity = remaining;
        product.updated_at = now;
        Ok(remaining)
    }

    /// Puts `quantity` units back into stock and returns the new stock.
    ///
    /// There is no reservation ledger: any quantity is accepted as long as
    /// the counter does not overflow.
    pub fn release(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, ProductError> {
        check_quantity(quantity)?;
        let product = self
            .products
            .get_mut(&product_id)
            .ok_or(ProductError::NotFound { product_id })?;

        let stock = product
            .stock_quantity
            .checked_add(quantity)
            .ok_or(ProductError::StockOverflow { product_id })?;
        product.stock_quantity = stock;
        product.updated_at = now;
        Ok(stock)
    }

    fn ensure_unique_name(
        &self,
        name: &str,
        except: Option<ProductId>,
    ) -> Result<(), ProductError> {
        let taken = self
            .products
            .values()
            .any(|p| Some(p.id) != except && p.name == name);
        if taken {
            return Err(ProductError::DuplicateName { kind: "product" });
        }
        Ok(())
    }

    fn ensure_category(&self, category_id: CategoryId) -> Result<(), ProductError> {
        if !self.categories.contains_key(&category_id) {
            return Err(ProductError::UnknownCategory { category_id });
        }
        Ok(())
    }
}

fn check_quantity(quantity: u32) -> Result<(), ProductError> {
    if quantity == 0 {
        return Err(ProductError::InvalidQuantity);
    }
    Ok(())
}

fn required_name(name: &str) -> Result<String, ProductError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProductError::Validation(
            "This field may not be blank: name.".to_string(),
        ));
    }
    if name.chars().count() > 100 {
        return Err(ProductError::Validation(
            "Ensure name has no more than 100 characters.".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Ten digits with two decimal places.
const MAX_PRICE: Money = Money::from_cents(9_999_999_999);

fn validate_price(price: Money) -> Result<(), ProductError> {
    if price.is_negative() {
        return Err(ProductError::Validation(
            "Price must not be negative.".to_string(),
        ));
    }
    if price > MAX_PRICE {
        return Err(ProductError::Validation(
            "Ensure that there are no more than 10 digits in total.".to_string(),
        ));
    }
    Ok(())
}

fn validate_image_url(url: &str) -> Result<(), ProductError> {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }
    Err(ProductError::Validation("Enter a valid URL.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (Catalog, ProductId) {
        let mut catalog = Catalog::new();
        let now = Utc::now();
        let category = catalog
            .create_category(
                NewCategory {
                    name: "Tools".to_string(),
                    slug: None,
                    description: String::new(),
                },
                now,
            )
            .unwrap();
        let product = catalog
            .create_product(
                NewProduct {
                    name: "Hammer".to_string(),
                    description: String::new(),
                    price: Money::from_cents(1000),
                    category: category.id,
                    stock_quantity: 5,
                    image_url: String::new(),
                    is_active: true,
                },
                now,
            )
            .unwrap();
        (catalog, product.id)
    }

    #[test]
    fn reserve_decrements_stock() {
        let (mut catalog, id) = seeded();
        assert_eq!(catalog.reserve(id, 2, Utc::now()).unwrap(), 3);
        assert_eq!(catalog.reserve(id, 3, Utc::now()).unwrap(), 0);
    }

    #[test]
    fn reserve_never_goes_below_zero() {
        let (mut catalog, id) = seeded();
        let err = catalog.reserve(id, 6, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            ProductError::InsufficientStock {
                product_id: id,
                requested: 6,
                available: 5
            }
        );
        assert_eq!(catalog.product(id).unwrap().stock_quantity, 5);
    }

    #[test]
    fn reserve_rejects_zero_and_unknown_products() {
        let (mut catalog, id) = seeded();
        assert_eq!(
            catalog.reserve(id, 0, Utc::now()),
            Err(ProductError::InvalidQuantity)
        );
        let missing = ProductId::new(99);
        assert_eq!(
            catalog.reserve(missing, 1, Utc::now()),
            Err(ProductError::NotFound {
                product_id: missing
            })
        );
    }

    #[test]
    fn release_increments_without_ledger() {
        let (mut catalog, id) = seeded();
        assert_eq!(catalog.release(id, 10, Utc::now()).unwrap(), 15);
    }

    #[test]
    fn release_rejects_overflow() {
        let (mut catalog, id) = seeded();
        let err = catalog.release(id, u32::MAX, Utc::now()).unwrap_err();
        assert_eq!(err, ProductError::StockOverflow { product_id: id });
        assert_eq!(catalog.product(id).unwrap().stock_quantity, 5);
    }

    #[test]
    fn category_slug_is_derived_and_unique() {
        let (mut catalog, _) = seeded();
        assert_eq!(catalog.category_by_slug("tools").unwrap().name, "Tools");

        let err = catalog
            .create_category(
                NewCategory {
                    name: "tools".to_string(),
                    slug: None,
                    description: String::new(),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, ProductError::DuplicateName { kind: "category" });
    }

    #[test]
    fn product_names_are_unique() {
        let (mut catalog, id) = seeded();
        let category = catalog.product(id).unwrap().category;
        let err = catalog
            .create_product(
                NewProduct {
                    name: "Hammer".to_string(),
                    description: String::new(),
                    price: Money::from_cents(1),
                    category,
                    stock_quantity: 0,
                    image_url: String::new(),
                    is_active: true,
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err, ProductError::DuplicateName { kind: "product" });
    }

    #[test]
    fn invalid_partial_update_changes_nothing() {
        let (mut catalog, id) = seeded();
        let update = ProductUpdate {
            stock_quantity: Some(50),
            price: Some(Money::from_cents(-1)),
            ..Default::default()
        };
        assert!(catalog.update_product(id, update, Utc::now()).is_err());
        assert_eq!(catalog.product(id).unwrap().stock_quantity, 5);

        let update = ProductUpdate {
            stock_quantity: Some(50),
            ..Default::default()
        };
        let product = catalog.update_product(id, update, Utc::now()).unwrap();
        assert_eq!(product.stock_quantity, 50);
        assert_eq!(product.name, "Hammer");
    }

    #[test]
    fn price_is_capped_at_ten_digits() {
        let (mut catalog, id) = seeded();
        let category = catalog.product(id).unwrap().category;
        let oversized = NewProduct {
            name: "Crown".to_string(),
            description: String::new(),
            price: "92233720368547758.07".parse().unwrap(),
            category,
            stock_quantity: 5,
            image_url: String::new(),
            is_active: true,
        };
        assert!(matches!(
            catalog.create_product(oversized, Utc::now()),
            Err(ProductError::Validation(_))
        ));

        let update = ProductUpdate {
            price: Some(Money::from_cents(10_000_000_000)),
            ..Default::default()
        };
        assert!(catalog.update_product(id, update, Utc::now()).is_err());
        assert_eq!(catalog.product(id).unwrap().price, Money::from_cents(1000));

        let update = ProductUpdate {
            price: Some(MAX_PRICE),
            ..Default::default()
        };
        let product = catalog.update_product(id, update, Utc::now()).unwrap();
        assert_eq!(product.price.to_string(), "99999999.99");
    }

    #[test]
    fn list_orders_by_requested_field() {
        let (mut catalog, id) = seeded();
        let category = catalog.product(id).unwrap().category;
        catalog
            .create_product(
                NewProduct {
                    name: "Anvil".to_string(),
                    description: String::new(),
                    price: Money::from_cents(9000),
                    category,
                    stock_quantity: 1,
                    image_url: String::new(),
                    is_active: true,
                },
                Utc::now(),
            )
            .unwrap();

        let by_name = catalog.list(&ProductFilter {
            ordering: Some("name".to_string()),
            ..Default::default()
        });
        assert_eq!(by_name[0].name, "Anvil");

        let by_price_desc = catalog.list(&ProductFilter {
            ordering: Some("-price".to_string()),
            ..Default::default()
        });
        assert_eq!(by_price_desc[0].name, "Anvil");

        let default = catalog.list(&ProductFilter::default());
        assert_eq!(default[0].name, "Hammer");
    }
}

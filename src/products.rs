//! Products
//!
//! The catalog is an external collaborator: carts only ever ask it for the current
//! presentation fields and price of a single product.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::RwLock,
};

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Wrap a raw product id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw value of the id.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Catalog ids are always positive; anything else is a missing id.
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ProductId> for i64 {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Current catalog view of a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    /// Product id
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Current list price
    pub price: Decimal,

    /// Image reference, if the product has one
    pub image: Option<String>,

    /// Whether the product can currently be purchased
    pub in_stock: bool,
}

impl ProductSnapshot {
    /// Create an in-stock snapshot without an image.
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: None,
            in_stock: true,
        }
    }
}

/// Catalog lookup errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The product does not exist in the catalog.
    #[error("product not found")]
    NotFound,

    /// The catalog could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Product lookup used to hydrate cart display fields.
#[automock]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up the current catalog data for a product.
    async fn lookup(&self, product: ProductId) -> Result<ProductSnapshot, CatalogError>;
}

/// In-process catalog backed by a map.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    products: RwLock<FxHashMap<ProductId, ProductSnapshot>>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the given products.
    pub fn with_products(products: impl IntoIterator<Item = ProductSnapshot>) -> Self {
        let products = products
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        Self {
            products: RwLock::new(products),
        }
    }

    /// Insert or replace a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] when the catalog lock is poisoned.
    pub fn insert(&self, product: ProductSnapshot) -> Result<(), CatalogError> {
        self.products
            .write()
            .map_err(|error| CatalogError::Unavailable(error.to_string()))?
            .insert(product.id, product);

        Ok(())
    }

    /// Remove a product, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] when the catalog lock is poisoned.
    pub fn remove(&self, product: ProductId) -> Result<bool, CatalogError> {
        Ok(self
            .products
            .write()
            .map_err(|error| CatalogError::Unavailable(error.to_string()))?
            .remove(&product)
            .is_some())
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn lookup(&self, product: ProductId) -> Result<ProductSnapshot, CatalogError> {
        self.products
            .read()
            .map_err(|error| CatalogError::Unavailable(error.to_string()))?
            .get(&product)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }
}

//! In-memory server cart store.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::{
    cart::Cart,
    items::{CartLineItem, resolve_unit_price},
    products::{Catalog, CatalogError, ProductId, ProductSnapshot},
    server::{
        ServerCartError, ServerCartStore, line_quantity, validate_insert_quantity,
        validate_product,
    },
    users::UserId,
};

/// A persisted line: quantity, optional price snapshot and last-known display fields.
#[derive(Debug, Clone)]
struct StoredLine {
    product: ProductId,
    quantity: u32,
    unit_price: Option<Decimal>,
    name: String,
    image: Option<String>,
    in_stock: bool,
}

impl StoredLine {
    fn new(product: ProductId, quantity: u32, snapshot: Option<&ProductSnapshot>) -> Self {
        Self {
            product,
            quantity,
            unit_price: snapshot.map(|snapshot| snapshot.price),
            name: snapshot.map(|snapshot| snapshot.name.clone()).unwrap_or_default(),
            image: snapshot.and_then(|snapshot| snapshot.image.clone()),
            in_stock: snapshot.is_none_or(|snapshot| snapshot.in_stock),
        }
    }
}

type StoredCarts = FxHashMap<UserId, Vec<StoredLine>>;

/// Server cart store held in process memory.
///
/// Each operation mutates the map inside a single lock section, so concurrent calls for the
/// same user never interleave within an operation. Catalog lookups happen outside the lock.
pub struct InMemoryServerCartStore {
    carts: Mutex<StoredCarts>,
    catalog: Arc<dyn Catalog>,
}

impl Debug for InMemoryServerCartStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InMemoryServerCartStore")
            .field("carts", &self.carts)
            .finish_non_exhaustive()
    }
}

impl InMemoryServerCartStore {
    /// Create an empty store hydrating display fields from `catalog`.
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            carts: Mutex::new(StoredCarts::default()),
            catalog,
        }
    }

    /// Number of carts created so far.
    ///
    /// # Errors
    ///
    /// Returns [`ServerCartError::Unavailable`] when the store lock is poisoned.
    pub fn cart_count(&self) -> Result<usize, ServerCartError> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoredCarts>, ServerCartError> {
        self.carts
            .lock()
            .map_err(|error| ServerCartError::Unavailable(error.to_string()))
    }

    /// Apply `mutate` to the user's lines (creating the cart if needed) and return a copy.
    fn with_lines<T>(
        &self,
        user: UserId,
        mutate: impl FnOnce(&mut Vec<StoredLine>) -> Result<T, ServerCartError>,
    ) -> Result<Vec<StoredLine>, ServerCartError> {
        let mut carts = self.lock()?;
        let lines = carts.entry(user).or_default();

        mutate(lines)?;

        Ok(lines.clone())
    }

    /// Join stored lines against current catalog data.
    async fn hydrate(&self, user: UserId, lines: Vec<StoredLine>) -> Result<Cart, ServerCartError> {
        let mut items = Vec::with_capacity(lines.len());
        let mut refreshed = Vec::new();

        for line in lines {
            let snapshot = match self.catalog.lookup(line.product).await {
                Ok(snapshot) => Some(snapshot),
                Err(error) => {
                    debug!(product = %line.product, %error, "using last known product fields");

                    None
                }
            };

            let unit_price =
                resolve_unit_price(line.unit_price, snapshot.as_ref().map(|snapshot| snapshot.price));

            let mut item = CartLineItem {
                product_id: line.product,
                quantity: line.quantity,
                unit_price,
                name: line.name,
                image: line.image,
                in_stock: line.in_stock,
            };

            if let Some(snapshot) = snapshot {
                item.refresh_display(&snapshot);
                refreshed.push(snapshot);
            }

            items.push(item);
        }

        if !refreshed.is_empty() {
            let mut carts = self.lock()?;

            if let Some(lines) = carts.get_mut(&user) {
                for snapshot in &refreshed {
                    if let Some(line) = lines.iter_mut().find(|line| line.product == snapshot.id) {
                        line.name.clone_from(&snapshot.name);
                        line.image.clone_from(&snapshot.image);
                        line.in_stock = snapshot.in_stock;
                    }
                }
            }
        }

        Ok(Cart::from_items(items))
    }
}

#[async_trait]
impl ServerCartStore for InMemoryServerCartStore {
    async fn get_or_create(&self, user: UserId) -> Result<Cart, ServerCartError> {
        let lines = self.with_lines(user, |_lines| Ok(()))?;

        self.hydrate(user, lines).await
    }

    async fn add_item(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<Cart, ServerCartError> {
        validate_product(product)?;
        validate_insert_quantity(quantity)?;

        let snapshot = match self.catalog.lookup(product).await {
            Ok(snapshot) => Some(snapshot),
            Err(CatalogError::NotFound) => return Err(ServerCartError::NotFound),
            Err(CatalogError::Unavailable(reason)) => {
                warn!(%product, %reason, "adding item without a price snapshot");

                None
            }
        };

        let lines = self.with_lines(user, |lines| {
            match lines.iter_mut().find(|line| line.product == product) {
                Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                None => lines.push(StoredLine::new(product, quantity, snapshot.as_ref())),
            }

            Ok(())
        })?;

        self.hydrate(user, lines).await
    }

    async fn set_quantity(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i64,
    ) -> Result<Cart, ServerCartError> {
        validate_product(product)?;

        let quantity = line_quantity(quantity)?;

        let lines = self.with_lines(user, |lines| match quantity {
            None => {
                lines.retain(|line| line.product != product);

                Ok(())
            }
            Some(quantity) => {
                let line = lines
                    .iter_mut()
                    .find(|line| line.product == product)
                    .ok_or(ServerCartError::NotFound)?;

                line.quantity = quantity;

                Ok(())
            }
        })?;

        self.hydrate(user, lines).await
    }

    async fn remove_item(&self, user: UserId, product: ProductId) -> Result<Cart, ServerCartError> {
        validate_product(product)?;

        let lines = self.with_lines(user, |lines| {
            lines.retain(|line| line.product != product);

            Ok(())
        })?;

        self.hydrate(user, lines).await
    }

    async fn clear(&self, user: UserId) -> Result<Cart, ServerCartError> {
        let lines = self.with_lines(user, |lines| {
            lines.clear();

            Ok(())
        })?;

        self.hydrate(user, lines).await
    }
}

//! Local cart store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{cart::Cart, local::Storage, payload::CartPayload};

/// Well-known key the anonymous cart is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "trolley.cart";

/// Persists one anonymous cart as a JSON blob under a single key.
///
/// Reads never fail: missing or unreadable data is the empty cart. Writes are best-effort and
/// only logged when they fail, so a full or disabled storage backend never breaks the cart.
#[derive(Debug, Clone)]
pub struct LocalCartStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl LocalCartStore {
    /// Store the cart in `storage` under `key`.
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Store the cart in `storage` under [`DEFAULT_STORAGE_KEY`].
    pub fn with_default_key(storage: Arc<dyn Storage>) -> Self {
        Self::new(storage, DEFAULT_STORAGE_KEY)
    }

    /// Storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored cart, or the empty cart when there is none or it cannot be read.
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::default(),
            Err(error) => {
                warn!(key = %self.key, %error, "failed to read local cart");

                return Cart::default();
            }
        };

        let payload = match serde_json::from_str::<CartPayload>(&raw) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(key = %self.key, %error, "discarding unreadable local cart");

                return Cart::default();
            }
        };

        Cart::try_from(payload).unwrap_or_else(|error| {
            warn!(key = %self.key, %error, "discarding local cart");

            Cart::default()
        })
    }

    /// Write the full cart.
    pub fn save(&self, cart: &Cart) {
        let raw = match serde_json::to_string(&CartPayload::from(cart)) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(key = %self.key, %error, "failed to serialize local cart");

                return;
            }
        };

        match self.storage.set_item(&self.key, &raw) {
            Ok(()) => debug!(key = %self.key, items = cart.len(), "saved local cart"),
            Err(error) => warn!(key = %self.key, %error, "failed to save local cart"),
        }
    }

    /// Remove the stored cart.
    pub fn clear(&self) {
        if let Err(error) = self.storage.remove_item(&self.key) {
            warn!(key = %self.key, %error, "failed to clear local cart");
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        local::{MemoryStorage, StorageError},
        products::{ProductId, ProductSnapshot},
    };

    use super::*;

    #[derive(Debug)]
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::default();

        cart.add(
            &ProductSnapshot::new(ProductId::new(5), "Mug", Decimal::new(1250, 2)),
            2,
        );
        cart.add(
            &ProductSnapshot::new(ProductId::new(9), "Tea", Decimal::new(399, 2)),
            1,
        );

        cart
    }

    #[test]
    fn test_load_without_stored_cart_is_empty() {
        let store = LocalCartStore::with_default_key(Arc::new(MemoryStorage::new()));

        assert_eq!(store.load(), Cart::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = LocalCartStore::with_default_key(Arc::new(MemoryStorage::new()));
        let cart = sample_cart();

        store.save(&cart);

        assert_eq!(store.load(), cart);
    }

    #[test]
    fn test_corrupt_payload_loads_as_empty() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());

        storage.set_item(DEFAULT_STORAGE_KEY, "{\"items\": [oops")?;

        let store = LocalCartStore::with_default_key(storage);

        assert_eq!(store.load(), Cart::default());

        Ok(())
    }

    #[test]
    fn test_out_of_range_payload_loads_as_empty() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());

        storage.set_item(
            DEFAULT_STORAGE_KEY,
            r#"{"items":[{"productId":1,"price":7e28,"quantity":2}]}"#,
        )?;

        let store = LocalCartStore::with_default_key(storage);

        assert_eq!(store.load(), Cart::default());

        Ok(())
    }

    #[test]
    fn test_clear_removes_payload() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let store = LocalCartStore::with_default_key(storage.clone());

        store.save(&sample_cart());
        store.clear();

        assert_eq!(storage.get_item(DEFAULT_STORAGE_KEY)?, None);
        assert_eq!(store.load(), Cart::default());

        Ok(())
    }

    #[test]
    fn test_broken_storage_is_swallowed() {
        let store = LocalCartStore::new(Arc::new(BrokenStorage), "cart");

        store.save(&sample_cart());
        store.clear();

        assert_eq!(store.load(), Cart::default());
    }

    #[test]
    fn test_file_backed_store_survives_reopen() -> TestResult {
        let dir = tempfile::tempdir()?;
        let cart = sample_cart();

        LocalCartStore::with_default_key(Arc::new(crate::local::FileStorage::new(dir.path())?))
            .save(&cart);

        let reopened =
            LocalCartStore::with_default_key(Arc::new(crate::local::FileStorage::new(dir.path())?));

        assert_eq!(reopened.load(), cart);

        Ok(())
    }
}

//! Cart persistence on top of a [`KeyValueStore`].

use heavyline_core::Cart;

use crate::storage::{KeyValueStore, StorageError, keys};

/// Loads and saves the cart under [`keys::CART`].
#[derive(Debug)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The previously saved cart.
    ///
    /// Never fails: a missing key, an unreadable store or a value that does
    /// not parse all yield an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.store.get(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved cart, starting empty");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => {
                tracing::debug!(lines = cart.lines().len(), "Loaded saved cart");
                cart
            }
            Err(e) => {
                tracing::warn!(error = %e, "Saved cart is malformed, starting empty");
                Cart::new()
            }
        }
    }

    /// Overwrite the saved cart with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be serialized or written.
    pub fn save(&mut self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart).map_err(|source| StorageError::Serialize {
            key: keys::CART.to_string(),
            source,
        })?;
        self.store.set(keys::CART, &raw)
    }

    /// The underlying key-value store.
    pub const fn inner(&self) -> &S {
        &self.store
    }
}

//! The live cart and its auth-linked lifecycle.
//!
//! [`CartContext`] owns the session's [`Cart`] and writes it through to a
//! [`CartStore`] after every mutation. It also watches the [`AuthContext`]:
//! whenever the signed-in user goes away the cart is cleared.
//!
//! [`AuthContext`]: crate::services::auth::AuthContext

mod store;

pub use store::CartStore;

use tokio::sync::watch;

use heavyline_core::{Cart, Price, Product, ProductId, QuantityUpdate};

use crate::services::auth::AuthState;
use crate::storage::{KeyValueStore, StorageError};

/// The session's cart, persisted on every change.
#[derive(Debug)]
pub struct CartContext<S> {
    cart: Cart,
    store: CartStore<S>,
    auth: watch::Receiver<AuthState>,
    seen_sign_outs: u64,
}

impl<S: KeyValueStore> CartContext<S> {
    /// Rehydrate the cart from `store` and start following `auth`.
    ///
    /// The auth state at this point is the baseline; only sign-outs that
    /// happen afterwards clear the cart.
    pub fn new(store: S, mut auth: watch::Receiver<AuthState>) -> Self {
        let store = CartStore::new(store);
        let cart = store.load();
        let seen_sign_outs = auth.borrow_and_update().sign_outs;
        Self {
            cart,
            store,
            auth,
            seen_sign_outs,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    /// Apply any pending auth change.
    ///
    /// Returns `true` if a sign-out was observed and the cart was cleared.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cleared cart could not be saved.
    pub fn sync_auth(&mut self) -> Result<bool, StorageError> {
        let sign_outs = self.auth.borrow_and_update().sign_outs;
        if sign_outs <= self.seen_sign_outs {
            return Ok(false);
        }
        self.seen_sign_outs = sign_outs;

        tracing::info!(lines = self.cart.lines().len(), "User signed out, clearing cart");
        self.cart.clear();
        self.persist()?;
        Ok(true)
    }

    /// Add one unit of `product`. Returns `false` if the cart total would
    /// overflow, in which case nothing changes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be saved. The in-memory
    /// change is kept either way.
    pub fn add_line(&mut self, product: Product) -> Result<bool, StorageError> {
        self.sync_auth()?;
        let id = product.id;
        tracing::debug!(product_id = %id, "Adding to cart");
        if !self.cart.add_line(product) {
            tracing::warn!(product_id = %id, "Refused add, cart total would overflow");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be saved.
    pub fn remove_line(&mut self, id: ProductId) -> Result<bool, StorageError> {
        self.sync_auth()?;
        let removed = self.cart.remove_line(id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Set the quantity of the line for `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be saved.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> Result<QuantityUpdate, StorageError> {
        self.sync_auth()?;
        let update = self.cart.set_quantity(id, quantity);
        match update {
            QuantityUpdate::Updated => self.persist()?,
            QuantityUpdate::Rejected => {
                tracing::debug!(product_id = %id, quantity, "Rejected quantity below 1");
            }
            QuantityUpdate::NotFound => {}
        }
        Ok(update)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart could not be saved.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.sync_auth()?;
        self.cart.clear();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        self.store.save(&self.cart).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to save cart");
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use heavyline_core::UserId;

    use super::*;
    use crate::models::AuthSession;
    use crate::services::auth::AuthContext;
    use crate::storage::{MemoryStore, keys};

    fn product(id: i32, roubles: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Погрузчик {id}"),
            unit_price: Price::from_roubles(roubles).unwrap(),
            image_ref: Some(format!("/images/{id}.jpg")),
        }
    }

    fn session() -> AuthSession {
        AuthSession {
            user_id: UserId::new(1),
            email: "buyer@example.ru".to_string(),
            name: None,
            is_admin: false,
        }
    }

    fn saved(ctx: &CartContext<MemoryStore>) -> Cart {
        let raw = ctx.store.inner().get(keys::CART).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let auth = AuthContext::new();
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());

        ctx.add_line(product(1, 1000)).unwrap();
        assert_eq!(saved(&ctx), *ctx.cart());

        ctx.add_line(product(1, 1000)).unwrap();
        ctx.add_line(product(2, 500)).unwrap();
        assert_eq!(saved(&ctx).item_count(), 3);

        assert_eq!(ctx.set_quantity(ProductId::new(2), 4).unwrap(), QuantityUpdate::Updated);
        assert_eq!(saved(&ctx).item_count(), 6);

        assert!(ctx.remove_line(ProductId::new(1)).unwrap());
        assert_eq!(saved(&ctx), *ctx.cart());

        ctx.clear().unwrap();
        assert!(saved(&ctx).is_empty());
    }

    #[test]
    fn test_add_that_would_overflow_total_is_refused() {
        let auth = AuthContext::new();
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());
        let huge = Product {
            unit_price: Price::new(rust_decimal::Decimal::MAX).unwrap(),
            ..product(1, 0)
        };

        assert!(ctx.add_line(huge.clone()).unwrap());
        assert!(!ctx.add_line(huge).unwrap());
        assert!(!ctx.add_line(product(2, 1)).unwrap());

        assert_eq!(ctx.item_count(), 1);
        assert_eq!(saved(&ctx), *ctx.cart());
        assert_eq!(ctx.total_price().amount(), rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_rejected_quantity_leaves_cart_unchanged() {
        let auth = AuthContext::new();
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());
        ctx.add_line(product(1, 1000)).unwrap();
        let before = ctx.cart().clone();

        for n in [0, -1] {
            assert_eq!(ctx.set_quantity(ProductId::new(1), n).unwrap(), QuantityUpdate::Rejected);
        }
        assert_eq!(*ctx.cart(), before);
        assert_eq!(saved(&ctx), before);
    }

    #[test]
    fn test_remove_twice_is_a_no_op() {
        let auth = AuthContext::new();
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());
        ctx.add_line(product(1, 1000)).unwrap();

        assert!(ctx.remove_line(ProductId::new(1)).unwrap());
        assert!(!ctx.remove_line(ProductId::new(1)).unwrap());
        assert!(ctx.cart().is_empty());
    }

    #[test]
    fn test_rehydrates_saved_cart() {
        let auth = AuthContext::new();
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());
        ctx.add_line(product(3, 1500)).unwrap();
        let store = ctx.store.inner().clone();

        let restored = CartContext::new(store, auth.subscribe());
        assert_eq!(restored.cart(), ctx.cart());
    }

    #[test]
    fn test_sign_out_clears_cart() {
        let auth = AuthContext::new();
        auth.sign_in(session());
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());
        ctx.add_line(product(1, 1000)).unwrap();
        ctx.add_line(product(2, 500)).unwrap();

        assert!(auth.sign_out());
        assert!(ctx.sync_auth().unwrap());
        assert!(ctx.cart().is_empty());
        assert!(saved(&ctx).is_empty());

        assert!(!ctx.sync_auth().unwrap());
    }

    #[test]
    fn test_sign_out_then_sign_in_still_clears() {
        let auth = AuthContext::new();
        auth.sign_in(session());
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());
        ctx.add_line(product(1, 1000)).unwrap();

        auth.sign_out();
        auth.sign_in(session());

        // The next mutation observes the missed sign-out first.
        ctx.add_line(product(2, 500)).unwrap();
        assert_eq!(ctx.cart().lines().len(), 1);
        assert_eq!(ctx.cart().lines()[0].product_id, ProductId::new(2));
    }

    #[test]
    fn test_starting_signed_out_keeps_saved_cart() {
        let auth = AuthContext::new();
        let mut cart = Cart::new();
        cart.add_line(product(1, 1000));
        let mut store = CartStore::new(MemoryStore::new());
        store.save(&cart).unwrap();

        let mut ctx = CartContext::new(store.inner().clone(), auth.subscribe());
        assert!(!ctx.sync_auth().unwrap());
        assert_eq!(ctx.item_count(), 1);
    }

    #[test]
    fn test_sign_in_does_not_touch_cart() {
        let auth = AuthContext::new();
        let mut ctx = CartContext::new(MemoryStore::new(), auth.subscribe());
        ctx.add_line(product(1, 1000)).unwrap();

        auth.sign_in(session());
        assert!(!ctx.sync_auth().unwrap());
        assert_eq!(ctx.item_count(), 1);
    }
}

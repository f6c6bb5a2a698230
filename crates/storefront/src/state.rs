//! Storefront session state.
//!
//! [`Storefront`] wires the API client, auth, cart and checkout together and
//! is what a front end (the `hl` binary, tests) talks to. It owns the rules
//! that cross component boundaries:
//!
//! - after every auth transition the cart is synced, so a sign-out clears it
//!   immediately;
//! - a 401 from a catalog or account call drops the session;
//! - every cart mutation is reported to the checkout flow.

use secrecy::SecretString;

use heavyline_core::{Cart, CartError, Price, Product, ProductId, QuantityUpdate};

use crate::api::ApiClient;
use crate::api::types::OrderRecord;
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result};
use crate::models::AuthSession;
use crate::services::auth::{AuthError, AuthService};
use crate::services::cart::CartContext;
use crate::services::catalog::Catalog;
use crate::services::checkout::{Checkout, CheckoutForm, CheckoutState, OrderReceipt};
use crate::storage::{FileStore, KeyValueStore};

/// One user's storefront session.
pub struct Storefront<S> {
    api: ApiClient,
    auth: AuthService<S>,
    catalog: Catalog,
    cart: CartContext<S>,
    checkout: Checkout,
}

impl Storefront<FileStore> {
    /// Open a session persisted under `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn open(config: &StorefrontConfig) -> Result<Self> {
        Self::new(config, FileStore::new(&config.data_dir))
    }
}

impl<S: KeyValueStore + Clone> Storefront<S> {
    /// Create a session on top of `store`. Nobody is signed in yet; call
    /// [`Storefront::restore`] to pick up a saved login.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig, store: S) -> Result<Self> {
        let api = ApiClient::new(config)?;
        let auth = AuthService::new(api.clone(), store.clone());
        let cart = CartContext::new(store, auth.subscribe());

        Ok(Self {
            catalog: Catalog::new(api.clone()),
            api,
            auth,
            cart,
            checkout: Checkout::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.auth.session()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }

    #[must_use]
    pub const fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    #[must_use]
    pub const fn checkout_form(&self) -> &CheckoutForm {
        self.checkout.form()
    }

    pub const fn checkout_form_mut(&mut self) -> &mut CheckoutForm {
        self.checkout.form_mut()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Restore the saved login, if there is one and it is still valid.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the cart could not be saved after a
    /// failed restore cleared it.
    pub async fn restore(&mut self) -> Result<Option<AuthSession>> {
        let session = self.auth.restore().await;
        match &session {
            Some(session) => self.checkout.prefill_from(session),
            None => self.checkout.clear_prefill(),
        }
        self.sync_cart()?;
        Ok(session)
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` if the credentials are rejected or the auth
    /// API fails.
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<AuthSession> {
        let session = self.auth.login(email, password).await?;
        self.checkout.prefill_from(&session);
        self.sync_cart()?;
        Ok(session)
    }

    /// Sign out. The cart is cleared.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` if the saved token could not be removed, or
    /// `AppError::Storage` if the emptied cart could not be saved.
    pub async fn logout(&mut self) -> Result<()> {
        let result = self.auth.logout().await;
        self.after_sign_out()?;
        result.map_err(AppError::from)
    }

    /// Ask the API who is signed in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if nobody is signed in locally or
    /// the API rejects the session (which also signs out locally).
    pub async fn whoami(&mut self) -> Result<AuthSession> {
        if self.auth.session().is_none() {
            return Err(AuthError::NotAuthenticated.into());
        }
        let result = self.api.current_user().await.map_err(AppError::from);
        self.check_unauthorized(result).await
    }

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if nobody is signed in.
    pub async fn my_orders(&mut self) -> Result<Vec<OrderRecord>> {
        if self.auth.session().is_none() {
            return Err(AuthError::NotAuthenticated.into());
        }
        let result = self.api.my_orders().await.map_err(AppError::from);
        self.check_unauthorized(result).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Look up a vehicle and add one unit of it to the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Catalog` if the vehicle cannot be bought,
    /// `AppError::Cart` if the cart total would overflow, or
    /// `AppError::Storage` if the cart could not be saved.
    pub async fn add_to_cart(&mut self, id: ProductId) -> Result<Product> {
        let result = self.catalog.product(id).await.map_err(AppError::from);
        let product = self.check_unauthorized(result).await?;
        self.add_product(product.clone())?;
        Ok(product)
    }

    /// Add one unit of an already looked-up product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` if the cart total would overflow, or
    /// `AppError::Storage` if the cart could not be saved.
    pub fn add_product(&mut self, product: Product) -> Result<()> {
        let added = self.cart.add_line(product);
        self.checkout.cart_changed(self.cart.cart());
        if added? {
            Ok(())
        } else {
            Err(CartError::TotalOverflow.into())
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Storage` if the cart could not be saved.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<bool> {
        let removed = self.cart.remove_line(id);
        self.checkout.cart_changed(self.cart.cart());
        Ok(removed?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Storage` if the cart could not be saved.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> Result<QuantityUpdate> {
        let update = self.cart.set_quantity(id, quantity);
        self.checkout.cart_changed(self.cart.cart());
        Ok(update?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Storage` if the cart could not be saved.
    pub fn clear_cart(&mut self) -> Result<()> {
        let cleared = self.cart.clear();
        self.checkout.cart_changed(self.cart.cart());
        Ok(cleared?)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Start entering contact details.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    pub fn begin_checkout(&mut self) -> Result<()> {
        self.sync_cart()?;
        Ok(self.checkout.begin(self.cart.cart())?)
    }

    /// Submit the order with the current form.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Checkout`; see [`Checkout::submit`].
    pub async fn submit_order(&mut self) -> Result<OrderReceipt> {
        Ok(self.checkout.submit(&mut self.cart, &self.api).await?)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn sync_cart(&mut self) -> Result<()> {
        if self.cart.sync_auth()? {
            self.checkout.cart_changed(self.cart.cart());
        }
        Ok(())
    }

    fn after_sign_out(&mut self) -> Result<()> {
        self.checkout.clear_prefill();
        self.checkout.reset_form();
        self.sync_cart()
    }

    async fn check_unauthorized<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result
            && e.is_unauthorized()
            && self.auth.session().is_some()
        {
            self.auth.invalidate().await;
            self.after_sign_out()?;
        }
        result
    }
}

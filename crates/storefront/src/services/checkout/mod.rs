//! Checkout: from a filled cart to a submitted order.
//!
//! [`Checkout`] walks one state machine per session:
//!
//! ```text
//! Browsing -> Editing -> ConfirmingDetails -> Submitting -> Completed
//!                              ^                   |
//!                              +---- Failed <------+
//! ```
//!
//! A cart change moves `Browsing`, `Completed` and `Failed` back to `Editing`.
//! [`Checkout::begin`] needs a non-empty cart. [`Checkout::submit`] validates
//! the form locally, composes an [`OrderDraft`] and makes exactly one gateway
//! call. Success clears the cart and resets the form; failure leaves both as
//! they were so the user can try again.

mod draft;
mod form;
mod gateway;

pub use draft::{OrderDraft, OrderLine};
pub use form::{CheckoutField, CheckoutForm, ContactDetails, FieldError, FieldErrors, ValidForm};
pub use gateway::{OrderGateway, OrderReceipt, SubmissionError};

use thiserror::Error;

use heavyline_core::Cart;

use crate::models::AuthSession;
use crate::services::cart::CartContext;
use crate::storage::KeyValueStore;

/// Message shown to the user for any failed submission.
pub const SUBMISSION_FAILED_MESSAGE: &str =
    "Не удалось оформить заказ. Пожалуйста, попробуйте еще раз.";

/// Where the session is in the checkout flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Browsing,
    Editing,
    ConfirmingDetails,
    Submitting,
    Completed { receipt: OrderReceipt },
    Failed { message: String },
}

impl CheckoutState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::Editing => "editing",
            Self::ConfirmingDetails => "confirming_details",
            Self::Submitting => "submitting",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("checkout has not been started")]
    NotStarted,

    #[error("an order is already being submitted")]
    Busy,

    #[error("invalid checkout form: {0}")]
    Invalid(FieldErrors),

    #[error("Не удалось оформить заказ. Пожалуйста, попробуйте еще раз.")]
    Submission(#[source] SubmissionError),
}

/// The checkout form and flow state for one session.
#[derive(Debug, Default)]
pub struct Checkout {
    form: CheckoutForm,
    state: CheckoutState,
    prefill: Option<AuthSession>,
}

impl Checkout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    /// Remember the signed-in user and fill blank name/email fields from it.
    ///
    /// The same values are restored whenever the form is reset.
    pub fn prefill_from(&mut self, session: &AuthSession) {
        self.form.prefill_from(session);
        self.prefill = Some(session.clone());
    }

    /// Forget the prefill source after a sign-out.
    pub fn clear_prefill(&mut self) {
        self.prefill = None;
    }

    /// Reset the form to its defaults (blank, or prefilled from the user).
    pub fn reset_form(&mut self) {
        self.form = CheckoutForm::default();
        if let Some(session) = &self.prefill {
            self.form.prefill_from(session);
        }
    }

    /// Record that the cart changed.
    pub fn cart_changed(&mut self, cart: &Cart) {
        let next = match &self.state {
            CheckoutState::Browsing | CheckoutState::Completed { .. } | CheckoutState::Failed { .. } => {
                Some(CheckoutState::Editing)
            }
            CheckoutState::ConfirmingDetails if cart.is_empty() => Some(CheckoutState::Editing),
            _ => None,
        };
        if let Some(next) = next {
            self.transition(next);
        }
    }

    /// Move on to entering contact details.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` (and stays in `Editing`) if the cart
    /// has no lines, or `CheckoutError::Busy` while a submission is running.
    pub fn begin(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if self.state == CheckoutState::Submitting {
            return Err(CheckoutError::Busy);
        }
        if cart.is_empty() {
            self.transition(CheckoutState::Editing);
            return Err(CheckoutError::EmptyCart);
        }
        self.transition(CheckoutState::ConfirmingDetails);
        Ok(())
    }

    /// Validate the form without submitting.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<ValidForm, FieldErrors> {
        self.form.validate()
    }

    /// Build the order that [`Checkout::submit`] would send.
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn compose(&self, cart: &Cart) -> Result<OrderDraft, FieldErrors> {
        Ok(OrderDraft::compose(cart, self.validate()?))
    }

    /// Submit the order.
    ///
    /// Allowed from `ConfirmingDetails` and, for a retry, from `Failed`.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::Busy` while another submission is running
    /// - `CheckoutError::NotStarted` if [`Checkout::begin`] was not called
    /// - `CheckoutError::EmptyCart` if the cart was emptied meanwhile
    /// - `CheckoutError::Invalid` if required fields are missing; no request
    ///   is made
    /// - `CheckoutError::Submission` if the gateway call failed; the state is
    ///   then `Failed` and cart and form are untouched
    pub async fn submit<S, G>(
        &mut self,
        cart: &mut CartContext<S>,
        gateway: &G,
    ) -> Result<OrderReceipt, CheckoutError>
    where
        S: KeyValueStore,
        G: OrderGateway,
    {
        match self.state {
            CheckoutState::Submitting => return Err(CheckoutError::Busy),
            CheckoutState::ConfirmingDetails | CheckoutState::Failed { .. } => {}
            _ => return Err(CheckoutError::NotStarted),
        }

        if let Err(e) = cart.sync_auth() {
            tracing::warn!(error = %e, "Failed to save cart after sign-out");
        }
        if cart.cart().is_empty() {
            self.transition(CheckoutState::Editing);
            return Err(CheckoutError::EmptyCart);
        }

        let draft = self.compose(cart.cart()).map_err(|errors| {
            tracing::debug!(%errors, "Checkout form incomplete");
            CheckoutError::Invalid(errors)
        })?;

        self.transition(CheckoutState::Submitting);
        tracing::info!(
            correlation_id = draft.correlation_id,
            lines = draft.lines.len(),
            items = draft.item_count(),
            total = %draft.total_price,
            "Submitting order"
        );

        match gateway.submit_order(&draft).await {
            Ok(receipt) => {
                tracing::info!(
                    correlation_id = draft.correlation_id,
                    request_id = %receipt.request_id,
                    "Order placed"
                );
                if let Err(e) = cart.clear() {
                    tracing::warn!(error = %e, "Order placed but the emptied cart was not saved");
                }
                self.reset_form();
                self.transition(CheckoutState::Completed {
                    receipt: receipt.clone(),
                });
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(
                    correlation_id = draft.correlation_id,
                    error = %e,
                    "Order submission failed"
                );
                self.transition(CheckoutState::Failed {
                    message: SUBMISSION_FAILED_MESSAGE.to_string(),
                });
                Err(CheckoutError::Submission(e))
            }
        }
    }

    fn transition(&mut self, next: CheckoutState) {
        if self.state != next {
            tracing::debug!(from = self.state.name(), to = next.name(), "Checkout state");
            self.state = next;
        }
    }
}

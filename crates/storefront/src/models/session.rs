//! Session-related types.

use serde::{Deserialize, Serialize};

use heavyline_core::UserId;

/// The signed-in user, as reported by the auth API.
///
/// Presence of an `AuthSession` is what the cart lifecycle listens to; the
/// contents are only used to prefill checkout and to label output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// User's backend ID.
    pub user_id: UserId,
    /// User's email address.
    pub email: String,
    /// Display name, if the user set one.
    pub name: Option<String>,
    /// Whether the user may use the admin panel.
    pub is_admin: bool,
}

impl AuthSession {
    /// Name to greet the user with, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

//! Observable sign-in state.
//!
//! [`AuthContext`] is the single owner of "who is signed in". Anything that
//! depends on it (the cart lifecycle in particular) holds a
//! [`watch::Receiver`] obtained from [`AuthContext::subscribe`].

use tokio::sync::watch;

use crate::models::AuthSession;

/// Snapshot published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// The signed-in user, if any.
    pub session: Option<AuthSession>,
    /// Number of present-to-absent transitions so far.
    ///
    /// Subscribers compare this against the last value they saw, so a
    /// sign-out followed by a sign-in between two observations is still
    /// noticed.
    pub sign_outs: u64,
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Publisher of the current [`AuthState`].
#[derive(Debug)]
pub struct AuthContext {
    tx: watch::Sender<AuthState>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    /// A context with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::default());
        Self { tx }
    }

    /// Subscribe to sign-in changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.tx.borrow().session.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// Publish a signed-in user, replacing any previous one.
    pub fn sign_in(&self, session: AuthSession) {
        tracing::info!(user_id = %session.user_id, "Signed in");
        self.tx.send_modify(|state| state.session = Some(session));
    }

    /// Publish that nobody is signed in.
    ///
    /// Returns whether someone was signed in before the call.
    pub fn sign_out(&self) -> bool {
        self.tx.send_if_modified(|state| match state.session.take() {
            Some(previous) => {
                state.sign_outs += 1;
                tracing::info!(user_id = %previous.user_id, "Signed out");
                true
            }
            None => false,
        })
    }

    /// Publish that a previously established session is gone.
    ///
    /// Unlike [`sign_out`](Self::sign_out) this counts as a present-to-absent
    /// transition even when the session was never published in this process,
    /// e.g. a persisted token found expired at startup.
    pub fn expire(&self) {
        self.tx.send_modify(|state| {
            match state.session.take() {
                Some(previous) => tracing::info!(user_id = %previous.user_id, "Session expired"),
                None => tracing::info!("Saved session expired"),
            }
            state.sign_outs += 1;
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use heavyline_core::UserId;

    use super::*;

    fn session() -> AuthSession {
        AuthSession {
            user_id: UserId::new(1),
            email: "buyer@example.ru".to_string(),
            name: None,
            is_admin: false,
        }
    }

    #[test]
    fn test_sign_in_and_out() {
        let ctx = AuthContext::new();
        let rx = ctx.subscribe();
        assert!(!ctx.is_authenticated());

        ctx.sign_in(session());
        assert!(rx.borrow().is_authenticated());

        assert!(ctx.sign_out());
        assert!(!ctx.is_authenticated());
        assert_eq!(rx.borrow().sign_outs, 1);
    }

    #[test]
    fn test_sign_out_when_absent_is_not_a_transition() {
        let ctx = AuthContext::new();
        let mut rx = ctx.subscribe();
        rx.mark_unchanged();

        assert!(!ctx.sign_out());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(rx.borrow().sign_outs, 0);
    }

    #[test]
    fn test_expire_without_session_is_a_transition() {
        let ctx = AuthContext::new();
        let mut rx = ctx.subscribe();
        rx.mark_unchanged();

        ctx.expire();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow().sign_outs, 1);

        ctx.sign_in(session());
        ctx.expire();
        assert!(!ctx.is_authenticated());
        assert_eq!(rx.borrow().sign_outs, 2);
    }

    #[test]
    fn test_sign_outs_accumulate_across_coalesced_changes() {
        let ctx = AuthContext::new();
        let rx = ctx.subscribe();

        ctx.sign_in(session());
        ctx.sign_out();
        ctx.sign_in(session());

        let state = rx.borrow();
        assert!(state.is_authenticated());
        assert_eq!(state.sign_outs, 1);
    }
}

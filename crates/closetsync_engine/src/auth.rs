//! The injected authentication state source.

use closetsync_types::UserId;
use std::sync::Arc;
use tokio::sync::watch;

/// Observable authentication state.
///
/// `AuthState` is the coordinator's only window onto the auth provider:
/// a current (nullable) user id plus a change stream. The application's
/// composition root owns one and forwards provider events into it; the
/// engine never talks to an auth SDK directly, which is what lets tests
/// drive sign-in transitions synchronously.
///
/// Handles are cheap clones over the same channel.
#[derive(Clone)]
pub struct AuthState {
    sender: Arc<watch::Sender<Option<UserId>>>,
}

impl AuthState {
    /// A signed-out state.
    pub fn signed_out() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// A state already signed in as `user`.
    pub fn signed_in(user: UserId) -> Self {
        let (sender, _receiver) = watch::channel(Some(user));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// The currently signed-in user, if any.
    pub fn current_user(&self) -> Option<UserId> {
        self.sender.borrow().clone()
    }

    /// Records a sign-in (or account switch).
    pub fn sign_in(&self, user: UserId) {
        self.sender.send_replace(Some(user));
    }

    /// Records a sign-out.
    pub fn sign_out(&self) {
        self.sender.send_replace(None);
    }

    /// Subscribes to authentication transitions.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.sender.subscribe()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::signed_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_update_current_user() {
        let auth = AuthState::signed_out();
        assert!(auth.current_user().is_none());

        auth.sign_in(UserId::new("u1"));
        assert_eq!(auth.current_user(), Some(UserId::new("u1")));

        auth.sign_out();
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_sign_in() {
        let auth = AuthState::signed_out();
        let mut rx = auth.subscribe();

        auth.sign_in(UserId::new("u1"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(UserId::new("u1")));
    }

    #[test]
    fn clones_share_the_channel() {
        let auth = AuthState::signed_out();
        let handle = auth.clone();
        handle.sign_in(UserId::new("u2"));
        assert_eq!(auth.current_user(), Some(UserId::new("u2")));
    }
}

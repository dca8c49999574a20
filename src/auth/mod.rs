//! Authentication state
//!
//! Holds who is logged in. Credential checks happen on the backend; this
//! module only records the outcome and keeps it in sync with the session
//! store.

use crate::session::{KEY_IS_AUTHENTICATED, KEY_TOKEN, KEY_USERNAME, SessionStore};

/// Marker value stored under `isAuthenticated` while logged in
const AUTHENTICATED_MARKER: &str = "true";

/// Who is currently logged in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    is_authenticated: bool,
    username: String,
}

impl AuthState {
    /// Restore from the store.
    ///
    /// Only an exact `"true"` flag together with a non-empty username counts
    /// as logged in; anything else is treated as anonymous.
    pub fn restore(store: &impl SessionStore) -> Self {
        let flag = store.get(KEY_IS_AUTHENTICATED);
        let username = store.get(KEY_USERNAME).unwrap_or_default();

        if flag.as_deref() == Some(AUTHENTICATED_MARKER) && !username.is_empty() {
            Self {
                is_authenticated: true,
                username,
            }
        } else {
            Self::default()
        }
    }

    /// Whether a user is logged in
    pub const fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Logged-in username, empty when anonymous
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Mark `username` as logged in and persist it.
    ///
    /// Returns `false`, changing nothing, when the username is blank.
    pub fn login(&mut self, store: &mut impl SessionStore, username: &str) -> bool {
        let username = username.trim();
        if username.is_empty() {
            tracing::warn!("Ignoring login with an empty username");
            return false;
        }

        self.is_authenticated = true;
        self.username = username.to_string();
        store.set(KEY_IS_AUTHENTICATED, AUTHENTICATED_MARKER);
        store.set(KEY_USERNAME, username);
        true
    }

    /// Clear the logged-in user and remove auth keys and the token
    pub fn logout(&mut self, store: &mut impl SessionStore) {
        self.is_authenticated = false;
        self.username.clear();
        store.remove(KEY_IS_AUTHENTICATED);
        store.remove(KEY_USERNAME);
        store.remove(KEY_TOKEN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    #[test]
    fn test_login_then_logout() {
        let mut store = MemoryStore::new();
        let mut auth = AuthState::restore(&store);

        assert!(auth.login(&mut store, "alice"));
        assert!(auth.is_authenticated());
        assert_eq!(auth.username(), "alice");

        store.set(KEY_TOKEN, "jwt");
        auth.logout(&mut store);
        assert!(!auth.is_authenticated());
        assert_eq!(auth.username(), "");
        assert!(store.get(KEY_TOKEN).is_none());
        assert!(store.get(KEY_IS_AUTHENTICATED).is_none());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut store = MemoryStore::new();
        let mut auth = AuthState::default();
        auth.logout(&mut store);
        auth.logout(&mut store);
        assert_eq!(auth, AuthState::default());
    }

    #[test]
    fn test_restore_requires_exact_marker() {
        let mut store = MemoryStore::new();
        store.set(KEY_IS_AUTHENTICATED, "yes");
        store.set(KEY_USERNAME, "stale");

        let auth = AuthState::restore(&store);
        assert!(!auth.is_authenticated());
        assert_eq!(auth.username(), "");
    }

    #[test]
    fn test_restore_requires_username() {
        let mut store = MemoryStore::new();
        store.set(KEY_IS_AUTHENTICATED, "true");

        assert!(!AuthState::restore(&store).is_authenticated());
    }

    #[test]
    fn test_empty_username_is_ignored() {
        let mut store = MemoryStore::new();
        let mut auth = AuthState::default();
        assert!(!auth.login(&mut store, "   "));
        assert!(!auth.is_authenticated());
        assert!(store.get(KEY_IS_AUTHENTICATED).is_none());
    }
}

//! Persistent session store and the session lifecycle manager
//!
//! The store is a flat string key/value map, mirroring how the web client kept
//! its session in local storage. [`Session`] is created once at startup and
//! owns the store together with the auth and theme state that are restored
//! from it.

use std::collections::HashMap;

use crate::auth::AuthState;
use crate::theme::{Theme, ThemeState};

/// Key holding the literal `"true"` while a user is logged in
pub const KEY_IS_AUTHENTICATED: &str = "isAuthenticated";
/// Key holding the logged-in username
pub const KEY_USERNAME: &str = "username";
/// Key holding the bearer token issued at login
pub const KEY_TOKEN: &str = "token";
/// Key holding the selected theme (`light` or `dark`)
pub const KEY_THEME: &str = "theme";

/// Synchronous flat key/value storage for session data.
///
/// Writes never fail from the caller's point of view; backends that can fail
/// log the problem and carry on.
pub trait SessionStore {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str);

    /// Remove a value (no-op if absent)
    fn remove(&mut self, key: &str);
}

/// In-memory store, used by tests and demo runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Process-wide session: the store plus the auth and theme state restored from it
pub struct Session<S: SessionStore> {
    store: S,
    auth: AuthState,
    theme: ThemeState,
}

impl<S: SessionStore> Session<S> {
    /// Restore auth and theme from the store
    pub fn restore(mut store: S) -> Self {
        let auth = AuthState::restore(&store);
        let theme = ThemeState::restore(&mut store);
        Self { store, auth, theme }
    }

    /// Current auth state
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Current theme state
    pub const fn theme(&self) -> &ThemeState {
        &self.theme
    }

    /// Whether a user is logged in
    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Logged-in username (empty when anonymous)
    pub fn username(&self) -> &str {
        self.auth.username()
    }

    /// Stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.store.get(KEY_TOKEN).filter(|t| !t.is_empty())
    }

    /// Record a successful login and the token the server issued with it.
    /// The token is only stored when the login itself is accepted.
    pub fn login(&mut self, username: &str, token: Option<&str>) {
        if !self.auth.login(&mut self.store, username) {
            return;
        }
        if let Some(token) = token {
            self.store.set(KEY_TOKEN, token);
        }
    }

    /// Forget the logged-in user and token. Theme is kept.
    pub fn logout(&mut self) {
        self.auth.logout(&mut self.store);
    }

    /// Flip between light and dark
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle(&mut self.store)
    }

    /// Borrow the underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_defaults() {
        let session = Session::restore(MemoryStore::new());
        assert!(!session.is_authenticated());
        assert_eq!(session.username(), "");
        assert_eq!(session.theme().theme(), Theme::Light);
        assert!(session.token().is_none());
    }

    #[test]
    fn test_login_persists_username_and_token() {
        let mut session = Session::restore(MemoryStore::new());
        session.login("alice", Some("jwt-abc"));

        assert!(session.is_authenticated());
        assert_eq!(session.username(), "alice");
        assert_eq!(session.store().get(KEY_IS_AUTHENTICATED).as_deref(), Some("true"));
        assert_eq!(session.store().get(KEY_USERNAME).as_deref(), Some("alice"));
        assert_eq!(session.token().as_deref(), Some("jwt-abc"));
    }

    #[test]
    fn test_blank_username_does_not_store_token() {
        let mut session = Session::restore(MemoryStore::new());
        session.login("  ", Some("jwt-abc"));

        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.store().get(KEY_TOKEN).is_none());
    }

    #[test]
    fn test_logout_keeps_theme() {
        let mut session = Session::restore(MemoryStore::new());
        session.toggle_theme();
        session.login("alice", Some("jwt-abc"));
        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(session.username(), "");
        assert!(session.store().get(KEY_TOKEN).is_none());
        assert!(session.store().get(KEY_USERNAME).is_none());
        assert_eq!(session.store().get(KEY_THEME).as_deref(), Some("dark"));
        assert_eq!(session.theme().theme(), Theme::Dark);
    }

    #[test]
    fn test_session_survives_restart() {
        let mut session = Session::restore(MemoryStore::new());
        session.login("bob", None);
        session.toggle_theme();

        let restored = Session::restore(session.store().clone());
        assert!(restored.is_authenticated());
        assert_eq!(restored.username(), "bob");
        assert_eq!(restored.theme().theme(), Theme::Dark);
    }
}

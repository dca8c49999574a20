//! Feed state and the fetch/refresh contract
//!
//! Every refresh is tagged with a sequence number. A response is applied only
//! if its number is the latest issued, so a slow response for an older auth
//! state cannot overwrite a newer feed.

use crate::models::Post;

/// Message shown when the backend answers a feed request with an error status
pub const FEED_STATUS_ERROR: &str = "Failed to load posts";
/// Message shown when a feed request fails in transport or decoding
pub const FEED_TRANSPORT_ERROR: &str = "Error loading posts";

/// Which feed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedScope {
    /// Public posts, no auth required
    Public,
    /// Posts visible to the logged-in user
    Personal,
    /// Posts authored by the logged-in user
    Mine,
}

impl FeedScope {
    /// Scope for the current auth flag: personal when logged in, else public
    pub const fn for_auth(is_authenticated: bool) -> Self {
        if is_authenticated {
            Self::Personal
        } else {
            Self::Public
        }
    }

    /// Endpoint path, relative to the API base
    pub const fn path(self) -> &'static str {
        match self {
            Self::Public => "/posts/public",
            Self::Personal => "/posts/feed",
            Self::Mine => "/posts/my-posts",
        }
    }

    /// Whether requests for this scope carry the bearer token
    pub const fn requires_auth(self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Heading shown above the list
    pub const fn title(self) -> &'static str {
        match self {
            Self::Public => "Public Posts",
            Self::Personal => "Posts Feed",
            Self::Mine => "My Posts",
        }
    }
}

/// A fetch the caller must perform and report back via [`FeedState::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRequest {
    /// Sequence number identifying this fetch
    pub seq: u64,
    /// Feed to load
    pub scope: FeedScope,
}

/// Display state of the feed view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// A fetch is outstanding
    Loading,
    /// Last fetch succeeded
    Loaded,
    /// Last fetch failed with this message
    Error(String),
}

/// The feed, its load status and the latest error message
#[derive(Debug, Clone)]
pub struct FeedState {
    posts: Vec<Post>,
    status: FeedStatus,
    error: Option<String>,
    scope: FeedScope,
    latest_seq: u64,
    identity: Option<(bool, String)>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedState {
    /// Empty feed, waiting for its first fetch
    pub const fn new() -> Self {
        Self {
            posts: Vec::new(),
            status: FeedStatus::Loading,
            error: None,
            scope: FeedScope::Public,
            latest_seq: 0,
            identity: None,
        }
    }

    /// Posts from the last successful fetch
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Current status
    pub const fn status(&self) -> &FeedStatus {
        &self.status
    }

    /// Whether a fetch is outstanding
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, FeedStatus::Loading)
    }

    /// Latest error (fetch or mutation), if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Scope of the latest fetch
    pub const fn scope(&self) -> FeedScope {
        self.scope
    }

    /// Whether the auth flag or username differs from the last refresh
    pub fn identity_changed(&self, is_authenticated: bool, username: &str) -> bool {
        match &self.identity {
            Some((auth, name)) => *auth != is_authenticated || name != username,
            None => true,
        }
    }

    /// Start a refresh for the scope implied by the auth flag
    pub fn begin_refresh(&mut self, is_authenticated: bool, username: &str) -> FeedRequest {
        self.begin_scoped(FeedScope::for_auth(is_authenticated), is_authenticated, username)
    }

    /// Start a refresh for an explicit scope
    pub fn begin_scoped(
        &mut self,
        scope: FeedScope,
        is_authenticated: bool,
        username: &str,
    ) -> FeedRequest {
        self.latest_seq += 1;
        self.scope = scope;
        self.status = FeedStatus::Loading;
        self.error = None;
        self.identity = Some((is_authenticated, username.to_string()));
        tracing::debug!("Feed refresh #{} ({:?})", self.latest_seq, scope);

        FeedRequest {
            seq: self.latest_seq,
            scope,
        }
    }

    /// Apply the outcome of fetch `seq`.
    ///
    /// Returns `false` (and changes nothing) if a newer fetch has been issued
    /// since. On failure the previous posts are kept.
    pub fn apply(&mut self, seq: u64, result: Result<Vec<Post>, String>) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(
                "Dropping stale feed response #{} (latest #{})",
                seq,
                self.latest_seq
            );
            return false;
        }

        match result {
            Ok(posts) => {
                self.posts = posts;
                self.status = FeedStatus::Loaded;
                self.error = None;
            }
            Err(message) => {
                self.status = FeedStatus::Error(message.clone());
                self.error = Some(message);
            }
        }
        true
    }

    /// Record an error from a mutation; the feed itself is untouched
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Clear the latest error
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: i64) -> Post {
        serde_json::from_value(serde_json::json!({ "id": id, "content": format!("post {id}") }))
            .unwrap()
    }

    #[test]
    fn test_scope_for_auth() {
        assert_eq!(FeedScope::for_auth(false), FeedScope::Public);
        assert_eq!(FeedScope::for_auth(true), FeedScope::Personal);
        assert!(!FeedScope::Public.requires_auth());
        assert!(FeedScope::Mine.requires_auth());
        assert_eq!(FeedScope::Personal.path(), "/posts/feed");
    }

    #[test]
    fn test_success_replaces_posts() {
        let mut feed = FeedState::new();
        let req = feed.begin_refresh(false, "");
        assert!(feed.is_loading());
        assert!(feed.apply(req.seq, Ok(vec![post(1), post(2)])));
        assert_eq!(feed.status(), &FeedStatus::Loaded);

        let req = feed.begin_refresh(false, "");
        assert!(feed.apply(req.seq, Ok(vec![post(3)])));
        assert_eq!(feed.posts().len(), 1);
        assert_eq!(feed.posts()[0].id, 3);
    }

    #[test]
    fn test_failure_keeps_previous_posts() {
        let mut feed = FeedState::new();
        let req = feed.begin_refresh(true, "alice");
        feed.apply(req.seq, Ok(vec![post(1)]));

        let req = feed.begin_refresh(true, "alice");
        feed.apply(req.seq, Err(FEED_STATUS_ERROR.to_string()));
        assert_eq!(feed.posts().len(), 1);
        assert_eq!(feed.error(), Some(FEED_STATUS_ERROR));
        assert_eq!(
            feed.status(),
            &FeedStatus::Error(FEED_STATUS_ERROR.to_string())
        );
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut feed = FeedState::new();
        let old = feed.begin_refresh(true, "alice");
        let new = feed.begin_refresh(false, "");
        assert_eq!(new.scope, FeedScope::Public);

        assert!(feed.apply(new.seq, Ok(vec![post(10)])));
        assert!(!feed.apply(old.seq, Ok(vec![post(99), post(98)])));
        assert_eq!(feed.posts().len(), 1);
        assert_eq!(feed.posts()[0].id, 10);
    }

    #[test]
    fn test_stale_response_does_not_end_loading() {
        let mut feed = FeedState::new();
        let old = feed.begin_refresh(false, "");
        let _new = feed.begin_refresh(true, "bob");
        assert!(!feed.apply(old.seq, Err(FEED_TRANSPORT_ERROR.to_string())));
        assert!(feed.is_loading());
        assert!(feed.error().is_none());
    }

    #[test]
    fn test_refresh_clears_error() {
        let mut feed = FeedState::new();
        feed.set_error("Failed to delete post");
        feed.begin_refresh(false, "");
        assert!(feed.error().is_none());
    }

    #[test]
    fn test_identity_tracking() {
        let mut feed = FeedState::new();
        assert!(feed.identity_changed(false, ""));
        feed.begin_refresh(false, "");
        assert!(!feed.identity_changed(false, ""));
        assert!(feed.identity_changed(true, "alice"));
        feed.begin_refresh(true, "alice");
        assert!(feed.identity_changed(true, "bob"));
    }
}

//! User actions that talk to the backend
//!
//! Each action issues exactly one request and collapses every failure into a
//! message string for display. None of them touch local state; callers apply
//! the outcome (persist a login, close a form, refresh the feed).

use std::path::PathBuf;

use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::feed::{FEED_STATUS_ERROR, FEED_TRANSPORT_ERROR, FeedRequest};
use crate::models::{ChangePasswordRequest, LoginRequest, MediaType, Post, PostDraft, RegisterRequest};

// ==================== Account ====================

/// Identity returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    /// Canonical username reported by the server
    pub username: String,
    /// Bearer token for later requests
    pub token: Option<String>,
}

/// Log in with a username (or email) and password
pub async fn login(api: &ApiClient, username: &str, password: &str) -> Result<LoginSuccess, String> {
    let request = LoginRequest {
        username_or_email: username.to_string(),
        password: password.to_string(),
    };

    match api.login(&request).await {
        Ok(response) if response.success => Ok(LoginSuccess {
            username: response
                .username
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| username.to_string()),
            token: response.token.filter(|t| !t.is_empty()),
        }),
        Ok(response) => Err(response
            .message
            .unwrap_or_else(|| "Login failed".to_string())),
        Err(e) => {
            tracing::warn!("Login error: {}", e);
            Err(e
                .server_message()
                .unwrap_or("Login failed. Please try again.")
                .to_string())
        }
    }
}

/// Create a new account. Returns the server's confirmation message.
pub async fn register(
    api: &ApiClient,
    username: &str,
    email: &str,
    password: &str,
) -> Result<String, String> {
    let request = RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    };

    match api.register(&request).await {
        Ok(response) if response.success => Ok(response
            .message
            .unwrap_or_else(|| "User registered successfully!".to_string())),
        Ok(response) => Err(response
            .message
            .unwrap_or_else(|| "Registration failed".to_string())),
        Err(e) => {
            tracing::warn!("Registration error: {}", e);
            Err(e
                .server_message()
                .unwrap_or("Registration failed. Please try again.")
                .to_string())
        }
    }
}

/// Change the password of `username`
pub async fn change_password(
    api: &ApiClient,
    token: Option<&str>,
    username: &str,
    current_password: &str,
    new_password: &str,
) -> Result<String, String> {
    let request = ChangePasswordRequest {
        username: username.to_string(),
        current_password: current_password.to_string(),
        new_password: new_password.to_string(),
    };

    match api.change_password(token, &request).await {
        Ok(response) if response.success => Ok("Password changed successfully!".to_string()),
        Ok(response) => Err(response
            .message
            .unwrap_or_else(|| "Password change failed".to_string())),
        Err(e) => {
            tracing::warn!("Password change error: {}", e);
            Err(e
                .server_message()
                .unwrap_or("Password change failed. Please try again.")
                .to_string())
        }
    }
}

// ==================== Feed ====================

/// Perform a feed fetch.
///
/// The token is attached only for scopes that need it.
pub async fn fetch_feed(
    api: &ApiClient,
    request: FeedRequest,
    token: Option<&str>,
    page_size: u32,
) -> Result<Vec<Post>, String> {
    let token = token.filter(|_| request.scope.requires_auth());

    match api.feed(request.scope, token, 0, page_size).await {
        Ok(page) => Ok(page.into_content()),
        Err(ApiError::Status { status, .. }) => {
            tracing::warn!("Feed request #{} failed with {}", request.seq, status);
            Err(FEED_STATUS_ERROR.to_string())
        }
        Err(e) => {
            tracing::warn!("Error fetching posts: {}", e);
            Err(FEED_TRANSPORT_ERROR.to_string())
        }
    }
}

// ==================== Mutations ====================

/// Input rejected before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Content is empty after trimming
    #[error("Post content cannot be empty")]
    EmptyContent,
}

/// Raw post form input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    /// Post text as typed
    pub content: String,
    /// Visibility checkbox
    pub is_public: bool,
    /// Selected media type
    pub media_type: MediaType,
    /// File to upload, if chosen
    pub media_path: Option<PathBuf>,
    /// Media description as typed
    pub description: String,
}

impl Default for PostInput {
    fn default() -> Self {
        Self {
            content: String::new(),
            is_public: true,
            media_type: MediaType::None,
            media_path: None,
            description: String::new(),
        }
    }
}

impl PostInput {
    /// Pre-fill from an existing post for editing (no file selected)
    pub fn from_post(post: &Post) -> Self {
        Self {
            content: post.content.clone(),
            is_public: post.is_public,
            media_type: post.media_type,
            media_path: None,
            description: post.description.clone().unwrap_or_default(),
        }
    }

    fn trimmed_content(&self) -> Result<String, ValidationError> {
        let content = self.content.trim();
        if content.is_empty() {
            Err(ValidationError::EmptyContent)
        } else {
            Ok(content.to_string())
        }
    }

    /// Body for a new post: description only when non-empty
    pub fn for_create(&self) -> Result<PostDraft, ValidationError> {
        Ok(PostDraft {
            content: self.trimmed_content()?,
            is_public: self.is_public,
            media_type: self.media_type,
            media: self.media_path.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
        })
    }

    /// Body for an edit: description always sent, so it can be cleared
    pub fn for_update(&self) -> Result<PostDraft, ValidationError> {
        Ok(PostDraft {
            content: self.trimmed_content()?,
            is_public: self.is_public,
            media_type: self.media_type,
            media: self.media_path.clone(),
            description: Some(self.description.clone()),
        })
    }
}

/// A state-changing post request, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create a post
    Create(PostDraft),
    /// Replace fields of post `id`
    Update {
        /// Post to edit
        id: i64,
        /// New fields
        draft: PostDraft,
    },
    /// Delete post `id`
    Delete {
        /// Post to delete
        id: i64,
    },
}

impl Mutation {
    /// Validate a create form
    pub fn create(input: &PostInput) -> Result<Self, ValidationError> {
        input.for_create().map(Self::Create)
    }

    /// Validate an edit form
    pub fn update(id: i64, input: &PostInput) -> Result<Self, ValidationError> {
        input.for_update().map(|draft| Self::Update { id, draft })
    }

    /// Fallback shown when the server rejects the request without an `error` field
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::Create(_) => "Failed to create post",
            Self::Update { .. } => "Failed to update post",
            Self::Delete { .. } => "Failed to delete post",
        }
    }

    /// Shown when the request could not be completed at all
    pub const fn error_message(&self) -> &'static str {
        match self {
            Self::Create(_) => "Error creating post",
            Self::Update { .. } => "Error updating post",
            Self::Delete { .. } => "Error deleting post",
        }
    }

    /// Past-tense label for status messages
    pub const fn done_label(&self) -> &'static str {
        match self {
            Self::Create(_) => "Post created",
            Self::Update { .. } => "Post updated",
            Self::Delete { .. } => "Post deleted",
        }
    }
}

/// Send a mutation. On failure returns the message to display.
pub async fn run_mutation(
    api: &ApiClient,
    token: Option<&str>,
    mutation: &Mutation,
) -> Result<(), String> {
    let result = match mutation {
        Mutation::Create(draft) => api.create_post(token, draft).await.map(drop),
        Mutation::Update { id, draft } => api.update_post(token, *id, draft).await.map(drop),
        Mutation::Delete { id } => api.delete_post(token, *id).await,
    };

    result.map_err(|e| {
        tracing::warn!("{}: {}", mutation.error_message(), e);
        if e.has_error_body() {
            e.server_error()
                .unwrap_or(mutation.failure_message())
                .to_string()
        } else {
            mutation.error_message().to_string()
        }
    })
}

/// A delete awaiting confirmation. Nothing is sent unless it is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct PendingDelete {
    id: i64,
}

impl PendingDelete {
    /// Question shown to the user
    pub const PROMPT: &'static str = "Are you sure you want to delete this post?";

    /// Ask to delete post `id`
    pub const fn new(id: i64) -> Self {
        Self { id }
    }

    /// Post awaiting deletion
    pub const fn id(self) -> i64 {
        self.id
    }

    /// User agreed: produce the delete mutation
    pub const fn confirm(self) -> Mutation {
        Mutation::Delete { id: self.id }
    }

    /// User declined: nothing to send
    pub const fn decline(self) -> Option<Mutation> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_rejected() {
        let input = PostInput {
            content: "   \n ".to_string(),
            ..PostInput::default()
        };
        assert_eq!(Mutation::create(&input), Err(ValidationError::EmptyContent));
        assert_eq!(Mutation::update(3, &input), Err(ValidationError::EmptyContent));
    }

    #[test]
    fn test_create_trims_and_skips_empty_description() {
        let input = PostInput {
            content: "  hello  ".to_string(),
            ..PostInput::default()
        };
        let Mutation::Create(draft) = Mutation::create(&input).unwrap() else {
            panic!("expected create");
        };
        assert_eq!(draft.content, "hello");
        assert!(draft.is_public);
        assert!(draft.description.is_none());
    }

    #[test]
    fn test_update_always_sends_description() {
        let input = PostInput {
            content: "edited".to_string(),
            is_public: false,
            ..PostInput::default()
        };
        let mutation = Mutation::update(7, &input).unwrap();
        let Mutation::Update { id, draft } = mutation else {
            panic!("expected update");
        };
        assert_eq!(id, 7);
        assert_eq!(draft.description.as_deref(), Some(""));
        assert!(!draft.is_public);
    }

    #[test]
    fn test_from_post_prefills() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": 4, "content": "orig", "isPublic": false,
            "mediaType": "video", "description": "clip"
        }))
        .unwrap();
        let input = PostInput::from_post(&post);
        assert_eq!(input.content, "orig");
        assert!(!input.is_public);
        assert_eq!(input.media_type, MediaType::Video);
        assert_eq!(input.description, "clip");
        assert!(input.media_path.is_none());
    }

    #[test]
    fn test_pending_delete() {
        let pending = PendingDelete::new(42);
        assert_eq!(pending.id(), 42);
        assert_eq!(pending.decline(), None);
        assert_eq!(pending.confirm(), Mutation::Delete { id: 42 });
    }

    #[test]
    fn test_messages() {
        let delete = Mutation::Delete { id: 1 };
        assert_eq!(delete.failure_message(), "Failed to delete post");
        assert_eq!(delete.error_message(), "Error deleting post");
    }
}

//! Request and response bodies for the auth endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email address
    pub username_or_email: String,
    /// Plain-text password
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Desired username
    pub username: String,
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Body of `POST /auth/changepassword`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Account whose password changes
    pub username: String,
    /// Current password
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
}

/// Response of every auth endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Whether the operation succeeded
    #[serde(default)]
    pub success: bool,
    /// Canonical username (login/register)
    #[serde(default)]
    pub username: Option<String>,
    /// Bearer token (login)
    #[serde(default)]
    pub token: Option<String>,
    /// Human-readable outcome
    #[serde(default)]
    pub message: Option<String>,
}

//! Data models for Nutz

mod auth;
mod draft;
mod page;
mod post;

pub use auth::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest};
pub use draft::{PostDraft, guess_mime};
pub use page::Page;
pub use post::{MediaType, Post};

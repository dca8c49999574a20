//! # Nutz
//!
//! A terminal client for the Nutz social posting service.
//!
//! ## Overview
//!
//! Nutz lets you read the public feed, log in, and create, edit and delete
//! your own posts from the terminal. The login and the light/dark theme are
//! remembered between runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          App                                │
//! │  Orchestrates all components and runs the main event loop   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Session     │ │     Actions     │ │       UI        │
//! │                 │ │                 │ │                 │
//! │ • Auth state    │ │ • Login/signup  │ │ • Feed list     │
//! │ • Theme state   │ │ • Feed fetch    │ │ • Forms         │
//! │ • Store         │ │ • Mutations     │ │ • Handle input  │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │    Database     │ │       API       │ │      Feed       │
//! │                 │ │                 │ │                 │
//! │ • Session table │ │ • REST client   │ │ • Scope         │
//! │                 │ │ • Multipart     │ │ • Stale guard   │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`actions`] — One request per user action, failures turned into messages
//! - [`api`] — REST client for the backend
//! - [`app`] — TUI application state and event loop
//! - [`auth`] — Authentication state
//! - [`config`] — Configuration management
//! - [`db`] — `SQLite` session store
//! - [`feed`] — Feed state and refresh sequencing
//! - [`models`] — Wire types (Post, Page, auth requests)
//! - [`session`] — Session store trait and lifecycle
//! - [`theme`] — Light/dark theme
//!
//! ## Example
//!
//! ```no_run
//! use nutz::app;
//!
//! fn main() -> anyhow::Result<()> {
//!     app::run()
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/nutz/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::return_self_not_must_use)]

pub mod actions;
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod feed;
pub mod models;
pub mod paths;
pub mod session;
pub mod theme;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError};
pub use app::AppState;
pub use config::Config;
pub use db::Database;
pub use feed::{FeedScope, FeedState};
pub use models::{MediaType, Post};
pub use session::{MemoryStore, Session, SessionStore};
pub use theme::{Theme, ThemeColors};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

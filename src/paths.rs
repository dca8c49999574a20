//! Common paths for Nutz data storage
//!
//! All Nutz data is stored under ~/.config/nutz/ on all platforms:
//! - config.toml - User configuration
//! - nutz.sqlite - Session store (auth flag, username, token, theme)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the Nutz data directory (~/.config/nutz/)
pub fn nutz_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let nutz_dir = home.join(".config").join("nutz");
    fs::create_dir_all(&nutz_dir).context("Failed to create nutz directory")?;
    Ok(nutz_dir)
}

/// Get the config file path (~/.config/nutz/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(nutz_dir()?.join("config.toml"))
}

/// Get the session database path (~/.config/nutz/nutz.sqlite)
pub fn database_path() -> Result<PathBuf> {
    Ok(nutz_dir()?.join("nutz.sqlite"))
}

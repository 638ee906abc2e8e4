//! Configuration for the webca server.
//!
//! Provides TOML-based configuration with:
//! - `[server]` bind address and development switches
//! - `[session]` idle lifetime, reaper interval and cookie name
//! - `[[users]]` accounts allowed to log in
//! - Config file layering (user config dir + project-local `webca.toml`)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, xdg_config_dir,
    xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;

//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [server]                 # listener and development switches
//! [session]                # idle lifetime and reaper interval
//! [[users]]                # accounts allowed to log in
//! ```

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebcaConfig {
    /// Server configuration.
    pub server: Option<ServerConfig>,

    /// Session store configuration.
    pub session: Option<SessionConfig>,

    /// Accounts allowed to log in.
    pub users: Vec<UserConfig>,
}

impl WebcaConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// A non-empty user list replaces the existing one.
    pub fn merge(&mut self, other: WebcaConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }

        if other.session.is_some() {
            self.session = other.session;
        }

        if !other.users.is_empty() {
            self.users = other.users;
        }
    }

    /// Server section, or defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Session section, or defaults.
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }

    /// Look up a user by login name.
    pub fn user(&self, username: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Check values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.server().socket_addr()?;
        self.session().validate()?;

        for (i, user) in self.users.iter().enumerate() {
            user.validate()?;
            if self.users[..i].iter().any(|u| u.username == user.username) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate user '{}'",
                    user.username
                )));
            }
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Log in every session as a fixed development user.
    pub faked_login: bool,
    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            faked_login: false,
            request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Parse `bind` and `port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address '{}'", self.bind)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session store configuration.
///
/// ```toml
/// [session]
/// max_age_secs = 1800
/// cleanup_interval_secs = 60
/// cookie_name = "goSessionId"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle seconds after which a session is evicted.
    pub max_age_secs: u64,
    /// Seconds between reaper sweeps.
    pub cleanup_interval_secs: u64,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 30 * 60,
            cleanup_interval_secs: 60,
            cookie_name: "goSessionId".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.max_age_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.max_age_secs must be positive".to_string(),
            ));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.cleanup_interval_secs must be positive".to_string(),
            ));
        }
        let valid_name = !self.cookie_name.is_empty()
            && self
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
        if !valid_name {
            return Err(ConfigError::Invalid(format!(
                "invalid cookie name '{}'",
                self.cookie_name
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User Accounts
// ─────────────────────────────────────────────────────────────────────────────

/// An account allowed to log in.
///
/// ```toml
/// [[users]]
/// username = "admin"
/// full_name = "Administrator"
/// email = "admin@example.com"
/// password_sha256 = "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub username: String,
    pub full_name: String,
    pub email: String,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
}

impl UserConfig {
    fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(ConfigError::Invalid("user with empty username".to_string()));
        }
        let hash_ok = self.password_sha256.len() == 64
            && self
                .password_sha256
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !hash_ok {
            return Err(ConfigError::Invalid(format!(
                "user '{}': password_sha256 must be 64 lowercase hex characters",
                self.username
            )));
        }
        Ok(())
    }
}

//! Server configuration.

use std::net::SocketAddr;

use webca_session::SessionConfig;

use crate::auth::UserAccount;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Session registry settings.
    pub session: SessionConfig,

    /// Accounts allowed to log in.
    pub users: Vec<UserAccount>,

    /// Log every session in as a fixed development user.
    pub faked_login: bool,

    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            session: SessionConfig::default(),
            users: Vec::new(),
            faked_login: false,
            request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the session registry settings.
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Add an account allowed to log in.
    pub fn with_user(mut self, user: UserAccount) -> Self {
        self.users.push(user);
        self
    }

    /// Enable or disable faked login.
    pub fn with_faked_login(mut self, enabled: bool) -> Self {
        self.faked_login = enabled;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Find an account by login name.
    pub fn user(&self, username: &str) -> Option<&UserAccount> {
        self.users.iter().find(|u| u.user.username == username)
    }
}

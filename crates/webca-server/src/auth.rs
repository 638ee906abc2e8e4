//! Credential checks.
//!
//! Passwords are stored as lowercase SHA-256 hex digests and compared in
//! constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use webca_session::LoggedUser;

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

/// An account allowed to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Identity stored in the session on login.
    pub user: LoggedUser,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
}

impl UserAccount {
    /// Create an account from an already hashed password.
    pub fn new(user: LoggedUser, password_sha256: impl Into<String>) -> Self {
        Self {
            user,
            password_sha256: password_sha256.into(),
        }
    }

    /// Create an account from a plaintext password.
    pub fn from_password(
        username: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: &str,
    ) -> Self {
        Self::new(
            LoggedUser::new(username, full_name, email),
            hash_password(password),
        )
    }

    /// Check a plaintext password against the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        constant_time_eq(&hash_password(password), &self.password_sha256)
    }
}

/// User stored on every session when faked login is enabled.
pub fn faked_user() -> LoggedUser {
    LoggedUser::new("fuser", "Faked User", "fuser@fuser.com")
}

// ─────────────────────────────────────────────────────────────────────────────
// Security Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Lowercase hex SHA-256 of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compare two strings in constant time.
///
/// Strings of different length still run a comparison so the mismatch is
/// not observable through timing.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Typed values stored in a session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the user bound to a logged-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedUser {
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Contact address.
    pub email: String,
}

impl LoggedUser {
    pub fn new(
        username: impl Into<String>,
        full_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            full_name: full_name.into(),
            email: email.into(),
        }
    }
}

/// A value held under a session key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SessionValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Timestamp(DateTime<Utc>),
    User(LoggedUser),
    /// Free-form payload, e.g. half-filled form state.
    Json(serde_json::Value),
}

impl SessionValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SessionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            SessionValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SessionValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&LoggedUser> {
        match self {
            SessionValue::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            SessionValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl From<String> for SessionValue {
    fn from(s: String) -> Self {
        SessionValue::Text(s)
    }
}

impl From<&str> for SessionValue {
    fn from(s: &str) -> Self {
        SessionValue::Text(s.to_string())
    }
}

impl From<bool> for SessionValue {
    fn from(b: bool) -> Self {
        SessionValue::Flag(b)
    }
}

impl From<i64> for SessionValue {
    fn from(n: i64) -> Self {
        SessionValue::Integer(n)
    }
}

impl From<DateTime<Utc>> for SessionValue {
    fn from(ts: DateTime<Utc>) -> Self {
        SessionValue::Timestamp(ts)
    }
}

impl From<LoggedUser> for SessionValue {
    fn from(u: LoggedUser) -> Self {
        SessionValue::User(u)
    }
}

impl From<serde_json::Value> for SessionValue {
    fn from(v: serde_json::Value) -> Self {
        SessionValue::Json(v)
    }
}

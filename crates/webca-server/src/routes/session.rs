//! Endpoints over the logged-in session.

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use webca_session::{LoggedUser, SessionValue};

use crate::error::Result;
use crate::session::CurrentSession;
use crate::state::AppState;

/// Session summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub user: Option<LoggedUser>,
    /// Caller-owned entries; reserved keys and the user are excluded.
    pub data: BTreeMap<String, SessionValue>,
}

/// GET /api/session - Describe the current session.
pub async fn get_session_handler(
    Extension(current): Extension<CurrentSession>,
) -> Json<SessionResponse> {
    let data = current
        .record
        .payload()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();

    Json(SessionResponse {
        user: current.record.logged_user().cloned(),
        id: current.id,
        data,
    })
}

/// PUT /api/session/data/{key} - Store a JSON value in the session.
pub async fn put_value_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Extension(mut current): Extension<CurrentSession>,
    Json(value): Json<serde_json::Value>,
) -> Result<StatusCode> {
    current.record.insert(key.as_str(), value)?;
    state.registry().save(&current.record).await?;
    debug!(session_id = %current.id, key = %key, "Stored session value");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/session/data/{key} - Remove a value from the session.
pub async fn delete_value_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Extension(mut current): Extension<CurrentSession>,
) -> Result<StatusCode> {
    if current.record.remove(&key)?.is_some() {
        state.registry().save(&current.record).await?;
        debug!(session_id = %current.id, key = %key, "Removed session value");
    }
    Ok(StatusCode::NO_CONTENT)
}

//! Login and logout endpoints.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cookies::{RequestHeaders, ResponseHeaders};
use crate::error::{Result, ServerError};
use crate::session::CurrentSession;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Where the client should go after logging in.
    #[serde(default)]
    pub url: Option<String>,
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub redirect: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /login - Bind a user to the current session.
pub async fn login_handler(
    State(state): State<AppState>,
    Extension(mut current): Extension<CurrentSession>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let account = state
        .config()
        .user(&request.username)
        .filter(|account| account.verify(&request.password));

    let Some(account) = account else {
        warn!(session_id = %current.id, username = %request.username, "Login rejected");
        return Err(ServerError::AccessDenied);
    };

    current.record.set_logged_user(account.user.clone());
    state.registry().save(&current.record).await?;
    info!(session_id = %current.id, username = %account.user.username, "Logged in");

    let redirect = request
        .url
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| "/".to_string());

    Ok(Json(LoginResponse { redirect }))
}

/// POST /logout - Drop the session and expire its cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    mut headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let mut response_headers = HeaderMap::new();
    state
        .binder
        .remove_session(
            &RequestHeaders(&mut headers),
            &mut ResponseHeaders(&mut response_headers),
        )
        .await?;

    if !response_headers.is_empty() {
        info!("Logged out");
    }

    Ok((StatusCode::NO_CONTENT, response_headers))
}

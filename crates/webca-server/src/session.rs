//! Session middleware.
//!
//! [`session_middleware`] binds every request to a registry session and makes
//! a copy of its record available to handlers as [`CurrentSession`].
//! [`access_control`] rejects sessions that are not logged in.

use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;
use webca_session::SessionRecord;

use crate::auth::faked_user;
use crate::cookies::{RequestHeaders, ResponseHeaders};
use crate::error::{Result, ServerError};
use crate::state::AppState;

/// The session bound to the current request.
///
/// `record` is a copy; changes become visible to other requests only after
/// [`SessionRegistry::save`](webca_session::SessionRegistry::save).
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub record: SessionRecord,
}

/// Bind the request to a session, issuing a cookie when it has none.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let mut issued = HeaderMap::new();
    let record = state
        .binder
        .get_or_create_session(
            &mut RequestHeaders(request.headers_mut()),
            &mut ResponseHeaders(&mut issued),
        )
        .await?;

    let id = record
        .id()
        .map(str::to_string)
        .ok_or(webca_session::Error::MissingId)?;
    request
        .extensions_mut()
        .insert(CurrentSession { id, record });

    let mut response = next.run(request).await;
    for (name, value) in &issued {
        response.headers_mut().append(name, value.clone());
    }
    Ok(response)
}

/// Require a logged-in session.
///
/// With faked login enabled, sessions without a user are logged in as the
/// fixed development user instead of being rejected.
pub async fn access_control(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let Some(current) = request.extensions_mut().get_mut::<CurrentSession>() else {
        return Err(ServerError::Internal(
            "access control requires session middleware".to_string(),
        ));
    };

    if current.record.logged_user().is_none() {
        if !state.config().faked_login {
            return Err(ServerError::LoginRequired {
                session_id: current.id.clone(),
            });
        }

        current.record.set_logged_user(faked_user());
        state.registry().save(&current.record).await?;
        debug!(session_id = %current.id, "Faked login");
    }

    Ok(next.run(request).await)
}

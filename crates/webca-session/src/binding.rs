//! Binding between the session cookie and the registry.
//!
//! The binder is transport-agnostic: HTTP layers implement
//! [`RequestCookies`] and [`ResponseCookies`] over their own request and
//! response types.

use std::time::Duration;

use cookie::Cookie;
use tracing::debug;

use crate::error::{CookieError, Result};
use crate::id::IdGenerator;
use crate::record::SessionRecord;
use crate::registry::SessionRegistry;

/// Cookie read/attach operations on an inbound request.
pub trait RequestCookies {
    /// Value of the cookie named `name`.
    ///
    /// `Ok(None)` means the cookie is not present; `Err` means the cookie
    /// header could not be read.
    fn cookie(&self, name: &str) -> std::result::Result<Option<String>, CookieError>;

    /// Add a cookie to the in-flight request so later readers observe it.
    fn attach(&mut self, cookie: &SessionCookie);
}

/// Cookie write operations on an outbound response.
pub trait ResponseCookies {
    fn set_cookie(&mut self, cookie: &SessionCookie);
}

/// The session cookie as written to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// `None` leaves the cookie scoped to the browser session.
    pub max_age: Option<Duration>,
}

impl SessionCookie {
    /// Cookie issuing a new session identifier.
    pub fn issue(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age: None,
        }
    }

    /// Cookie instructing the browser to discard the session cookie.
    pub fn expire(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            max_age: Some(Duration::ZERO),
            ..Self::issue(name, value)
        }
    }

    /// `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        let mut builder =
            Cookie::build((self.name.as_str(), self.value.as_str())).path(self.path.as_str());
        if let Some(max_age) = self.max_age {
            let secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
            builder = builder.max_age(cookie::time::Duration::seconds(secs));
        }
        builder.build().to_string()
    }

    /// `name=value` pair as carried in a request `Cookie` header.
    pub fn to_pair(&self) -> String {
        Cookie::new(self.name.as_str(), self.value.as_str())
            .stripped()
            .to_string()
    }
}

/// Find the cookie named `name` in a request `Cookie` header value.
///
/// Pairs belonging to other cookies are skipped without being parsed, so a
/// malformed foreign cookie never hides the session cookie. A pair named
/// `name` that fails to parse is an error. Surrounding double quotes are
/// stripped from the value, and pairs with an empty value are skipped.
pub fn find_cookie(header: &str, name: &str) -> std::result::Result<Option<String>, CookieError> {
    for pair in header.split(';').map(str::trim) {
        let pair_name = pair.split_once('=').map_or(pair, |(n, _)| n).trim();
        if pair_name != name {
            continue;
        }

        let cookie = Cookie::parse(pair).map_err(|e| CookieError::InvalidPair(e.to_string()))?;
        let value = cookie.value_trimmed();
        if !value.is_empty() {
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

/// Ties request cookies to registry sessions.
#[derive(Clone, Debug)]
pub struct SessionBinder {
    registry: SessionRegistry,
    ids: IdGenerator,
}

impl SessionBinder {
    pub fn new(registry: SessionRegistry) -> Self {
        Self::with_id_generator(registry, IdGenerator::new())
    }

    pub fn with_id_generator(registry: SessionRegistry, ids: IdGenerator) -> Self {
        Self { registry, ids }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn cookie_name(&self) -> &str {
        &self.registry.config().cookie_name
    }

    /// Session identifier carried by the request, issuing a new one if absent.
    ///
    /// A freshly issued cookie is set on the response and also attached to
    /// the request, so a second call for the same request returns the same
    /// identifier. An empty cookie value counts as absent.
    pub fn session_id<Rq, Rs>(&self, request: &mut Rq, response: &mut Rs) -> Result<String>
    where
        Rq: RequestCookies + ?Sized,
        Rs: ResponseCookies + ?Sized,
    {
        let name = self.cookie_name();
        if let Some(id) = request.cookie(name)?.filter(|v| !v.is_empty()) {
            return Ok(id);
        }

        let id = self.ids.generate()?;
        let cookie = SessionCookie::issue(name, id.as_str());
        response.set_cookie(&cookie);
        request.attach(&cookie);

        debug!(session_id = %id, "Issued session cookie");
        Ok(id)
    }

    /// Session record bound to the request; see [`SessionRegistry::get_or_create`].
    pub async fn get_or_create_session<Rq, Rs>(
        &self,
        request: &mut Rq,
        response: &mut Rs,
    ) -> Result<SessionRecord>
    where
        Rq: RequestCookies + ?Sized,
        Rs: ResponseCookies + ?Sized,
    {
        let id = self.session_id(request, response)?;
        Ok(self.registry.get_or_create(&id).await)
    }

    /// Log the session out: drop the registry entry and expire the cookie.
    ///
    /// Does nothing when the request carries no session cookie.
    pub async fn remove_session<Rq, Rs>(&self, request: &Rq, response: &mut Rs) -> Result<()>
    where
        Rq: RequestCookies + ?Sized,
        Rs: ResponseCookies + ?Sized,
    {
        let name = self.cookie_name();
        let Some(id) = request.cookie(name)? else {
            return Ok(());
        };

        self.registry.remove(&id).await;
        response.set_cookie(&SessionCookie::expire(name, id));
        Ok(())
    }
}

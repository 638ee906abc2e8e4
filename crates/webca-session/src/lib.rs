//! Server-side session store for the webca web UI.
//!
//! This crate binds an opaque identifier carried in a browser cookie to a
//! bag of per-user state:
//! - [`SessionRegistry`]: keyed store with copy-on-read and explicit save
//! - [`SessionBinder`]: cookie protocol for locating or issuing a session
//! - [`Reaper`]: background eviction of idle sessions
//!
//! # Example
//!
//! ```rust,ignore
//! use webca_session::{SessionBinder, SessionConfig, SessionRegistry};
//! use tokio_util::sync::CancellationToken;
//!
//! let registry = SessionRegistry::new(SessionConfig::default());
//! let reaper = registry.spawn_reaper(CancellationToken::new());
//! let binder = SessionBinder::new(registry);
//!
//! let mut session = binder.get_or_create_session(&mut request, &mut response).await?;
//! session.set_logged_user(user);
//! binder.registry().save(&session).await?;
//! ```

mod binding;
mod clock;
mod config;
mod error;
mod id;
mod reaper;
mod record;
mod registry;
mod value;

pub use binding::{RequestCookies, ResponseCookies, SessionBinder, SessionCookie, find_cookie};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_COOKIE_NAME, DEFAULT_MAX_AGE, SessionConfig};
pub use error::{CookieError, Error, Result};
pub use id::{EntropySource, ID_BYTES, IdGenerator, OsEntropy};
pub use reaper::{MIN_SWEEP_INTERVAL, Reaper};
pub use record::{LAST_USED_KEY, LOGGED_USER_KEY, SESSION_ID_KEY, SessionRecord, is_reserved};
pub use registry::SessionRegistry;
pub use value::{LoggedUser, SessionValue};

//! HTTP routes.

pub mod auth;
pub mod health;
pub mod session;

pub use auth::{LoginRequest, LoginResponse, login_handler, logout_handler};
pub use health::{HealthResponse, health, health_routes};
pub use session::{
    SessionResponse, delete_value_handler, get_session_handler, put_value_handler,
};

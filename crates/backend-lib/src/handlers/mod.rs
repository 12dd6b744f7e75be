//! HTTP handlers for the auth endpoints.
pub mod auth;
pub mod extract;

pub use auth::{health, login, logout, signup, validate};

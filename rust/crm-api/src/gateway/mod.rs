//! Request authentication.

pub mod auth;

pub use auth::{auth_middleware, generate_jwt, validate_jwt, AuthenticatedUser, Claims};

//! Auth module: three-layer architecture (domain, token/password helpers, service).
//!
//! Signup, login, password reset and token verification live here; the
//! server only maps HTTP onto these calls.

pub mod domain;
pub mod errors;
pub mod password;
pub mod service;
pub mod token;

pub use service::AuthService;
pub use token::{Claims, TokenKeys};

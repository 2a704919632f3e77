//! API Middleware
//!
//! The request gate: session resolution, super-admin verification, and
//! tenant resolution, composed as tower layers in `lib.rs`.

pub mod admin;
pub mod auth;
pub mod tenant;

pub use admin::require_super_admin;
pub use auth::{require_auth, AuthState, AuthUser};
pub use tenant::{resolve_org, OrgContext};

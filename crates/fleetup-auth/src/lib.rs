//! Authentication primitives for the Fleetup API
//!
//! Session and impersonation tokens are HS256-signed JWTs; passwords are
//! hashed with Argon2id. Token issuance and validation live here so the
//! API crate never touches `jsonwebtoken` directly.

pub mod jwt;
pub mod password;

pub use jwt::{JwtClaims, JwtError, JwtValidator, TOKEN_TYPE_IMPERSONATION, TOKEN_TYPE_SESSION};
pub use password::{hash_password, verify_password, PasswordError};

//! # auth-adapters
//!
//! Implementations of the credential ports from `domains`.
//!
//! - [`password::Argon2Hasher`]: always compiled.
//! - [`jwt::JwtTokenService`]: feature `auth-jwt`; HS256 bearer tokens.

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;

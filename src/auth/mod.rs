use thiserror::Error;

pub mod claims;
pub(crate) mod extractors;
pub mod jwt;
pub mod password;

pub use claims::Claims;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no token presented")]
    Missing,
    #[error("invalid or expired token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("access token required")]
    WrongKind,
}

/// Verifies an opaque bearer token and yields the caller's claims.
pub trait Authenticator: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

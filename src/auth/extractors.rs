use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Token from an `Authorization: Bearer <token>` header, if one was sent.
///
/// Never rejects: a missing or malformed header just yields `None` and the
/// handler falls back to the `token` request field.
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| {
                auth.strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);

        Ok(BearerToken(token))
    }
}

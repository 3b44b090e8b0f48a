use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{dto::Validate, error::UserError};

/// JSON body that passed [`Validate`]; malformed bodies become 422 envelopes.
pub struct ValidJson<R: Validate>(pub R::Output);

/// Query string that passed [`Validate`].
pub struct ValidQuery<R: Validate>(pub R::Output);

/// Raw `:id` path segment.
///
/// Parsed only once the caller is authenticated, so a bad token is reported
/// ahead of an id that cannot name a user.
pub struct UserId(pub String);

impl UserId {
    /// A segment that is not a UUID cannot name a user.
    pub fn parse(&self) -> Result<Uuid, UserError> {
        Uuid::parse_str(&self.0).map_err(|_| UserError::NotFound(self.0.clone()))
    }
}

#[async_trait]
impl<S, R> FromRequest<S> for ValidJson<R>
where
    S: Send + Sync,
    R: DeserializeOwned + Validate + Send,
    R::Output: Send,
{
    type Rejection = UserError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<R>::from_request(req, state)
            .await
            .map_err(|e| UserError::Validation(e.body_text()))?;
        raw.validate().map(ValidJson).map_err(UserError::Validation)
    }
}

#[async_trait]
impl<S, R> FromRequestParts<S> for ValidQuery<R>
where
    S: Send + Sync,
    R: DeserializeOwned + Validate + Send,
    R::Output: Send,
{
    type Rejection = UserError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<R>::from_request_parts(parts, state)
            .await
            .map_err(|e| UserError::Validation(e.body_text()))?;
        raw.validate().map(ValidQuery).map_err(UserError::Validation)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = UserError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| UserError::Validation(e.body_text()))?;
        Ok(UserId(raw))
    }
}

use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::debug;

use super::{claims::TokenKind, AuthError, Authenticator, Claims};
use crate::config::JwtConfig;

#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }
}

impl JwtKeys {
    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation
    }
}

impl Authenticator for JwtKeys {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation())?;
        if data.claims.kind != TokenKind::Access {
            return Err(AuthError::WrongKind);
        }
        debug!(caller_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

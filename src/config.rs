use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// What `list` answers when the requested page holds no users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPagePolicy {
    /// 400 with `status=false` (legacy behaviour).
    Failure,
    /// 200 with `status=true` and the empty page.
    Success,
}

/// What `update` does when no user has the given id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMissingPolicy {
    /// Create the user under that id (legacy find-or-create).
    Create,
    /// Answer 404.
    Reject,
}

impl FromStr for EmptyPagePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "failure" => Ok(Self::Failure),
            "success" => Ok(Self::Success),
            other => anyhow::bail!("unknown empty page policy {other:?}, expected failure|success"),
        }
    }
}

impl FromStr for UpdateMissingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "reject" => Ok(Self::Reject),
            other => anyhow::bail!("unknown update policy {other:?}, expected create|reject"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UsersPolicy {
    pub empty_page: EmptyPagePolicy,
    pub update_missing: UpdateMissingPolicy,
}

impl Default for UsersPolicy {
    fn default() -> Self {
        Self {
            empty_page: EmptyPagePolicy::Failure,
            update_missing: UpdateMissingPolicy::Create,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub users: UsersPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "usermgmt".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "usermgmt-clients".into()),
        };

        let mut users = UsersPolicy::default();
        if let Ok(v) = std::env::var("USERS_EMPTY_PAGE") {
            users.empty_page = v.parse()?;
        }
        if let Ok(v) = std::env::var("USERS_UPDATE_MISSING") {
            users.update_missing = v.parse()?;
        }

        Ok(Self {
            database_url,
            jwt,
            users,
        })
    }
}

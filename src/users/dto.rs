use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniform response wrapper for every users endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Success without a payload.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Shape checks that run before a handler body.
pub trait Validate {
    type Output;

    /// Returns the first violated rule as a client-facing message.
    fn validate(self) -> Result<Self::Output, String>;
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(field: &str, value: Option<String>) -> Result<String, String> {
    match value.map(|v| v.trim().to_owned()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("The {field} field is required.")),
    }
}

fn email(value: Option<String>) -> Result<String, String> {
    let email = required("email", value)?.to_lowercase();
    if !is_valid_email(&email) {
        return Err("The email field must be a valid email address.".into());
    }
    Ok(email)
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    15
}

/// `?token=..` for endpoints that carry nothing else.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

impl Validate for TokenQuery {
    type Output = TokenQuery;

    fn validate(self) -> Result<Self::Output, String> {
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub token: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Validate for ListUsersQuery {
    type Output = ListUsersQuery;

    fn validate(self) -> Result<Self::Output, String> {
        if self.page == 0 {
            return Err("The page must be at least 1.".into());
        }
        if self.per_page == 0 {
            return Err("The per page must be at least 1.".into());
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub struct CreateUser {
    pub token: Option<String>,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for CreateUserRequest {
    type Output = CreateUser;

    fn validate(self) -> Result<Self::Output, String> {
        let name = required("name", self.name)?;
        let email = email(self.email)?;
        // passwords are taken verbatim, whitespace included
        let password = match self.password {
            Some(p) if !p.is_empty() => p,
            _ => return Err("The password field is required.".into()),
        };
        Ok(CreateUser {
            token: self.token,
            name,
            email,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub token: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub struct UpdateUser {
    pub token: Option<String>,
    /// Absent when the id comes from the path.
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
}

impl Validate for UpdateUserRequest {
    type Output = UpdateUser;

    fn validate(self) -> Result<Self::Output, String> {
        let id = match self.id.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) {
            Some(raw) => Some(
                Uuid::parse_str(&raw).map_err(|_| "The id must be a valid UUID.".to_string())?,
            ),
            None => None,
        };
        let name = required("name", self.name)?;
        let email = email(self.email)?;
        Ok(UpdateUser {
            token: self.token,
            id,
            name,
            email,
        })
    }
}

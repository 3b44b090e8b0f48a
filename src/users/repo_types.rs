use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as read back from the store.
///
/// The credential hash is write-only and never selected into this type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,       // assigned by the store
    pub name: String,
    pub email: String,  // not unique
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields for a brand new user; the hash is already transformed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Result of a find-or-create; a found user is returned untouched.
#[derive(Debug, Clone)]
pub struct FoundOrCreated {
    pub user: User,
    pub created: bool,
}

/// One page of a listing, 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let per = u64::from(per_page.max(1));
        let last_page = total.div_ceil(per).max(1);
        let offset = Self::offset(page, per_page);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + data.len() as u64))
        };
        Self {
            current_page: page,
            data,
            per_page,
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            from,
            to,
        }
    }

    /// Rows to skip before `page`.
    pub fn offset(page: u32, per_page: u32) -> u64 {
        u64::from(page.saturating_sub(1)) * u64::from(per_page)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{FoundOrCreated, NewUser, Page, User};

/// Persistence seam for the users resource.
///
/// Every call either succeeds or fails with an error; absence is reported
/// through `Option`/`bool`, never through an error.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn paginate(&self, page: u32, per_page: u32) -> anyhow::Result<Page<User>>;
    async fn create(&self, new: NewUser) -> anyhow::Result<User>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Update name and email of an existing user; `None` if there is none.
    async fn update(&self, id: Uuid, name: &str, email: &str) -> anyhow::Result<Option<User>>;
    /// Return the user untouched if it exists, otherwise create it under
    /// `id` with the given fields and no credential.
    async fn find_or_create(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> anyhow::Result<FoundOrCreated>;
    /// `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct FindOrCreateRow {
    #[sqlx(flatten)]
    user: User,
    inserted: bool,
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn paginate(&self, page: u32, per_page: u32) -> anyhow::Result<Page<User>> {
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.db)
            .await
            .context("count users")?;

        let offset = i64::try_from(Page::<User>::offset(page, per_page)).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM users
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list users")?;

        Ok(Page::new(rows, page, per_page, total.max(0) as u64))
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user")?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, name: &str, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, email = $3, updated_at = now()
             WHERE id = $1
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(user)
    }

    async fn find_or_create(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> anyhow::Result<FoundOrCreated> {
        // both branches read the pre-insert snapshot, so exactly one yields a row
        let row = sqlx::query_as::<_, FindOrCreateRow>(
            r#"
            WITH inserted AS (
                INSERT INTO users (id, name, email)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO NOTHING
                RETURNING id, name, email, created_at, updated_at
            )
            SELECT id, name, email, created_at, updated_at, TRUE AS inserted
              FROM inserted
            UNION ALL
            SELECT id, name, email, created_at, updated_at, FALSE AS inserted
              FROM users
             WHERE id = $1
               AND NOT EXISTS (SELECT 1 FROM inserted)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_one(&self.db)
        .await
        .context("find or create user")?;

        Ok(FoundOrCreated {
            user: row.user,
            created: row.inserted,
        })
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected() > 0)
    }
}

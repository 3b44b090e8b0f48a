use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::UserStore;
use super::repo_types::{FoundOrCreated, NewUser, Page, User};

/// Process-local store, used when no database is configured and in tests.
///
/// Credentials live beside the records, never inside them, the same way the
/// Postgres store never selects its hash column.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    credentials: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn credential(&self, id: Uuid) -> Option<String> {
        self.credentials.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn paginate(&self, page: u32, per_page: u32) -> anyhow::Result<Page<User>> {
        let users = self.users.read().await;
        let mut all: Vec<&User> = users.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let offset = usize::try_from(Page::<User>::offset(page, per_page)).unwrap_or(usize::MAX);
        let data = all
            .iter()
            .skip(offset)
            .take(per_page as usize)
            .map(|u| (*u).clone())
            .collect();
        Ok(Page::new(data, page, per_page, all.len() as u64))
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            created_at: now,
            updated_at: now,
        };
        self.users.write().await.insert(user.id, user.clone());
        self.credentials
            .write()
            .await
            .insert(user.id, new.password_hash);
        Ok(user)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, name: &str, email: &str) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.name = name.to_owned();
            user.email = email.to_owned();
            user.updated_at = OffsetDateTime::now_utc();
            user.clone()
        }))
    }

    async fn find_or_create(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> anyhow::Result<FoundOrCreated> {
        let mut users = self.users.write().await;
        let created = !users.contains_key(&id);
        let user = users.entry(id).or_insert_with(|| {
            let now = OffsetDateTime::now_utc();
            User {
                id,
                name: name.to_owned(),
                email: email.to_owned(),
                created_at: now,
                updated_at: now,
            }
        });
        Ok(FoundOrCreated {
            user: user.clone(),
            created,
        })
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.credentials.write().await.remove(&id);
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let store = InMemoryUserStore::new();
        let a = store.create(new_user("Ada")).await.unwrap();
        let b = store.create(new_user("Ada")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.find(a.id).await.unwrap().unwrap().email, "ada@example.com");
        assert_eq!(store.credential(a.id).await.as_deref(), Some("$argon2id$stub"));
    }

    #[tokio::test]
    async fn paginates_with_totals() {
        let store = InMemoryUserStore::new();
        for name in ["A", "B", "C", "D", "E"] {
            store.create(new_user(name)).await.unwrap();
        }

        let page = store.paginate(2, 2).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.from, Some(3));

        let beyond = store.paginate(9, 2).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[tokio::test]
    async fn update_only_touches_existing_rows() {
        let store = InMemoryUserStore::new();
        assert!(store.update(Uuid::new_v4(), "x", "x@example.com").await.unwrap().is_none());

        let user = store.create(new_user("Bob")).await.unwrap();
        let updated = store.update(user.id, "Robert", "rob@example.com").await.unwrap().unwrap();
        assert_eq!(updated.name, "Robert");
        assert_eq!(store.credential(user.id).await.as_deref(), Some("$argon2id$stub"));
    }

    #[tokio::test]
    async fn find_or_create_leaves_existing_rows_alone() {
        let store = InMemoryUserStore::new();
        let id = Uuid::new_v4();

        let first = store.find_or_create(id, "Eve", "eve@example.com").await.unwrap();
        assert!(first.created);
        assert_eq!(first.user.id, id);
        assert_eq!(first.user.name, "Eve");
        assert!(store.credential(id).await.is_none());

        let second = store.find_or_create(id, "Eve 2", "eve2@example.com").await.unwrap();
        assert!(!second.created);
        assert_eq!(second.user.name, "Eve");
        assert_eq!(second.user.updated_at, first.user.updated_at);
        assert_eq!(store.find(id).await.unwrap().unwrap().email, "eve@example.com");
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("Zed")).await.unwrap();
        assert!(store.delete(user.id).await.unwrap());
        assert!(!store.delete(user.id).await.unwrap());
        assert!(store.find(user.id).await.unwrap().is_none());
        assert!(store.credential(user.id).await.is_none());
    }
}

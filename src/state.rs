use crate::auth::{jwt::JwtKeys, Authenticator};
use crate::config::AppConfig;
use crate::users::{InMemoryUserStore, PgUserStore, UserStore};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<dyn Authenticator>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let auth = Arc::new(JwtKeys::from(&config.jwt)) as Arc<dyn Authenticator>;

        let users = match &config.database_url {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory");
                Arc::new(InMemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Ok(Self::from_parts(config, auth, users))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        auth: Arc<dyn Authenticator>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            auth,
            users,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(
            crate::config::UsersPolicy::default(),
            Arc::new(InMemoryUserStore::new()),
        )
    }

    #[cfg(test)]
    pub fn fake_with(policy: crate::config::UsersPolicy, users: Arc<dyn UserStore>) -> Self {
        let jwt = crate::auth::jwt::testing::test_config();
        let auth = Arc::new(JwtKeys::from(&jwt)) as Arc<dyn Authenticator>;
        let config = Arc::new(AppConfig {
            database_url: None,
            jwt,
            users: policy,
        });
        Self::from_parts(config, auth, users)
    }
}

use crate::state::AppState;
use axum::Router;

mod dto;
pub mod error;
mod extract;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;

pub use memory::InMemoryUserStore;
pub use repo::{PgUserStore, UserStore};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::users_routes())
}

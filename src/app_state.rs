use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::db::{self, ComplaintStore, MemoryStore, PgComplaintStore, PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub complaints: Arc<dyn ComplaintStore>,
    pub users: Arc<dyn UserStore>,
    pub env: Arc<Config>,
}

impl AppState {
    pub fn new(
        complaints: Arc<dyn ComplaintStore>,
        users: Arc<dyn UserStore>,
        env: Arc<Config>,
    ) -> Self {
        Self {
            complaints,
            users,
            env,
        }
    }

    /// Both stores backed by one in-process `MemoryStore`.
    pub fn in_memory(env: Arc<Config>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, env)
    }

    /// Picks the store backend from `DATABASE_URL`.
    pub async fn connect(env: Arc<Config>) -> Result<Self> {
        if env.database.is_memory() {
            info!("Using in-memory store; data will not survive a restart");
            return Ok(Self::in_memory(env));
        }

        let pool = db::init_pool(&env.database).await?;
        info!("Connected to PostgreSQL and applied migrations");
        Ok(Self::new(
            Arc::new(PgComplaintStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool)),
            env,
        ))
    }
}

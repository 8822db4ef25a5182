use std::sync::Arc;

use crate::{
    config::AppConfig,
    seed,
    store::{memory::MemoryStore, postgres::PgStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => Arc::new(PgStore::connect(url).await?) as Arc<dyn Store>,
            None => {
                tracing::warn!("DATABASE_URL not set; data lives in memory only");
                Arc::new(MemoryStore::default()) as Arc<dyn Store>
            }
        };

        if config.seed_demo_data {
            seed::seed_demo_data(store.as_ref()).await?;
        }

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Empty in-memory store with test JWT settings.
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(MemoryStore::default()),
            Arc::new(AppConfig::for_tests()),
        )
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::DashboardConfig;
use crate::services::LocalMediaStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    pool: PgPool,
    media: LocalMediaStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: DashboardConfig, pool: PgPool) -> Self {
        let media = LocalMediaStore::new(&config.media);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                media,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Store for uploaded product images and theme assets.
    #[must_use]
    pub fn media(&self) -> &LocalMediaStore {
        &self.inner.media
    }
}

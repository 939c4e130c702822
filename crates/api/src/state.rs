use std::sync::Arc;

use legal_docs_core::engine::DocumentEngine;
use legal_docs_core::events::bus::EventBus;
use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor. Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub engine: DocumentEngine,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: AppConfig,
        engine: DocumentEngine,
        event_bus: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                pool,
                config,
                engine,
                event_bus,
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> &DocumentEngine {
        &self.inner.engine
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }
}

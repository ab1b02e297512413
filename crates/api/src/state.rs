use std::sync::Arc;

use tflow_core::cache::TtlCache;
use tflow_core::retry::RetryPolicy;
use tflow_core::types::DbId;
use tflow_db::models::project::ProjectSummary;

use crate::config::ServerConfig;

/// Per-user "my projects" listings.
pub type ProjectListCache = TtlCache<DbId, Vec<ProjectSummary>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tflow_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Cached project listings keyed by user id.
    pub project_cache: ProjectListCache,
    /// Retry policy for database reads.
    pub read_retry: RetryPolicy,
}

impl AppState {
    pub fn new(pool: tflow_db::DbPool, config: ServerConfig) -> Self {
        let project_cache = TtlCache::new(config.project_cache_ttl());
        let read_retry = config.read_retry_policy();
        Self {
            pool,
            config: Arc::new(config),
            project_cache,
            read_retry,
        }
    }

    /// Drop every cached project listing.
    ///
    /// Called after any project mutation, since one change can show up in
    /// the listings of everyone on the project.
    pub fn invalidate_project_lists(&self) {
        self.project_cache.clear();
    }
}

//! Shared application state

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{Config, Result};
use crate::db::DbService;
use crate::middleware::RateLimiter;

/// Server state - shared handles for every request
///
/// Cheap to clone (Arc/pool internals). Everything a handler or job needs
/// is carried here explicitly; nothing resolves services from ambient
/// scope.
#[derive(Clone, Debug)]
pub struct ServerState {
    /// Server configuration (immutable after startup)
    pub config: Config,
    /// Database service
    pub db: DbService,
    /// Per-IP request counters
    pub rate_limiter: Arc<RateLimiter>,
    started_at: Instant,
}

impl ServerState {
    /// Initialize state: directory layout, database, rate limiter.
    ///
    /// Layout under `work_dir`:
    /// - `database/printlab.db` - SQLite store
    /// - `uploads/` - upload root (loose files + per-order folders)
    pub async fn initialize(config: &Config) -> Result<Self> {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(work_dir.join("database"))?;
        std::fs::create_dir_all(work_dir.join("uploads"))?;

        let db_path = work_dir.join("database/printlab.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self {
            config: config.clone(),
            db,
            rate_limiter: Arc::new(RateLimiter::new()),
            started_at: Instant::now(),
        })
    }

    /// Upload root directory
    pub fn upload_root(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir).join("uploads")
    }

    /// Time since state initialization
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

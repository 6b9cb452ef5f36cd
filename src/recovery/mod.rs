//! Orphaned upload recovery
//!
//! Reclaims upload files that were never attached to a submitted order,
//! without deleting anything: confirmed orphans are moved into a freshly
//! numbered order folder and recorded on a synthetic ON_HOLD order so the
//! operator has an auditable trail.
//!
//! One invocation runs SCAN → CLASSIFY → ALLOCATE → MOVE → PERSIST →
//! REPORT, sequentially and file by file. Concurrent runs are not mutually
//! excluded; the per-file rename is the de-facto serialization point (the
//! loser's rename fails and is recorded as a per-file error).

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::models::{FileRef, NewOrder, NewOrderItem, OrderStatus};
use crate::db::repository::{order as order_repo, sequence};
use crate::utils::{AppError, AppResult};

/// Files younger than this are never touched. A customer may spend many
/// hours uploading hundreds of photos before submitting; treating a fresh
/// file as orphaned mid-session would corrupt their in-progress order.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of one recovery run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryReport {
    /// Files successfully moved into the recovery order folder
    pub recovered: usize,
    /// Order number allocated for this batch, if any orphans were found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Filenames that classified as orphans but failed to move
    pub failed: Vec<String>,
}

impl RecoveryReport {
    fn empty() -> Self {
        Self {
            recovered: 0,
            order_number: None,
            failed: Vec::new(),
        }
    }
}

/// The recovery job. Built with an explicit pool and upload root so it can
/// be exercised in isolation against a scratch store.
pub struct RecoveryJob {
    pool: SqlitePool,
    upload_root: PathBuf,
    retention: Duration,
}

impl RecoveryJob {
    pub fn new(pool: SqlitePool, upload_root: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            upload_root: upload_root.into(),
            retention: DEFAULT_RETENTION,
        }
    }

    /// Override the retention threshold (tests pin this together with `run_at`)
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Run against the system clock
    pub async fn run(&self) -> AppResult<RecoveryReport> {
        self.run_at(SystemTime::now()).await
    }

    /// Run with a pinned "now". Age comparisons are exact: a file whose age
    /// equals the retention threshold is left alone; strictly older files
    /// are candidates.
    pub async fn run_at(&self, now: SystemTime) -> AppResult<RecoveryReport> {
        // SCAN + CLASSIFY
        let orphans = self.scan_orphans(now).await?;
        if orphans.is_empty() {
            tracing::info!("Recovery scan found no orphaned uploads");
            return Ok(RecoveryReport::empty());
        }

        // ALLOCATE: one order number per batch
        let order_number = sequence::allocate(&self.pool).await;
        tracing::info!(
            order_number = %order_number,
            candidates = orphans.len(),
            "Recovering orphaned uploads"
        );

        // MOVE
        let order_dir = self.upload_root.join(&order_number);
        tokio::fs::create_dir_all(&order_dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create order folder: {e}")))?;

        let mut moved = Vec::new();
        let mut failed = Vec::new();
        for name in orphans {
            let from = self.upload_root.join(&name);
            let to = order_dir.join(&name);
            match tokio::fs::rename(&from, &to).await {
                Ok(()) => moved.push(name),
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Failed to move orphaned file");
                    failed.push(name);
                }
            }
        }

        // PERSIST: no empty recovery orders
        if !moved.is_empty() {
            self.persist_recovery_order(&order_number, &moved).await?;
        }

        Ok(RecoveryReport {
            recovered: moved.len(),
            order_number: Some(order_number),
            failed,
        })
    }

    /// List loose files under the upload root that are past the retention
    /// threshold and unreferenced by any order item.
    ///
    /// Non-recursive by design: files already inside a per-order
    /// subdirectory are claimed by definition. A missing or unreadable
    /// upload root means there is nothing to do.
    async fn scan_orphans(&self, now: SystemTime) -> AppResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.upload_root).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::info!(error = %e, "Upload root missing or unreadable, nothing to recover");
                return Ok(Vec::new());
            }
        };

        let mut orphans = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Directory listing failed mid-scan");
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Failed to stat upload, skipping");
                    continue;
                }
            };
            if meta.is_dir() {
                continue;
            }

            let modified = match meta.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "No mtime available, skipping");
                    continue;
                }
            };

            // mtime in the future counts as fresh
            let age = match now.duration_since(modified) {
                Ok(age) => age,
                Err(_) => continue,
            };
            if age <= self.retention {
                continue;
            }

            // The files column of order items is the authoritative claim
            // record; an old file referenced anywhere is not an orphan.
            if order_repo::any_item_references_file(&self.pool, &name).await? {
                continue;
            }

            orphans.push(name);
        }

        Ok(orphans)
    }

    /// One ON_HOLD order with synthetic customer identity and one item per
    /// moved file. A failure here is fatal to the run: the files have
    /// already been relocated and stay where they are.
    async fn persist_recovery_order(&self, order_number: &str, moved: &[String]) -> AppResult<()> {
        let items = moved
            .iter()
            .map(|file| NewOrderItem {
                item_type: "RECOVERED".to_string(),
                name: format!("Lost File: {file}"),
                print_size_id: None,
                quantity: 1,
                price: 0.0,
                subtotal: 0.0,
                options: Some(serde_json::json!({ "isRecovered": true })),
                files: vec![FileRef {
                    original: file.clone(),
                    server: format!("{order_number}/{file}"),
                }],
            })
            .collect();

        let data = NewOrder {
            customer_name: "SYSTEM RECOVERY".to_string(),
            customer_first_name: Some("SYSTEM".to_string()),
            customer_last_name: Some("RECOVERY".to_string()),
            customer_phone: "-".to_string(),
            customer_email: "admin@localhost".to_string(),
            delivery_method: "PICKUP".to_string(),
            notes: Some(format!(
                "Automatically recovered {} lost files. Found by system cleanup.",
                moved.len()
            )),
            items,
        };

        order_repo::create_with_items(&self.pool, order_number, OrderStatus::OnHold, &data, 0.0)
            .await?;

        tracing::info!(
            order_number = %order_number,
            recovered = moved.len(),
            "Recovery order persisted"
        );
        Ok(())
    }
}

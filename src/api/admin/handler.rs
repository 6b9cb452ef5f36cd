//! Operator Panel Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

use crate::core::ServerState;
use crate::db::models::{OrderStatus, Setting, SettingUpsert};
use crate::db::repository::{order as order_repo, setting as setting_repo};
use crate::recovery::RecoveryJob;
use crate::utils::{AppError, AppResult};

// ========== Cleanup ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub success: bool,
    pub recovered_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub message: String,
}

/// Synchronously run the orphaned-upload recovery job and report
pub async fn run_cleanup(State(state): State<ServerState>) -> AppResult<Json<CleanupResponse>> {
    let job = RecoveryJob::new(state.db.pool.clone(), state.upload_root())
        .with_retention(state.config.retention());
    let report = job.run().await?;

    let message = match (&report.order_number, report.recovered) {
        (None, _) => "No lost files found.".to_string(),
        (Some(number), count) => format!("Recovered {count} files into Order #{number}"),
    };

    Ok(Json(CleanupResponse {
        success: true,
        recovered_count: report.recovered,
        order_number: report.order_number,
        errors: report.failed,
        message,
    }))
}

// ========== Order status management ==========

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusResponse {
    pub success: bool,
    pub status: String,
}

fn parse_status(s: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(s).ok_or_else(|| AppError::validation(format!("Invalid status: {s}")))
}

pub async fn set_order_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SetStatusRequest>,
) -> AppResult<Json<SetStatusResponse>> {
    let status = parse_status(&payload.status)?;
    order_repo::set_status(&state.db.pool, id, status).await?;
    Ok(Json(SetStatusResponse {
        success: true,
        status: status.as_str().to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusRequest {
    pub order_ids: Vec<i64>,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusResponse {
    pub success: bool,
    pub updated_count: u64,
    pub new_status: String,
}

pub async fn bulk_order_status(
    State(state): State<ServerState>,
    Json(payload): Json<BulkStatusRequest>,
) -> AppResult<Json<BulkStatusResponse>> {
    if payload.order_ids.is_empty() {
        return Err(AppError::validation("No order IDs provided"));
    }
    let status = parse_status(&payload.status)?;
    let updated = order_repo::set_status_bulk(&state.db.pool, &payload.order_ids, status).await?;
    Ok(Json(BulkStatusResponse {
        success: true,
        updated_count: updated,
        new_status: status.as_str().to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct OrderStatsResponse {
    pub stats: order_repo::OrderStats,
}

pub async fn order_stats(State(state): State<ServerState>) -> AppResult<Json<OrderStatsResponse>> {
    let stats = order_repo::stats(&state.db.pool).await?;
    Ok(Json(OrderStatsResponse { stats }))
}

// ========== Settings ==========

pub async fn list_settings(State(state): State<ServerState>) -> AppResult<Json<Vec<Setting>>> {
    let settings = setting_repo::find_all(&state.db.pool).await?;
    Ok(Json(settings))
}

pub async fn save_setting(
    State(state): State<ServerState>,
    Json(payload): Json<SettingUpsert>,
) -> AppResult<Json<Setting>> {
    let setting = setting_repo::upsert(&state.db.pool, &payload).await?;
    Ok(Json(setting))
}

// ========== Server statistics ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RamStats {
    pub total: String,
    pub used: String,
    pub percentage: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatsResponse {
    pub ram: RamStats,
    pub uptime: String,
    pub platform: String,
    pub cpus: usize,
    pub disk: String,
}

fn gb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0 / 1024.0
}

/// Host statistics for the operator dashboard
pub async fn server_stats(State(_state): State<ServerState>) -> AppResult<Json<ServerStatsResponse>> {
    let mut sys = System::new_all();
    sys.refresh_memory();

    let total = sys.total_memory();
    let used = sys.used_memory();
    let percentage = if total > 0 { used * 100 / total } else { 0 };

    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .first()
        .map(|d| {
            let size = d.total_space();
            let used = size.saturating_sub(d.available_space());
            let pct = if size > 0 { used * 100 / size } else { 0 };
            format!("{:.1} / {:.1} GB ({}%)", gb(used), gb(size), pct)
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let uptime_secs = System::uptime();
    let uptime = format!("{}h {}m", uptime_secs / 3600, (uptime_secs % 3600) / 60);

    Ok(Json(ServerStatsResponse {
        ram: RamStats {
            total: format!("{:.1} GB", gb(total)),
            used: format!("{:.1} GB", gb(used)),
            percentage,
        },
        uptime,
        platform: System::name().unwrap_or_else(|| "unknown".to_string()),
        cpus: sys.cpus().len(),
        disk,
    }))
}

pub mod handlers;

pub use handlers::*;

use crate::config::{AppConfig, ReportConfig};
use crate::service::{Reconciler, StoreAnalytics};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 共享状态：只读配置与无状态服务
pub struct AppState {
    pub reconciler: Reconciler,
    pub analytics: StoreAnalytics,
    pub report: ReportConfig,
}

impl AppState {
    pub fn new(reconciler: Reconciler, analytics: StoreAnalytics, report: ReportConfig) -> Self {
        Self {
            reconciler,
            analytics,
            report,
        }
    }

    /// 按配置构建 (会读取基准表文件)
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Reconciler::new(config.report.unknown_product_name.clone()),
            StoreAnalytics::from_config(config.analytics.clone()),
            config.report.clone(),
        )
    }
}

/// 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/grn/reconcile", post(reconcile))
        .route("/api/grn/export", post(export_grn))
        .route("/api/grn/summary", post(grn_summary))
        .route("/api/analytics/orders", post(order_summary))
        .route("/api/analytics/profit", post(profit))
        .route("/api/analytics/brands", post(brands))
        .route("/api/analytics/categories", post(categories))
        .with_state(state)
}

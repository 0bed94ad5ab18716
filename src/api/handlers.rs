use crate::error::ReconError;
use crate::loader;
use crate::models::{
    ClassificationFilter, NormalizationWarning, ReconSummary, ReconciledRecord, StockRecord,
};
use crate::service::{export, filter_records, top_k};
use super::AppState;
use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const GENERIC_FAILURE: &str =
    "An error occurred during analysis. Please ensure your data contains the required columns and proper format.";

/// 请求体: GRN 对账
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    pub store_name: String,
    pub sales: Vec<Value>,
    /// 未上传库存表时为空
    #[serde(default)]
    pub stock: Option<Vec<Value>>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// 请求体: 门店分析
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    pub store_name: String,
    pub sales: Vec<Value>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// 统一响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// GRN 报表 (筛选排序后的明细 + 图表用前 K 条)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrnReportView {
    pub store_name: String,
    pub filter: ClassificationFilter,
    pub records: Vec<ReconciledRecord>,
    pub top: Vec<ReconciledRecord>,
    pub summary: ReconSummary,
    pub warnings: Vec<NormalizationWarning>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// GRN 对账接口
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReconcileRequest>,
) -> Response {
    match build_grn_report(&state, &req) {
        Ok(view) => {
            let message = format!(
                "Reconciled {} products for store {}, {} with discrepancies",
                view.summary.total_products, view.store_name, view.summary.discrepant_count
            );
            success(message, view)
        }
        Err(resp) => resp,
    }
}

/// GRN 明细导出 (CSV)
pub async fn export_grn(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReconcileRequest>,
) -> Response {
    let view = match build_grn_report(&state, &req) {
        Ok(view) => view,
        Err(resp) => return resp,
    };
    match export::export_csv(&view.records) {
        Ok(body) => csv_response("grn_analysis.csv", body),
        Err(e) => error_response(&e),
    }
}

/// GRN 汇总指标，`?format=csv` 时返回 CSV
pub async fn grn_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FormatQuery>,
    Json(req): Json<ReconcileRequest>,
) -> Response {
    let view = match build_grn_report(&state, &req) {
        Ok(view) => view,
        Err(resp) => return resp,
    };

    if wants_csv(&query) {
        return match export::export_summary_csv(&view.summary) {
            Ok(body) => csv_response("grn_summary.csv", body),
            Err(e) => error_response(&e),
        };
    }
    success(format!("GRN summary for store {}", view.store_name), view.summary)
}

/// 订单概览
pub async fn order_summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyticsRequest>,
) -> Response {
    let transactions = match loader::transactions_from_json(&req.sales) {
        Ok(rows) => rows,
        Err(e) => return error_response(&e),
    };
    match state.analytics.order_summary(&transactions, &req.store_name) {
        Ok(summary) => success(format!("{} orders", summary.total_orders), summary),
        Err(e) => error_response(&e),
    }
}

/// 利润 KPI
pub async fn profit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyticsRequest>,
) -> Response {
    let (Some(start), Some(end)) = (req.start_date, req.end_date) else {
        return failure(StatusCode::BAD_REQUEST, "startDate and endDate are required".to_string());
    };
    let transactions = match loader::transactions_from_json(&req.sales) {
        Ok(rows) => rows,
        Err(e) => return error_response(&e),
    };
    match state.analytics.profit_kpis(&transactions, &req.store_name, start, end) {
        Ok(kpis) => success(format!("Profit KPIs for store {}", kpis.store_name), kpis),
        Err(e) => error_response(&e),
    }
}

/// 低效品牌分析，`?format=csv` 时返回 CSV
pub async fn brands(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FormatQuery>,
    Json(req): Json<AnalyticsRequest>,
) -> Response {
    let transactions = match loader::transactions_from_json(&req.sales) {
        Ok(rows) => rows,
        Err(e) => return error_response(&e),
    };
    let brands = match state.analytics.brand_performance(&transactions, &req.store_name) {
        Ok(brands) => brands,
        Err(e) => return error_response(&e),
    };

    if wants_csv(&query) {
        return match export::export_brands_csv(&brands) {
            Ok(body) => csv_response("low_performing_brands.csv", body),
            Err(e) => error_response(&e),
        };
    }
    success(format!("{} brands", brands.len()), brands)
}

/// 收银台货架品类分析，`?format=csv` 时返回 CSV
pub async fn categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FormatQuery>,
    Json(req): Json<AnalyticsRequest>,
) -> Response {
    let transactions = match loader::transactions_from_json(&req.sales) {
        Ok(rows) => rows,
        Err(e) => return error_response(&e),
    };
    let report = match state
        .analytics
        .counter_shelf_performance(&transactions, &req.store_name)
    {
        Ok(report) => report,
        Err(e) => return error_response(&e),
    };

    if wants_csv(&query) {
        return match export::export_categories_csv(&report) {
            Ok(body) => csv_response("counter_shelf_performance.csv", body),
            Err(e) => error_response(&e),
        };
    }
    success(format!("{} categories", report.categories.len()), report)
}

fn build_grn_report(state: &AppState, req: &ReconcileRequest) -> Result<GrnReportView, Response> {
    let filter = match req.filter.as_deref() {
        Some(raw) => raw
            .parse::<ClassificationFilter>()
            .map_err(|msg| failure(StatusCode::BAD_REQUEST, msg))?,
        None => ClassificationFilter::All,
    };
    let k = req.top_k.unwrap_or(state.report.top_k);

    let sales = loader::sales_from_json(&req.sales).map_err(|e| error_response(&e))?;
    let stock: Option<Vec<StockRecord>> = req
        .stock
        .as_deref()
        .map(loader::stock_from_json)
        .transpose()
        .map_err(|e| error_response(&e))?;

    let report = state
        .reconciler
        .reconcile(&sales, stock.as_deref(), &req.store_name)
        .map_err(|e| error_response(&e))?;

    Ok(GrnReportView {
        store_name: report.store_name,
        filter,
        records: filter_records(&report.records, filter),
        top: top_k(&report.records, filter, k),
        summary: report.summary,
        warnings: report.warnings,
    })
}

fn wants_csv(query: &FormatQuery) -> bool {
    query
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("csv"))
}

fn success<T: Serialize>(message: String, data: T) -> Response {
    let response = ApiResponse {
        success: true,
        message,
        data: Some(data),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    let response: ApiResponse<()> = ApiResponse {
        success: false,
        message,
        data: None,
    };
    (status, Json(response)).into_response()
}

/// 输入问题原样返回；其余错误只记录日志，对外给出通用提示
fn error_response(err: &ReconError) -> Response {
    match err {
        ReconError::MissingInput { .. } => failure(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        e if e.is_client_error() => failure(StatusCode::BAD_REQUEST, e.to_string()),
        e => {
            tracing::error!("Analysis failed: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
        }
    }
}

fn csv_response(filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}

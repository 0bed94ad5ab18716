use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 门店订单概览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub store_name: String,
    pub total_orders: usize,
    pub total_quantity: i64,
    pub total_revenue: BigDecimal,
    pub total_cost: BigDecimal,
    pub total_profit: BigDecimal,
    /// 留存客户信息的行占比 (0-100)
    pub customer_info_percentage: f64,
    /// 无日期列时为空
    pub daily_capture: Vec<DailyCapture>,
}

/// 单日客户信息留存率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCapture {
    pub date: NaiveDate,
    pub valid_customers: usize,
    pub total_entries: usize,
    pub customer_info_percentage: f64,
}

/// 利润 KPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitKpis {
    pub store_name: String,
    pub selected_store_profit: BigDecimal,
    pub overall_average_profit: BigDecimal,
    pub selected_store_average_profit: BigDecimal,
    pub profit_contribution_percentage: f64,
}

/// 品牌表现 (按销量升序即低效品牌在前)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandPerformance {
    pub brand_name: String,
    pub product_count: usize,
    pub quantity_sold: i64,
    pub total_revenue: BigDecimal,
    pub total_cost: BigDecimal,
    pub profit: BigDecimal,
    pub profit_margin: f64,
}

/// 公司基准 (品类销售占比标准)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(rename = "Company Standard")]
    pub company_standard: f64,
}

/// 收银台货架品类表现
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub category_name: String,
    pub total_quantity: i64,
    pub total_revenue: BigDecimal,
    pub total_cost: BigDecimal,
    pub total_products: usize,
    pub profit: BigDecimal,
    pub profit_margin: f64,
    /// 占门店总销售额比例
    pub contribution: f64,
    pub company_standard: Option<f64>,
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub store_name: String,
    pub categories: Vec<CategoryPerformance>,
    /// 配置中有但数据中没有的品类
    pub missing_categories: Vec<String>,
}

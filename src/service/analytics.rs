use crate::config::AnalyticsConfig;
use crate::error::{ReconError, ReconResult};
use crate::loader;
use crate::models::{
    BenchmarkRow, BrandPerformance, CategoryPerformance, CategoryReport, DailyCapture,
    OrderSummary, ProfitKpis, RawProductId, Transaction,
};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

/// 门店销售分析 (订单、利润、品牌、收银台货架品类)
pub struct StoreAnalytics {
    config: AnalyticsConfig,
    benchmark: Vec<BenchmarkRow>,
}

/// 分组累加器
#[derive(Default)]
struct Totals {
    quantity: i64,
    revenue: BigDecimal,
    cost: BigDecimal,
    products: HashSet<String>,
}

impl Totals {
    /// 销量合计溢出时报错，`group` 用于错误信息
    fn add(&mut self, group: &str, tx: &Transaction) -> ReconResult<()> {
        self.quantity = self
            .quantity
            .checked_add(tx.quantity)
            .ok_or_else(|| ReconError::quantity_overflow(format!("{group} quantity total"), &tx.product_id))?;
        self.revenue += &tx.total_product_price;
        self.cost += &tx.cost_price;
        self.products.insert(product_key(&tx.product_id));
        Ok(())
    }

    fn profit(&self) -> BigDecimal {
        &self.revenue - &self.cost
    }
}

impl StoreAnalytics {
    pub fn new(config: AnalyticsConfig, benchmark: Vec<BenchmarkRow>) -> Self {
        Self { config, benchmark }
    }

    /// 按配置路径读取基准表；文件缺失时品类对比不含公司标准
    pub fn from_config(config: AnalyticsConfig) -> Self {
        let benchmark = match loader::load_benchmark_file(&config.benchmark_path) {
            Ok(rows) => {
                tracing::info!("Loaded {} benchmark rows from {}", rows.len(), config.benchmark_path);
                rows
            }
            Err(e) => {
                tracing::warn!("Benchmark {} unavailable: {}", config.benchmark_path, e);
                Vec::new()
            }
        };
        Self::new(config, benchmark)
    }

    /// 订单概览与客户信息留存率
    pub fn order_summary(&self, transactions: &[Transaction], store_name: &str) -> ReconResult<OrderSummary> {
        let rows: Vec<&Transaction> = store_rows(transactions, store_name).collect();

        let mut invoices = HashSet::new();
        let mut totals = Totals::default();
        let mut valid_customers = 0usize;
        let mut daily: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();

        for tx in &rows {
            if !tx.invoice.is_empty() {
                invoices.insert(tx.invoice.as_str());
            }
            totals.add(store_name, tx)?;

            let valid = tx.has_customer_info();
            if valid {
                valid_customers += 1;
            }
            if let Some(date) = tx.date {
                let entry = daily.entry(date).or_insert((0, 0));
                entry.0 += usize::from(valid);
                entry.1 += 1;
            }
        }

        let daily_capture = daily
            .into_iter()
            .map(|(date, (valid, total))| DailyCapture {
                date,
                valid_customers: valid,
                total_entries: total,
                customer_info_percentage: ratio(valid, total),
            })
            .collect();

        Ok(OrderSummary {
            store_name: store_name.to_string(),
            total_orders: invoices.len(),
            total_quantity: totals.quantity,
            total_profit: totals.profit(),
            total_revenue: totals.revenue,
            total_cost: totals.cost,
            customer_info_percentage: ratio(valid_customers, rows.len()),
            daily_capture,
        })
    }

    /// 利润 KPI；`transactions` 为全部门店在所选日期区间内的数据
    pub fn profit_kpis(
        &self,
        transactions: &[Transaction],
        store_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ReconResult<ProfitKpis> {
        let mut store_profit: IndexMap<&str, BigDecimal> = IndexMap::new();
        for tx in transactions {
            *store_profit.entry(tx.store_name.as_str()).or_default() += tx.profit();
        }

        let selected_store_profit = store_profit
            .get(store_name)
            .cloned()
            .ok_or_else(|| ReconError::UnknownStore(store_name.to_string()))?;

        // 含首尾两天
        let days = ((end_date - start_date).num_days() + 1).max(0);
        let overall_average_profit = (decimal(self.config.daily_profit_baseline)
            * BigDecimal::from(days)
            * decimal(self.config.baseline_margin))
        .round(2);

        let selected_store_average_profit =
            &selected_store_profit / &BigDecimal::from(store_profit.len() as u64);

        let mut store_revenue = BigDecimal::zero();
        for tx in store_rows(transactions, store_name) {
            store_revenue += &tx.total_product_price;
        }

        Ok(ProfitKpis {
            store_name: store_name.to_string(),
            profit_contribution_percentage: percentage(&selected_store_profit, &store_revenue),
            selected_store_profit,
            overall_average_profit,
            selected_store_average_profit,
        })
    }

    /// 品牌表现，按销量升序 (低效品牌在前)
    pub fn brand_performance(
        &self,
        transactions: &[Transaction],
        store_name: &str,
    ) -> ReconResult<Vec<BrandPerformance>> {
        let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
        for tx in store_rows(transactions, store_name) {
            groups
                .entry(tx.brand_name.as_str())
                .or_default()
                .add(&tx.brand_name, tx)?;
        }

        let mut brands: Vec<BrandPerformance> = groups
            .into_iter()
            .map(|(brand, totals)| {
                let profit = totals.profit();
                BrandPerformance {
                    brand_name: brand.to_string(),
                    product_count: totals.products.len(),
                    quantity_sold: totals.quantity,
                    profit_margin: percentage(&profit, &totals.revenue),
                    profit,
                    total_revenue: totals.revenue,
                    total_cost: totals.cost,
                }
            })
            .collect();

        brands.sort_by_key(|b| b.quantity_sold);
        Ok(brands)
    }

    /// 收银台货架品类表现，并与公司基准对比
    pub fn counter_shelf_performance(
        &self,
        transactions: &[Transaction],
        store_name: &str,
    ) -> ReconResult<CategoryReport> {
        let categories = &self.config.counter_shelf_categories;

        let mut store_revenue = BigDecimal::zero();
        let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
        for tx in store_rows(transactions, store_name) {
            store_revenue += &tx.total_product_price;
            if categories.iter().any(|c| c == &tx.category_name) {
                groups
                    .entry(tx.category_name.as_str())
                    .or_default()
                    .add(&tx.category_name, tx)?;
            }
        }

        let missing_categories = categories
            .iter()
            .filter(|c| !groups.contains_key(c.as_str()))
            .cloned()
            .collect();

        let performance = groups
            .into_iter()
            .map(|(category, totals)| {
                let profit = totals.profit();
                let contribution = percentage(&totals.revenue, &store_revenue);
                let company_standard = self
                    .benchmark
                    .iter()
                    .find(|b| b.category_name == category)
                    .map(|b| b.company_standard);
                CategoryPerformance {
                    category_name: category.to_string(),
                    total_quantity: totals.quantity,
                    total_products: totals.products.len(),
                    profit_margin: percentage(&profit, &totals.revenue),
                    profit,
                    total_revenue: totals.revenue,
                    total_cost: totals.cost,
                    contribution,
                    company_standard,
                    variance: company_standard.map(|standard| contribution - standard),
                }
            })
            .collect();

        Ok(CategoryReport {
            store_name: store_name.to_string(),
            categories: performance,
            missing_categories,
        })
    }
}

fn store_rows<'a>(transactions: &'a [Transaction], store_name: &'a str) -> impl Iterator<Item = &'a Transaction> {
    transactions.iter().filter(move |tx| tx.store_name == store_name)
}

fn product_key(id: &RawProductId) -> String {
    id.normalize()
        .map(|key| key.to_string())
        .unwrap_or_else(|_| id.to_string())
}

fn decimal(v: f64) -> BigDecimal {
    BigDecimal::from_str(&v.to_string()).unwrap_or_else(|_| BigDecimal::zero())
}

/// part / whole * 100，分母为 0 时为 0
fn percentage(part: &BigDecimal, whole: &BigDecimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part / whole * BigDecimal::from(100)).to_f64().unwrap_or(0.0)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

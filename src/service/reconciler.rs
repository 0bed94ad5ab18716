use crate::error::{ReconError, ReconResult};
use crate::models::{
    ClassificationFilter, Dataset, NormalizationWarning, ProductId, RawProductId, ReconReport,
    ReconSummary, ReconciledRecord, SalesRecord, StockRecord,
};
use indexmap::IndexMap;

/// 两侧都没有商品名称时使用的占位名
pub const UNKNOWN_PRODUCT_NAME: &str = "unknown";

/// GRN 对账服务：销售与库存按商品全外连接，计算差异并分类
#[derive(Debug, Clone)]
pub struct Reconciler {
    unknown_product_name: String,
}

/// 外连接槽位，缺失一侧保持 None
#[derive(Debug, Default)]
struct JoinSlot {
    quantity_sold: Option<i64>,
    quantity_stock: Option<i64>,
    sales_name: Option<String>,
    stock_name: Option<String>,
}

impl Reconciler {
    pub fn new(unknown_product_name: impl Into<String>) -> Self {
        Self {
            unknown_product_name: unknown_product_name.into(),
        }
    }

    /// 对单个门店执行对账
    ///
    /// 库存表未提供时返回 [`ReconError::MissingInput`]；已提供但为空的库存表是合法输入。
    /// 商品编码无法规整的行被跳过并记入 `warnings`。
    pub fn reconcile(
        &self,
        sales: &[SalesRecord],
        stock: Option<&[StockRecord]>,
        store_name: &str,
    ) -> ReconResult<ReconReport> {
        let Some(stock) = stock else {
            tracing::warn!("Stock data not provided, GRN analysis for store '{}' skipped", store_name);
            return Err(ReconError::missing_input("stock"));
        };

        let mut slots: IndexMap<ProductId, JoinSlot> = IndexMap::new();
        let mut warnings = Vec::new();

        // 1. 销售侧 (先于库存侧，决定连接顺序)
        for (idx, row) in sales.iter().enumerate() {
            if row.store_name != store_name {
                continue;
            }
            let Some(key) = normalize_key(Dataset::Sales, idx, &row.product_id, &mut warnings) else {
                continue;
            };
            let slot = slots.entry(key.clone()).or_default();
            if slot.quantity_sold.is_some() {
                tracing::debug!("Merging duplicate sales row {} for product {}", idx, row.product_id);
            }
            let sold = slot
                .quantity_sold
                .unwrap_or(0)
                .checked_add(row.quantity)
                .ok_or_else(|| ReconError::quantity_overflow("sales quantity total", &key))?;
            slot.quantity_sold = Some(sold);
            if slot.sales_name.is_none() {
                slot.sales_name = non_blank(row.product_name.as_deref());
            }
        }

        // 2. 库存侧，仅在库存中出现的商品追加在末尾
        for (idx, row) in stock.iter().enumerate() {
            if row.store_name != store_name {
                continue;
            }
            let Some(key) = normalize_key(Dataset::Stock, idx, &row.product_id, &mut warnings) else {
                continue;
            };
            let slot = slots.entry(key.clone()).or_default();
            if slot.quantity_stock.is_some() {
                tracing::debug!("Merging duplicate stock row {} for product {}", idx, row.product_id);
            }
            let held = slot
                .quantity_stock
                .unwrap_or(0)
                .checked_add(row.quantity)
                .ok_or_else(|| ReconError::quantity_overflow("stock quantity total", &key))?;
            slot.quantity_stock = Some(held);
            if slot.stock_name.is_none() {
                slot.stock_name = non_blank(row.product_name.as_deref());
            }
        }

        // 3. 补齐缺失值并生成结果行
        let records: Vec<ReconciledRecord> = slots
            .into_iter()
            .map(|(product_id, slot)| {
                let product_name = slot
                    .sales_name
                    .or(slot.stock_name)
                    .unwrap_or_else(|| self.unknown_product_name.clone());
                ReconciledRecord::new(
                    product_id,
                    product_name,
                    slot.quantity_sold.unwrap_or(0),
                    slot.quantity_stock.unwrap_or(0),
                )
            })
            .collect::<ReconResult<_>>()?;

        let summary = ReconSummary::from_records(&records);

        tracing::info!(
            "GRN reconciliation for store '{}': {} products, {} with discrepancies, accuracy {:.2}%, {} rows skipped",
            store_name,
            summary.total_products,
            summary.discrepant_count,
            summary.accuracy_rate,
            warnings.len()
        );

        Ok(ReconReport {
            store_name: store_name.to_string(),
            records,
            summary,
            warnings,
        })
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(UNKNOWN_PRODUCT_NAME)
    }
}

/// 使用默认占位名对账
pub fn reconcile(
    sales: &[SalesRecord],
    stock: Option<&[StockRecord]>,
    store_name: &str,
) -> ReconResult<ReconReport> {
    Reconciler::default().reconcile(sales, stock, store_name)
}

/// 按分类筛选，并按差异降序稳定排序
pub fn filter_records(records: &[ReconciledRecord], filter: ClassificationFilter) -> Vec<ReconciledRecord> {
    let mut selected: Vec<ReconciledRecord> = records
        .iter()
        .filter(|r| filter.matches(r.classification))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.discrepancy.cmp(&a.discrepancy));
    selected
}

/// 筛选排序后的前 k 条 (图表展示用)
pub fn top_k(records: &[ReconciledRecord], filter: ClassificationFilter, k: usize) -> Vec<ReconciledRecord> {
    let mut selected = filter_records(records, filter);
    selected.truncate(k);
    selected
}

fn normalize_key(
    dataset: Dataset,
    row_index: usize,
    raw: &RawProductId,
    warnings: &mut Vec<NormalizationWarning>,
) -> Option<ProductId> {
    match raw.normalize() {
        Ok(key) => Some(key),
        Err(reason) => {
            tracing::warn!("Skipping {} row {}: {}", dataset, row_index, reason);
            warnings.push(NormalizationWarning {
                dataset,
                row_index,
                raw_value: raw.to_string(),
                reason,
            });
            None
        }
    }
}

fn non_blank(name: Option<&str>) -> Option<String> {
    name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}

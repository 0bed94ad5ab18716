use super::ProductId;
use crate::error::{ReconError, ReconResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 按差异符号划分的库存状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockClassification {
    OverStocked,
    UnderStocked,
    Matched,
}

impl StockClassification {
    /// 差异 > 0 为积压，< 0 为短缺，= 0 为一致
    pub fn from_discrepancy(discrepancy: i64) -> Self {
        match discrepancy.signum() {
            1 => Self::OverStocked,
            -1 => Self::UnderStocked,
            _ => Self::Matched,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OverStocked => "OVER_STOCKED",
            Self::UnderStocked => "UNDER_STOCKED",
            Self::Matched => "MATCHED",
        }
    }
}

impl fmt::Display for StockClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 明细筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationFilter {
    #[default]
    All,
    OverStocked,
    UnderStocked,
    Matched,
}

impl ClassificationFilter {
    pub fn matches(&self, classification: StockClassification) -> bool {
        match self {
            Self::All => true,
            Self::OverStocked => classification == StockClassification::OverStocked,
            Self::UnderStocked => classification == StockClassification::UnderStocked,
            Self::Matched => classification == StockClassification::Matched,
        }
    }
}

impl FromStr for ClassificationFilter {
    type Err = String;

    /// 同时接受 `OVER_STOCKED` 与界面文案 `Over-stocked`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "all" => Ok(Self::All),
            "overstocked" => Ok(Self::OverStocked),
            "understocked" => Ok(Self::UnderStocked),
            "matched" => Ok(Self::Matched),
            _ => Err(format!("unknown discrepancy filter '{s}'")),
        }
    }
}

/// 对账结果行，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRecord {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_sold: i64,
    pub quantity_stock: i64,
    pub discrepancy: i64,
    pub classification: StockClassification,
}

impl ReconciledRecord {
    /// 差异超出 i64 范围时返回 [`ReconError::QuantityOverflow`]
    pub fn new(
        product_id: ProductId,
        product_name: String,
        quantity_sold: i64,
        quantity_stock: i64,
    ) -> ReconResult<Self> {
        let discrepancy = quantity_stock
            .checked_sub(quantity_sold)
            .ok_or_else(|| ReconError::quantity_overflow("discrepancy", &product_id))?;
        Ok(Self {
            product_id,
            product_name,
            quantity_sold,
            quantity_stock,
            discrepancy,
            classification: StockClassification::from_discrepancy(discrepancy),
        })
    }
}

/// 对账汇总指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconSummary {
    pub total_products: usize,
    pub discrepant_count: usize,
    /// 差异为零的商品占比 (0-100)
    pub accuracy_rate: f64,
}

impl ReconSummary {
    pub fn from_records(records: &[ReconciledRecord]) -> Self {
        let total_products = records.len();
        let discrepant_count = records.iter().filter(|r| r.discrepancy != 0).count();
        let accuracy_rate = if total_products == 0 {
            0.0
        } else {
            (total_products - discrepant_count) as f64 / total_products as f64 * 100.0
        };

        Self {
            total_products,
            discrepant_count,
            accuracy_rate,
        }
    }
}

/// 数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Sales,
    Stock,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => f.write_str("sales"),
            Self::Stock => f.write_str("stock"),
        }
    }
}

/// 因商品编码无法规整而被跳过的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationWarning {
    pub dataset: Dataset,
    /// 门店过滤前的原始行号 (从 0 开始)
    pub row_index: usize,
    pub raw_value: String,
    pub reason: String,
}

/// 一次对账的完整输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconReport {
    pub store_name: String,
    /// 外连接顺序
    pub records: Vec<ReconciledRecord>,
    pub summary: ReconSummary,
    pub warnings: Vec<NormalizationWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, sold: i64, stock: i64) -> ReconciledRecord {
        ReconciledRecord::new(
            crate::models::RawProductId::from(id).normalize().unwrap(),
            id.to_string(),
            sold,
            stock,
        )
        .unwrap()
    }

    #[test]
    fn classification_follows_sign() {
        assert_eq!(StockClassification::from_discrepancy(3), StockClassification::OverStocked);
        assert_eq!(StockClassification::from_discrepancy(-1), StockClassification::UnderStocked);
        assert_eq!(StockClassification::from_discrepancy(0), StockClassification::Matched);
    }

    #[test]
    fn record_computes_discrepancy() {
        let r = record("1", 10, 8);
        assert_eq!(r.discrepancy, -2);
        assert_eq!(r.classification, StockClassification::UnderStocked);
    }

    #[test]
    fn discrepancy_overflow_is_error() {
        let id = crate::models::RawProductId::from("1").normalize().unwrap();
        let err = ReconciledRecord::new(id, "A".into(), -1, i64::MAX).unwrap_err();
        assert!(matches!(err, ReconError::QuantityOverflow { ref product_id, .. } if product_id == "1"));
        assert!(err.is_client_error());
    }

    #[test]
    fn filter_parses_ui_labels() {
        assert_eq!("Over-stocked".parse::<ClassificationFilter>().unwrap(), ClassificationFilter::OverStocked);
        assert_eq!("UNDER_STOCKED".parse::<ClassificationFilter>().unwrap(), ClassificationFilter::UnderStocked);
        assert_eq!("matched".parse::<ClassificationFilter>().unwrap(), ClassificationFilter::Matched);
        assert_eq!("All".parse::<ClassificationFilter>().unwrap(), ClassificationFilter::All);
        assert!("sideways".parse::<ClassificationFilter>().is_err());
    }

    #[test]
    fn summary_of_empty_set_is_zero() {
        let summary = ReconSummary::from_records(&[]);
        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.discrepant_count, 0);
        assert_eq!(summary.accuracy_rate, 0.0);
    }

    #[test]
    fn summary_counts_discrepancies() {
        let summary = ReconSummary::from_records(&[record("1", 10, 8), record("2", 0, 0)]);
        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.discrepant_count, 1);
        assert_eq!(summary.accuracy_rate, 50.0);
    }

    #[test]
    fn classification_serializes_screaming_snake() {
        let json = serde_json::to_string(&StockClassification::OverStocked).unwrap();
        assert_eq!(json, "\"OVER_STOCKED\"");
    }
}

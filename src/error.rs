use thiserror::Error;

/// 统一结果类型
pub type ReconResult<T> = Result<T, ReconError>;

/// 对账与分析过程中的错误
///
/// 行级的商品编码无法规整不在此列，见 [`crate::models::NormalizationWarning`]。
#[derive(Debug, Error)]
pub enum ReconError {
    /// 缺少必需的第二份数据 (例如未上传库存表)
    #[error("{dataset} data is required; please upload it before running the report")]
    MissingInput { dataset: String },

    /// 输入表缺少必需列
    #[error("{dataset} data must contain columns: {}", missing.join(", "))]
    Validation { dataset: String, missing: Vec<String> },

    /// 数值或日期列无法解析
    #[error("{dataset} row {row}: cannot parse {column} value '{value}'")]
    InvalidValue {
        dataset: String,
        row: usize,
        column: String,
        value: String,
    },

    /// 数量合计或差异超出 i64 范围
    #[error("{context} overflows for product {product_id}")]
    QuantityOverflow { context: String, product_id: String },

    /// 所选门店不在数据中
    #[error("store '{0}' not found in sales data")]
    UnknownStore(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconError {
    pub fn missing_input(dataset: impl Into<String>) -> Self {
        Self::MissingInput { dataset: dataset.into() }
    }

    pub fn quantity_overflow(context: impl Into<String>, product_id: impl ToString) -> Self {
        Self::QuantityOverflow {
            context: context.into(),
            product_id: product_id.to_string(),
        }
    }

    pub fn validation(dataset: impl Into<String>, missing: Vec<String>) -> Self {
        Self::Validation { dataset: dataset.into(), missing }
    }

    /// 是否属于调用方可修正的输入问题
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput { .. }
                | Self::Validation { .. }
                | Self::InvalidValue { .. }
                | Self::QuantityOverflow { .. }
                | Self::UnknownStore(_)
        )
    }
}

use super::RawProductId;
use serde::{Deserialize, Serialize};

/// 门店当前库存行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub product_id: RawProductId,
    pub store_name: String,
    pub product_name: Option<String>,
    pub quantity: i64,
}

use super::RawProductId;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 门店销售汇总行 (每个商品在统计期内的总销量)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub product_id: RawProductId,
    pub store_name: String,
    pub product_name: Option<String>,
    pub quantity: i64,
}

/// 原始交易明细行 (销售上传表的一行)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub invoice: String,
    pub store_name: String,
    pub product_id: RawProductId,
    pub product_name: Option<String>,
    pub brand_name: String,
    pub category_name: String,
    pub quantity: i64,
    pub total_product_price: BigDecimal,
    pub cost_price: BigDecimal,
    pub customer_number: String,
    pub date: Option<NaiveDate>,
}

impl Transaction {
    /// 转为对账用的销售行；同一商品的多行由对账引擎合并
    pub fn to_sales_record(&self) -> SalesRecord {
        SalesRecord {
            product_id: self.product_id.clone(),
            store_name: self.store_name.clone(),
            product_name: self.product_name.clone(),
            quantity: self.quantity,
        }
    }

    /// 单行利润
    pub fn profit(&self) -> BigDecimal {
        &self.total_product_price - &self.cost_price
    }

    /// 客户手机号是否有效 (纯数字)
    pub fn has_customer_info(&self) -> bool {
        let number = self.customer_number.trim();
        !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit())
    }
}

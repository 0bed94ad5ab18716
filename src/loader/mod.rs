//! 上传数据加载：CSV / JSON 行 → 强类型记录，缺列时直接拒绝。

pub mod benchmark;
pub mod records;
pub mod table;

use crate::error::ReconResult;
use crate::models::{SalesRecord, StockRecord, Transaction};
use serde_json::Value;
use std::io::Read;

pub use benchmark::{load_benchmark, load_benchmark_file};
pub use records::{SALES_COLUMNS, STOCK_COLUMNS, TRANSACTION_COLUMNS};
pub use table::RawTable;

pub fn load_sales_csv<R: Read>(reader: R) -> ReconResult<Vec<SalesRecord>> {
    records::sales_from_table(&RawTable::from_csv("sales", reader)?)
}

pub fn load_stock_csv<R: Read>(reader: R) -> ReconResult<Vec<StockRecord>> {
    records::stock_from_table(&RawTable::from_csv("stock", reader)?)
}

pub fn load_transactions_csv<R: Read>(reader: R) -> ReconResult<Vec<Transaction>> {
    records::transactions_from_table(&RawTable::from_csv("sales", reader)?)
}

/// JSON 空数组没有列信息，视为空表
pub fn sales_from_json(rows: &[Value]) -> ReconResult<Vec<SalesRecord>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    records::sales_from_table(&RawTable::from_json_rows("sales", rows)?)
}

pub fn stock_from_json(rows: &[Value]) -> ReconResult<Vec<StockRecord>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    records::stock_from_table(&RawTable::from_json_rows("stock", rows)?)
}

pub fn transactions_from_json(rows: &[Value]) -> ReconResult<Vec<Transaction>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    records::transactions_from_table(&RawTable::from_json_rows("sales", rows)?)
}

use super::table::RawTable;
use crate::error::ReconResult;
use crate::models::{SalesRecord, StockRecord, Transaction};

/// 销售表必需列
pub const SALES_COLUMNS: [&str; 4] = ["productId", "storeName", "productName", "quantity"];

/// 库存表必需列 (productName 可选)
pub const STOCK_COLUMNS: [&str; 3] = ["productId", "storeName", "quantity"];

/// 交易明细必需列
pub const TRANSACTION_COLUMNS: [&str; 10] = [
    "invoice",
    "storeName",
    "productId",
    "productName",
    "brandName",
    "categoryName",
    "quantity",
    "totalProductPrice",
    "costPrice",
    "customerNumber",
];

pub fn sales_from_table(table: &RawTable) -> ReconResult<Vec<SalesRecord>> {
    let cols = table.require(&SALES_COLUMNS)?;
    let (id, store, name, qty) = (cols[0], cols[1], cols[2], cols[3]);

    let mut records = Vec::with_capacity(table.len());
    for (_, row) in table.rows() {
        records.push(SalesRecord {
            product_id: row.product_id(id),
            store_name: row.text_or_default(store),
            product_name: row.text(name),
            quantity: row.quantity(qty)?,
        });
    }

    log_loaded(table, records.len());
    Ok(records)
}

pub fn stock_from_table(table: &RawTable) -> ReconResult<Vec<StockRecord>> {
    let cols = table.require(&STOCK_COLUMNS)?;
    let (id, store, qty) = (cols[0], cols[1], cols[2]);
    let name = table.position("productName");

    let mut records = Vec::with_capacity(table.len());
    for (_, row) in table.rows() {
        records.push(StockRecord {
            product_id: row.product_id(id),
            store_name: row.text_or_default(store),
            product_name: name.and_then(|col| row.text(col)),
            quantity: row.quantity(qty)?,
        });
    }

    log_loaded(table, records.len());
    Ok(records)
}

pub fn transactions_from_table(table: &RawTable) -> ReconResult<Vec<Transaction>> {
    let cols = table.require(&TRANSACTION_COLUMNS)?;
    let date_col = table.date_column();

    let mut records = Vec::with_capacity(table.len());
    for (_, row) in table.rows() {
        records.push(Transaction {
            invoice: row.text_or_default(cols[0]),
            store_name: row.text_or_default(cols[1]),
            product_id: row.product_id(cols[2]),
            product_name: row.text(cols[3]),
            brand_name: row.text_or_default(cols[4]),
            category_name: row.text_or_default(cols[5]),
            quantity: row.quantity(cols[6])?,
            total_product_price: row.amount(cols[7])?,
            cost_price: row.amount(cols[8])?,
            customer_number: row.text_or_default(cols[9]),
            date: match date_col {
                Some(col) => row.date(col)?,
                None => None,
            },
        });
    }

    log_loaded(table, records.len());
    tracing::debug!(
        "Date column for {} upload: {}",
        table.dataset(),
        date_col.map(|c| table.headers()[c].as_str()).unwrap_or("none")
    );
    Ok(records)
}

fn log_loaded(table: &RawTable, count: usize) {
    if table.is_empty() {
        tracing::warn!("{} upload has a header but no data rows", table.dataset());
    }
    tracing::debug!("Loaded {} {} rows", count, table.dataset());
}

use crate::error::ReconResult;
use crate::models::{BrandPerformance, CategoryReport, ReconSummary, ReconciledRecord};
use bigdecimal::BigDecimal;
use std::io::Write;

/// 对账明细导出列 (与 ReconciledRecord 字段一致)
pub const RECONCILED_HEADERS: [&str; 6] = [
    "productId",
    "productName",
    "quantitySold",
    "quantityStock",
    "discrepancy",
    "classification",
];

/// 写出对账明细 CSV，空结果也输出表头
pub fn write_reconciled<W: Write>(writer: W, records: &[ReconciledRecord]) -> ReconResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(RECONCILED_HEADERS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(records: &[ReconciledRecord]) -> ReconResult<String> {
    let mut buf = Vec::new();
    write_reconciled(&mut buf, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 汇总指标 CSV (指标名, 值)
pub fn export_summary_csv(summary: &ReconSummary) -> ReconResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["metric", "value"])?;
    wtr.write_record(["Total Products", summary.total_products.to_string().as_str()])?;
    wtr.write_record(["Products with Discrepancies", summary.discrepant_count.to_string().as_str()])?;
    wtr.write_record(["GRN Accuracy Rate", format_percentage(summary.accuracy_rate).as_str()])?;
    into_string(wtr)
}

pub fn export_brands_csv(brands: &[BrandPerformance]) -> ReconResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "brandName",
        "productCount",
        "quantitySold",
        "totalRevenue",
        "totalCost",
        "profit",
        "profitMargin",
    ])?;
    for b in brands {
        wtr.write_record([
            b.brand_name.clone(),
            b.product_count.to_string(),
            b.quantity_sold.to_string(),
            format_money(&b.total_revenue),
            format_money(&b.total_cost),
            format_money(&b.profit),
            format_percentage(b.profit_margin),
        ])?;
    }
    into_string(wtr)
}

pub fn export_categories_csv(report: &CategoryReport) -> ReconResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "categoryName",
        "totalRevenue",
        "totalCost",
        "profit",
        "contribution",
        "companyStandard",
        "variance",
    ])?;
    for c in &report.categories {
        wtr.write_record([
            c.category_name.clone(),
            format_money(&c.total_revenue),
            format_money(&c.total_cost),
            format_money(&c.profit),
            format_percentage(c.contribution),
            c.company_standard.map(format_percentage).unwrap_or_default(),
            c.variance.map(format_percentage).unwrap_or_default(),
        ])?;
    }
    into_string(wtr)
}

/// 金额保留两位小数
pub fn format_money(value: &BigDecimal) -> String {
    value.round(2).with_scale(2).to_string()
}

/// 百分比保留两位小数 (不带 % 号，便于表格软件识别为数字)
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}")
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> ReconResult<String> {
    let buf = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use grn_recon::config::AnalyticsConfig;
use grn_recon::loader;
use grn_recon::models::{
    ClassificationFilter, Dataset, RawProductId, SalesRecord, StockClassification, StockRecord,
};
use grn_recon::service::{export, filter_records, reconcile, top_k, StoreAnalytics};
use grn_recon::ReconError;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

const STORE: &str = "Indiranagar";

fn fixture(name: &str) -> File {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name].iter().collect();
    File::open(path).unwrap()
}

fn sale(id: &str, qty: i64) -> SalesRecord {
    SalesRecord {
        product_id: RawProductId::from(id),
        store_name: STORE.into(),
        product_name: Some(format!("Product {id}")),
        quantity: qty,
    }
}

fn stock(id: &str, qty: i64) -> StockRecord {
    StockRecord {
        product_id: RawProductId::from(id),
        store_name: STORE.into(),
        product_name: None,
        quantity: qty,
    }
}

#[test]
fn matched_single_product() {
    let report = reconcile(&[sale("1", 10)], Some(&[stock("1", 10)]), STORE).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].discrepancy, 0);
    assert_eq!(report.records[0].classification, StockClassification::Matched);
    assert_eq!(report.summary.accuracy_rate, 100.0);
}

#[test]
fn empty_stock_marks_sales_under_stocked() {
    let report = reconcile(&[sale("1", 10)], Some(&[]), STORE).unwrap();
    let record = &report.records[0];
    assert_eq!(record.quantity_sold, 10);
    assert_eq!(record.quantity_stock, 0);
    assert_eq!(record.discrepancy, -10);
    assert_eq!(record.classification, StockClassification::UnderStocked);
}

#[test]
fn stock_only_product_is_over_stocked() {
    let report = reconcile(&[], Some(&[stock("2", 5)]), STORE).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].discrepancy, 5);
    assert_eq!(report.records[0].classification, StockClassification::OverStocked);
    assert_eq!(report.records[0].product_name, "unknown");
}

#[test]
fn matched_filter_and_half_accuracy() {
    let sales = [sale("1", 10), sale("2", 0)];
    let stock = [stock("1", 8), stock("2", 0)];
    let report = reconcile(&sales, Some(&stock), STORE).unwrap();

    let discrepancies: Vec<i64> = report.records.iter().map(|r| r.discrepancy).collect();
    assert_eq!(discrepancies, vec![-2, 0]);

    let filter = ClassificationFilter::from_str("Matched").unwrap();
    let matched = filter_records(&report.records, filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].product_id.as_str(), "2");
    assert_eq!(report.summary.accuracy_rate, 50.0);
}

#[test]
fn empty_store_yields_empty_report() {
    let report = reconcile(&[], Some(&[]), STORE).unwrap();
    assert_eq!(report.summary.total_products, 0);
    assert_eq!(report.summary.accuracy_rate, 0.0);
    assert!(report.records.is_empty());
}

#[test]
fn missing_stock_is_rejected() {
    let err = reconcile(&[sale("1", 1)], None, STORE).unwrap_err();
    assert!(matches!(err, ReconError::MissingInput { .. }));
}

#[test]
fn csv_fixtures_end_to_end() {
    let sales = loader::load_sales_csv(fixture("sales.csv")).unwrap();
    let stock = loader::load_stock_csv(fixture("stock.csv")).unwrap();
    let report = reconcile(&sales, Some(&stock), STORE).unwrap();

    let ids: Vec<&str> = report.records.iter().map(|r| r.product_id.as_str()).collect();
    assert_eq!(ids, vec!["101", "102", "103", "104"]);

    // 101 出现两次，销量合并
    assert_eq!(report.records[0].quantity_sold, 12);
    assert_eq!(report.records[0].classification, StockClassification::Matched);
    // 销售侧无名称时取库存侧
    assert_eq!(report.records[2].product_name, "Perk");
    assert_eq!(report.records[3].product_name, "Munch");

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].dataset, Dataset::Sales);
    assert_eq!(report.warnings[0].row_index, 4);

    assert_eq!(report.summary.total_products, 4);
    assert_eq!(report.summary.discrepant_count, 2);
    assert_eq!(report.summary.accuracy_rate, 50.0);

    let sorted = filter_records(&report.records, ClassificationFilter::All);
    let ordered: Vec<&str> = sorted.iter().map(|r| r.product_id.as_str()).collect();
    assert_eq!(ordered, vec!["104", "101", "103", "102"]);

    let top = top_k(&report.records, ClassificationFilter::All, 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].discrepancy, 6);
}

#[test]
fn csv_export_of_fixture_report() {
    let sales = loader::load_sales_csv(fixture("sales.csv")).unwrap();
    let stock = loader::load_stock_csv(fixture("stock.csv")).unwrap();
    let report = reconcile(&sales, Some(&stock), STORE).unwrap();

    let under = filter_records(&report.records, ClassificationFilter::UnderStocked);
    let csv = export::export_csv(&under).unwrap();
    assert_eq!(
        csv,
        "productId,productName,quantitySold,quantityStock,discrepancy,classification\n\
         102,5 Star,4,1,-3,UNDER_STOCKED\n"
    );
}

#[test]
fn store_analytics_from_fixtures() {
    let transactions = loader::load_transactions_csv(fixture("transactions.csv")).unwrap();
    let benchmark = loader::load_benchmark(fixture("benchmark.csv")).unwrap();
    let analytics = StoreAnalytics::new(AnalyticsConfig::default(), benchmark);

    let summary = analytics.order_summary(&transactions, STORE).unwrap();
    assert_eq!(summary.total_orders, 3);
    assert_eq!(summary.total_quantity, 11);
    assert_eq!(summary.total_revenue, BigDecimal::from(200));
    assert_eq!(summary.total_profit, BigDecimal::from(38));
    assert_eq!(summary.customer_info_percentage, 50.0);
    let daily: Vec<f64> = summary.daily_capture.iter().map(|d| d.customer_info_percentage).collect();
    assert_eq!(daily, vec![100.0, 0.0]);

    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    let kpis = analytics.profit_kpis(&transactions, STORE, start, end).unwrap();
    assert_eq!(kpis.selected_store_profit, BigDecimal::from(38));
    assert_eq!(kpis.selected_store_average_profit, BigDecimal::from(19));
    assert_eq!(kpis.overall_average_profit, BigDecimal::from_str("25414.8").unwrap());
    assert_eq!(kpis.profit_contribution_percentage, 19.0);

    let brands = analytics.brand_performance(&transactions, STORE).unwrap();
    let names: Vec<&str> = brands.iter().map(|b| b.brand_name.as_str()).collect();
    assert_eq!(names, vec!["Amul", "Cadbury", "Nestle"]);

    let report = analytics.counter_shelf_performance(&transactions, STORE).unwrap();
    assert_eq!(report.categories.len(), 2);
    assert_eq!(report.categories[0].category_name, "Chocolates");
    assert_eq!(report.categories[0].contribution, 60.0);
    assert_eq!(report.categories[0].variance, Some(10.0));
    assert_eq!(report.categories[1].variance, Some(5.0));
    assert_eq!(
        report.missing_categories,
        vec!["Candies & Toffees".to_string(), "Sweets, Chocolates & Candies".to_string()]
    );
}

#[test]
fn zero_padded_csv_ids_join_numeric_ids() {
    let sales = loader::load_sales_csv(
        "productId,storeName,productName,quantity\n001,Indiranagar,Dairy Milk,5\n".as_bytes(),
    )
    .unwrap();
    let stock =
        loader::load_stock_csv("productId,storeName,quantity\n1,Indiranagar,5\n".as_bytes()).unwrap();

    let report = reconcile(&sales, Some(&stock), STORE).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].product_id.as_str(), "1");
    assert_eq!(report.records[0].product_name, "Dairy Milk");
    assert_eq!(report.records[0].classification, StockClassification::Matched);
}

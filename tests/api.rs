use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use grn_recon::api::{router, AppState};
use grn_recon::config::{AnalyticsConfig, ReportConfig};
use grn_recon::service::{Reconciler, StoreAnalytics};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::new(
        Reconciler::default(),
        StoreAnalytics::new(AnalyticsConfig::default(), Vec::new()),
        ReportConfig::default(),
    );
    router(Arc::new(state))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

fn grn_request(stock: Option<Value>) -> Value {
    let mut body = json!({
        "storeName": "Indiranagar",
        "sales": [
            { "productId": 1, "storeName": "Indiranagar", "productName": "Dairy Milk", "quantity": 10 },
            { "productId": "2", "storeName": "Indiranagar", "productName": "Perk", "quantity": 0 }
        ],
        "filter": "Over-stocked"
    });
    if let Some(stock) = stock {
        body["stock"] = stock;
    }
    body
}

#[tokio::test]
async fn health_check_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, b"OK");
}

#[tokio::test]
async fn reconcile_returns_filtered_report() {
    let stock = json!([
        { "productId": 1.0, "storeName": "Indiranagar", "quantity": 14 },
        { "productId": 2, "storeName": "Indiranagar", "quantity": 0 }
    ]);
    let response = app()
        .oneshot(post_json("/api/grn/reconcile", grn_request(Some(stock))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["filter"], "OVER_STOCKED");
    assert_eq!(data["summary"]["totalProducts"], 2);
    assert_eq!(data["summary"]["accuracyRate"], 50.0);
    assert_eq!(data["records"].as_array().unwrap().len(), 1);
    assert_eq!(data["records"][0]["productId"], "1");
    assert_eq!(data["records"][0]["discrepancy"], 4);
    assert_eq!(data["records"][0]["classification"], "OVER_STOCKED");
}

#[tokio::test]
async fn missing_stock_is_unprocessable() {
    let response = app()
        .oneshot(post_json("/api/grn/reconcile", grn_request(None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("stock data is required"));
}

#[tokio::test]
async fn stock_without_quantity_column_is_bad_request() {
    let stock = json!([{ "productId": 1, "storeName": "Indiranagar" }]);
    let response = app()
        .oneshot(post_json("/api/grn/reconcile", grn_request(Some(stock))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["message"], "stock data must contain columns: quantity");
}

#[tokio::test]
async fn unknown_filter_is_bad_request() {
    let mut request = grn_request(Some(json!([])));
    request["filter"] = json!("Sideways");
    let response = app().oneshot(post_json("/api/grn/reconcile", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_returns_csv() {
    let response = app()
        .oneshot(post_json("/api/grn/export", grn_request(Some(json!([])))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );

    // 库存为空时没有积压商品，只剩表头
    let body = String::from_utf8(read_body(response).await).unwrap();
    assert_eq!(
        body,
        "productId,productName,quantitySold,quantityStock,discrepancy,classification\n"
    );
}

#[tokio::test]
async fn summary_as_csv() {
    let stock = json!([
        { "productId": 1, "storeName": "Indiranagar", "quantity": 10 },
        { "productId": 2, "storeName": "Indiranagar", "quantity": 1 }
    ]);
    let response = app()
        .oneshot(post_json("/api/grn/summary?format=csv", grn_request(Some(stock))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );

    let body = String::from_utf8(read_body(response).await).unwrap();
    assert_eq!(
        body,
        "metric,value\nTotal Products,2\nProducts with Discrepancies,1\nGRN Accuracy Rate,50.00\n"
    );
}

#[tokio::test]
async fn summary_as_json() {
    let response = app()
        .oneshot(post_json("/api/grn/summary", grn_request(Some(json!([])))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["data"]["totalProducts"], 2);
    assert_eq!(body["data"]["discrepantCount"], 1);
}

#[tokio::test]
async fn quantity_overflow_is_bad_request() {
    let mut request = grn_request(Some(json!([
        { "productId": 1, "storeName": "Indiranagar", "quantity": i64::MAX }
    ])));
    request["sales"] = json!([
        { "productId": 1, "storeName": "Indiranagar", "productName": "Dairy Milk", "quantity": -1 }
    ]);
    let response = app().oneshot(post_json("/api/grn/reconcile", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["message"], "discrepancy overflows for product 1");
}

#[tokio::test]
async fn profit_requires_date_range() {
    let request = json!({ "storeName": "Indiranagar", "sales": [] });
    let response = app()
        .oneshot(post_json("/api/analytics/profit", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn brands_as_csv() {
    let request = json!({
        "storeName": "Indiranagar",
        "sales": [{
            "invoice": "INV-1",
            "storeName": "Indiranagar",
            "productId": 1,
            "productName": "Dairy Milk",
            "brandName": "Cadbury",
            "categoryName": "Chocolates",
            "quantity": 2,
            "totalProductPrice": 100,
            "costPrice": 80,
            "customerNumber": ""
        }]
    });
    let response = app()
        .oneshot(post_json("/api/analytics/brands?format=csv", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let body = String::from_utf8(read_body(response).await).unwrap();
    assert!(body.lines().nth(1).unwrap().starts_with("Cadbury,"));
}

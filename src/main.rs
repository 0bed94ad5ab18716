use grn_recon::{api, AppConfig};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式，RUST_LOG 未设置时默认 info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let state = Arc::new(api::AppState::from_config(&config));
    let app = api::router(state).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/grn/reconcile         - GRN reconciliation report");
    info!("  POST /api/grn/export            - GRN report as CSV");
    info!("  POST /api/grn/summary           - GRN summary (?format=csv)");
    info!("  POST /api/analytics/orders      - order summary");
    info!("  POST /api/analytics/profit      - profit KPIs");
    info!("  POST /api/analytics/brands      - low performing brands");
    info!("  POST /api/analytics/categories  - counter shelf categories");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

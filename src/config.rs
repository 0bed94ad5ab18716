use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub report: ReportConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// GRN 报表配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 图表展示的差异商品数量
    pub top_k: usize,
    /// 两侧都缺商品名称时的占位名
    pub unknown_product_name: String,
}

/// 门店分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub benchmark_path: String,
    pub counter_shelf_categories: Vec<String>,
    /// 全公司日均销售额基线
    pub daily_profit_baseline: f64,
    pub baseline_margin: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            report: ReportConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            unknown_product_name: crate::service::UNKNOWN_PRODUCT_NAME.to_string(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            benchmark_path: "./company_benchmark/counter_shelf_benchmark.csv".to_string(),
            counter_shelf_categories: vec![
                "Candies & Toffees".to_string(),
                "Sweets, Chocolates & Candies".to_string(),
                "Chocolates".to_string(),
                "Gums, Mints & Mouth Freshener".to_string(),
            ],
            daily_profit_baseline: 42358.0,
            baseline_margin: 0.3,
        }
    }
}

impl AppConfig {
    /// 默认值 → 可选的 grn-recon.toml → 环境变量 (GRN_SERVER__PORT 等)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Some("grn-recon"))
    }

    /// 指定配置文件名 (不含扩展名)；None 时只读默认值与环境变量
    pub fn load_from(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("GRN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

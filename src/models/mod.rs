pub mod analytics;
pub mod product;
pub mod reconciled;
pub mod sales;
pub mod stock;

pub use analytics::{
    BenchmarkRow, BrandPerformance, CategoryPerformance, CategoryReport, DailyCapture,
    OrderSummary, ProfitKpis,
};
pub use product::{ProductId, RawProductId};
pub use reconciled::{
    ClassificationFilter, Dataset, NormalizationWarning, ReconReport, ReconSummary,
    ReconciledRecord, StockClassification,
};
pub use sales::{SalesRecord, Transaction};
pub use stock::StockRecord;

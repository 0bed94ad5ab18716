pub mod analytics;
pub mod export;
pub mod reconciler;

pub use analytics::StoreAnalytics;
pub use export::{export_csv, export_summary_csv};
pub use reconciler::{filter_records, reconcile, top_k, Reconciler, UNKNOWN_PRODUCT_NAME};

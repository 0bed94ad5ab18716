pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{ReconError, ReconResult};
pub use service::{filter_records, reconcile, top_k, Reconciler, StoreAnalytics};

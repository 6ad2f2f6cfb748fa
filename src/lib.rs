
pub mod analytics;
pub mod analytics_core;
pub mod config;
pub mod envio;
pub mod sqlite_pragma;

pub use analytics::{AnalyticsError, CopyTradeAnalytics};
pub use config::{AnalyticsConfig, BackendType};

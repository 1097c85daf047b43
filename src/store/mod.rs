//! Typed records and the per-session dataset store.
pub mod dataset;
pub mod error;
pub mod types;

// Re-export key types for convenient access
pub use dataset::DashboardStore;
pub use error::StoreError;
pub use types::{FieldValue, Header, Record, SubsetStats};

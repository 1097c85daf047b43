//! Tabular input boundary: delimited text in, raw string rows out.
//!
//! Everything downstream of this module works on typed records; nothing
//! downstream performs I/O. A failure here is a load failure, fatal to the
//! session and propagated to the host, never retried.
pub mod error;
pub mod table;

pub use error::IngestError;
pub use table::RawTable;

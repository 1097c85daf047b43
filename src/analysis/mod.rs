//! Derived views over the dataset: filtering, aggregation, correlation.
//!
//! Everything here is a pure function of its record slice: no I/O, no
//! retained state, recomputed in full on every filter change.
pub mod aggregate;
pub mod correlation;
pub mod error;
pub mod filter;

pub use aggregate::{cluster_means, cluster_week_series, entity_aggregates, sample_entities};
pub use correlation::correlate;
pub use error::AggregateError;
pub use filter::{apply, ClusterSelection, FilterSpec, InsiderSelection};

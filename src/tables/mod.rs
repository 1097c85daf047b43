//! Auxiliary tabular inputs, read independently of the main dataset and
//! never merged into it: the per-cluster feature-profile table and the
//! descriptive cluster labels.
pub mod labels;
pub mod profiles;

pub use labels::ClusterLabelMap;
pub use profiles::{ClusterProfiles, NormalizedProfile};

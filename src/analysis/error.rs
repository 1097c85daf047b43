use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    /// An entity's records disagree on a label that is invariant per entity.
    /// This is a data-integrity violation in the source, reported instead of
    /// silently resolved to whichever row came first.
    #[error("entity '{entity}' has conflicting '{column}' labels")]
    LabelConflict { entity: String, column: &'static str },
}

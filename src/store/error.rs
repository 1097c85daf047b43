use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A query or filter reached the store before any dataset was loaded.
    /// Operating silently on an empty collection would hide a host bug, so
    /// this is a hard error instead.
    #[error("no dataset loaded")]
    NotLoaded,
}

use crate::types::CatalogObjectType;
use thiserror::Error;

pub type Result<T, E = CatalogError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog object of type {kind:?} at position {position} has no id")]
    MissingId {
        kind: CatalogObjectType,
        position: usize,
    },
    #[error("variation without id declared by item {item_id}")]
    MissingVariationId { item_id: String },
    #[error("invalid catalog snapshot: {0}")]
    Decode(String),
}

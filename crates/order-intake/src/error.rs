use thiserror::Error;

pub type Result<T, E = IntakeError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum IntakeError {
    /// Nothing orderable was found; no request should be submitted.
    #[error("nothing to order")]
    EmptyOrder,
    #[error("no location id configured")]
    MissingLocation,
    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Catalog(#[from] menu_catalog::CatalogError),
}

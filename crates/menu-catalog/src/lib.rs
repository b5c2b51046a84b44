//! menu-catalog: point-of-sale catalog snapshots for voice ordering
//!
//! A snapshot is fetched elsewhere, handed to [`CatalogIndex::build`] once, and
//! then shared read-only. Refreshing means building a new index and swapping
//! it into a [`CatalogHandle`].

mod types;
pub use types::{
    normalize_name, CatalogEntry, CatalogObject, CatalogObjectType, ItemData, ItemMatch,
    ItemVariationData, ModifierData, ModifierEntry, Money, VariationRef,
};

mod error;
pub use error::{CatalogError, Result};

mod index;
pub use index::{
    CatalogHandle, CatalogIndex, DEFAULT_SEARCH_LIMIT, EXACT_MATCH_SCORE, PARTIAL_MATCH_BASE,
};

mod loader;
pub use loader::{load_index_file, load_snapshot_file, parse_snapshot};

mod prompt;
pub use prompt::render_menu_prompt;

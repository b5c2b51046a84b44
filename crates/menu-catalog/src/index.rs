//! Read-only catalog snapshot with name matching

use crate::error::{CatalogError, Result};
use crate::types::{
    normalize_name, CatalogEntry, CatalogObject, CatalogObjectType, ItemMatch, ModifierEntry,
    VariationRef,
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Score for a name equal to the catalog name after normalization.
pub const EXACT_MATCH_SCORE: i32 = 100;
/// Base score when one name contains the other; reduced by the length gap.
pub const PARTIAL_MATCH_BASE: i32 = 90;
/// Result cap for [`CatalogIndex::search_items`] when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Immutable view of one catalog snapshot.
#[derive(Debug, Default, Clone)]
pub struct CatalogIndex {
    items: Vec<CatalogEntry>,
    by_id: HashMap<String, usize>,
    by_variation: HashMap<String, usize>,
    modifiers: Vec<ModifierEntry>,
}

impl CatalogIndex {
    /// Build an index from a raw catalog listing.
    ///
    /// Variations declared inline on an item take precedence; otherwise every
    /// `ITEM_VARIATION` object pointing at the item is attached in snapshot
    /// order.
    pub fn build(objects: &[CatalogObject]) -> Result<Self> {
        let mut loose_variations: Vec<(String, VariationRef)> = Vec::new();
        let mut pending_items: Vec<(String, String, Vec<VariationRef>)> = Vec::new();
        let mut modifiers = Vec::new();

        for (position, object) in objects.iter().enumerate() {
            if object.kind == CatalogObjectType::Other {
                continue;
            }
            let id = object
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .ok_or(CatalogError::MissingId {
                    kind: object.kind,
                    position,
                })?;

            match object.kind {
                CatalogObjectType::Item => {
                    let data = object.item_data.clone().unwrap_or_default();
                    let Some(name) = data.name.filter(|n| !n.trim().is_empty()) else {
                        warn!(item_id = %id, "skipping catalog item without a name");
                        continue;
                    };
                    let mut declared = Vec::with_capacity(data.variations.len());
                    for variation in &data.variations {
                        let variation_id = variation.id.clone().ok_or_else(|| {
                            CatalogError::MissingVariationId {
                                item_id: id.clone(),
                            }
                        })?;
                        declared.push(variation_ref(variation_id, variation));
                    }
                    pending_items.push((id, name, declared));
                }
                CatalogObjectType::ItemVariation => {
                    let parent = object
                        .item_variation_data
                        .as_ref()
                        .and_then(|d| d.item_id.clone());
                    match parent {
                        Some(parent) => loose_variations.push((parent, variation_ref(id, object))),
                        None => debug!(variation_id = %id, "variation without parent item"),
                    }
                }
                CatalogObjectType::Modifier => {
                    let data = object.modifier_data.clone().unwrap_or_default();
                    let Some(name) = data.name.filter(|n| !n.trim().is_empty()) else {
                        warn!(modifier_id = %id, "skipping modifier without a name");
                        continue;
                    };
                    modifiers.push(ModifierEntry {
                        id,
                        name,
                        price: data.price_money,
                    });
                }
                CatalogObjectType::Other => {}
            }
        }

        let mut index = CatalogIndex {
            modifiers,
            ..Default::default()
        };
        for (id, name, declared) in pending_items {
            let variations = if declared.is_empty() {
                loose_variations
                    .iter()
                    .filter(|(parent, _)| *parent == id)
                    .map(|(_, v)| v.clone())
                    .collect()
            } else {
                declared
            };
            if index.by_id.contains_key(&id) {
                warn!(item_id = %id, "duplicate item id in snapshot, keeping the first");
                continue;
            }
            let slot = index.items.len();
            for variation in &variations {
                index.by_variation.entry(variation.id.clone()).or_insert(slot);
            }
            index.by_id.insert(id.clone(), slot);
            index.items.push(CatalogEntry {
                id,
                name,
                variations,
            });
        }

        info!(
            items = index.items.len(),
            variations = index.by_variation.len(),
            modifiers = index.modifiers.len(),
            "catalog index built"
        );
        Ok(index)
    }

    pub fn items(&self) -> &[CatalogEntry] {
        &self.items
    }

    pub fn modifiers(&self) -> &[ModifierEntry] {
        &self.modifiers
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.modifiers.is_empty()
    }

    /// Look up an item by its own id.
    pub fn item(&self, id: &str) -> Option<&CatalogEntry> {
        self.by_id.get(id).map(|&slot| &self.items[slot])
    }

    /// Item owning the given variation id.
    pub fn variation_owner(&self, variation_id: &str) -> Option<&CatalogEntry> {
        self.by_variation
            .get(variation_id)
            .map(|&slot| &self.items[slot])
    }

    pub fn modifier(&self, id: &str) -> Option<&ModifierEntry> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    /// Items whose name starts with `prefix`, in snapshot order, at most
    /// `limit` of them. An empty prefix lists from the start of the menu.
    pub fn search_items(&self, prefix: &str, limit: usize) -> Vec<&CatalogEntry> {
        let prefix = normalize_name(prefix);
        self.items
            .iter()
            .filter(|entry| normalize_name(&entry.name).starts_with(&prefix))
            .take(limit)
            .collect()
    }

    /// Modifiers whose name contains every word of `query`.
    pub fn search_modifiers(&self, query: &str) -> Vec<&ModifierEntry> {
        let query = normalize_name(query);
        let terms: Vec<&str> = query.split_whitespace().collect();
        self.modifiers
            .iter()
            .filter(|m| {
                let name = normalize_name(&m.name);
                terms.iter().all(|term| name.contains(term))
            })
            .collect()
    }

    /// Find the item whose name best matches `name`.
    ///
    /// Exact matches score [`EXACT_MATCH_SCORE`]; containment in either
    /// direction scores [`PARTIAL_MATCH_BASE`] minus the difference in length.
    /// Only scores above zero count, and the first item wins a tie.
    pub fn find_best_item_match(&self, name: &str) -> Option<ItemMatch<'_>> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        let wanted_len = wanted.chars().count() as i32;

        let mut best: Option<&CatalogEntry> = None;
        let mut best_score = 0;
        for entry in &self.items {
            let candidate = normalize_name(&entry.name);
            let score = if candidate == wanted {
                EXACT_MATCH_SCORE
            } else if candidate.contains(&wanted) || wanted.contains(&candidate) {
                PARTIAL_MATCH_BASE - (candidate.chars().count() as i32 - wanted_len).abs()
            } else {
                continue;
            };
            if score > best_score {
                best = Some(entry);
                best_score = score;
            }
        }

        let entry = best?;
        debug!(input = %name, item = %entry.name, score = best_score, "item matched");
        Some(ItemMatch {
            entry,
            variation_id: entry.primary_variation_id(),
            score: best_score,
        })
    }

    /// Find the modifier named by `phrase`, preferring exact names over
    /// containment.
    pub fn find_modifier_match(&self, phrase: &str) -> Option<&ModifierEntry> {
        let wanted = normalize_name(phrase);
        if wanted.is_empty() {
            return None;
        }
        self.modifiers
            .iter()
            .find(|m| normalize_name(&m.name) == wanted)
            .or_else(|| {
                self.modifiers.iter().find(|m| {
                    let candidate = normalize_name(&m.name);
                    candidate.contains(&wanted) || wanted.contains(&candidate)
                })
            })
    }
}

fn variation_ref(id: String, object: &CatalogObject) -> VariationRef {
    let data = object.item_variation_data.as_ref();
    VariationRef {
        id,
        name: data.and_then(|d| d.name.clone()),
        price: data.and_then(|d| d.price_money.clone()),
    }
}

/// Shared slot holding the current catalog snapshot.
///
/// Readers take an `Arc` and keep using it even if a refresh swaps in a new
/// index meanwhile.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<CatalogIndex>>,
}

impl CatalogHandle {
    pub fn new(index: CatalogIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    pub fn snapshot(&self) -> Arc<CatalogIndex> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a freshly built index, returning the one it replaces.
    pub fn replace(&self, index: CatalogIndex) -> Arc<CatalogIndex> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(index))
    }
}

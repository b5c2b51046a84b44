//! Catalog resolution for canonical order lines

use crate::lines::{CanonicalOrderLine, ResolvedOrderLine};
use crate::IntakeConfig;
use menu_catalog::{CatalogEntry, CatalogIndex, Money};
use tracing::{debug, info, warn};

/// Maps canonical lines onto catalog variations and modifiers.
///
/// Resolution is total: a line the catalog does not know becomes a custom
/// line at the fallback price instead of being dropped.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    fallback_price: Money,
    placeholder_marker: String,
}

impl CatalogResolver {
    pub fn new(config: &IntakeConfig) -> Self {
        Self {
            fallback_price: Money::new(config.fallback_price_minor, config.currency.clone()),
            placeholder_marker: config.placeholder_marker.clone(),
        }
    }

    pub fn fallback_price(&self) -> &Money {
        &self.fallback_price
    }

    pub fn resolve(&self, line: &CanonicalOrderLine, index: &CatalogIndex) -> ResolvedOrderLine {
        let matched = self
            .supplied_variation(line, index)
            .or_else(|| {
                index
                    .find_best_item_match(&line.display_name)
                    .map(|m| (m.entry, m.variation_id))
            });

        match matched {
            Some((entry, default_variation)) => {
                let variation_id = self
                    .requested_variation(line, entry)
                    .unwrap_or(default_variation);
                self.catalog_line(line, entry, variation_id, index)
            }
            None => self.custom_line(line),
        }
    }

    pub fn resolve_all(
        &self,
        lines: &[CanonicalOrderLine],
        index: &CatalogIndex,
    ) -> Vec<ResolvedOrderLine> {
        lines.iter().map(|line| self.resolve(line, index)).collect()
    }

    /// Honor a catalog id the caller already supplied, if the index knows it.
    fn supplied_variation<'a>(
        &self,
        line: &CanonicalOrderLine,
        index: &'a CatalogIndex,
    ) -> Option<(&'a CatalogEntry, &'a str)> {
        let id = line.catalog_object_id.as_deref()?.trim();
        if self.is_placeholder(id) {
            return None;
        }

        if let Some(entry) = index.variation_owner(id) {
            let variation = entry.variations.iter().find(|v| v.id == id)?;
            debug!(item = %entry.name, variation_id = id, "using supplied variation id");
            return Some((entry, variation.id.as_str()));
        }
        if let Some(entry) = index.item(id) {
            debug!(item = %entry.name, item_id = id, "using supplied item id");
            return Some((entry, entry.primary_variation_id()));
        }

        warn!(
            catalog_object_id = id,
            item = %line.display_name,
            "supplied catalog id not in catalog, matching by name"
        );
        None
    }

    /// A supplied variation id, if it belongs to the matched item.
    fn requested_variation<'a>(
        &self,
        line: &CanonicalOrderLine,
        entry: &'a CatalogEntry,
    ) -> Option<&'a str> {
        let id = line.variation_id.as_deref()?.trim();
        if self.is_placeholder(id) {
            return None;
        }
        match entry.variations.iter().find(|v| v.id == id) {
            Some(variation) => Some(variation.id.as_str()),
            None => {
                warn!(variation_id = id, item = %entry.name, "variation not on matched item");
                None
            }
        }
    }

    fn is_placeholder(&self, id: &str) -> bool {
        let marker = self.placeholder_marker.as_str();
        id.is_empty() || (!marker.is_empty() && id.contains(marker))
    }

    fn catalog_line(
        &self,
        line: &CanonicalOrderLine,
        entry: &CatalogEntry,
        variation_id: &str,
        index: &CatalogIndex,
    ) -> ResolvedOrderLine {
        let mut modifier_ids: Vec<String> = Vec::new();
        let mut unmatched_modifiers = Vec::new();
        for id in &line.modifier_ids {
            if index.modifier(id).is_some() {
                modifier_ids.push(id.clone());
            } else {
                warn!(modifier_id = %id, item = %entry.name, "supplied modifier id not in catalog");
                unmatched_modifiers.push(id.clone());
            }
        }
        for phrase in &line.modifier_phrases {
            match index.find_modifier_match(phrase) {
                Some(modifier) if modifier_ids.contains(&modifier.id) => {}
                Some(modifier) => modifier_ids.push(modifier.id.clone()),
                None => {
                    warn!(modifier = %phrase, item = %entry.name, "no catalog modifier");
                    unmatched_modifiers.push(phrase.clone());
                }
            }
        }

        ResolvedOrderLine::Catalog {
            catalog_object_id: variation_id.to_string(),
            quantity: line.quantity,
            modifier_ids,
            note: line_note(line),
            unmatched_modifiers,
        }
    }

    fn custom_line(&self, line: &CanonicalOrderLine) -> ResolvedOrderLine {
        info!(item = %line.display_name, "no catalog match, adding custom line");
        ResolvedOrderLine::Custom {
            name: line.display_name.clone(),
            quantity: line.quantity,
            base_price: self.fallback_price.clone(),
            note: line_note(line),
        }
    }
}

/// The caller's note followed by the requested modifier phrases.
fn line_note(line: &CanonicalOrderLine) -> Option<String> {
    let modifiers = (!line.modifier_phrases.is_empty())
        .then(|| format!("Modifiers: {}", line.modifier_phrases.join(", ")));
    match (line.note.as_deref(), modifiers) {
        (Some(note), Some(modifiers)) => Some(format!("{note}; {modifiers}")),
        (Some(note), None) => Some(note.to_string()),
        (None, modifiers) => modifiers,
    }
}

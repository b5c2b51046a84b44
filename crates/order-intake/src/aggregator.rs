//! Merge raw candidates into one line per item name

use crate::lines::{CanonicalOrderLine, RawOrderLine};
use std::collections::HashMap;
use tracing::debug;

/// Group `raw_lines` by normalized name, summing quantities.
///
/// Output keeps the order in which each name was first seen. Modifier phrases
/// are unioned case-insensitively and supplied modifier ids exactly. The first
/// supplied catalog id and variation id win; distinct notes are joined.
pub fn aggregate(raw_lines: &[RawOrderLine]) -> Vec<CanonicalOrderLine> {
    let mut merged: Vec<CanonicalOrderLine> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for raw in raw_lines {
        let key = raw.normalized_name();
        if key.is_empty() {
            debug!("dropping order line without a name");
            continue;
        }

        match slots.get(&key).copied() {
            Some(slot) => {
                let line = &mut merged[slot];
                line.quantity = line.quantity.merge(raw.quantity);
                for phrase in &raw.modifier_phrases {
                    push_phrase(&mut line.modifier_phrases, phrase);
                }
                for id in &raw.modifier_ids {
                    push_id(&mut line.modifier_ids, id);
                }
                if line.catalog_object_id.is_none() {
                    line.catalog_object_id = raw.catalog_object_id.clone();
                }
                if line.variation_id.is_none() {
                    line.variation_id = raw.variation_id.clone();
                }
                push_note(&mut line.note, raw.note.as_deref());
            }
            None => {
                let mut modifier_phrases = Vec::with_capacity(raw.modifier_phrases.len());
                for phrase in &raw.modifier_phrases {
                    push_phrase(&mut modifier_phrases, phrase);
                }
                let mut modifier_ids = Vec::with_capacity(raw.modifier_ids.len());
                for id in &raw.modifier_ids {
                    push_id(&mut modifier_ids, id);
                }
                let mut note = None;
                push_note(&mut note, raw.note.as_deref());

                slots.insert(key.clone(), merged.len());
                merged.push(CanonicalOrderLine {
                    normalized_name: key,
                    display_name: raw.name.trim().to_string(),
                    quantity: raw.quantity,
                    modifier_phrases,
                    catalog_object_id: raw.catalog_object_id.clone(),
                    variation_id: raw.variation_id.clone(),
                    modifier_ids,
                    note,
                });
            }
        }
    }

    merged
}

fn push_phrase(phrases: &mut Vec<String>, phrase: &str) {
    let phrase = phrase.trim();
    if phrase.is_empty() || phrases.iter().any(|p| p.eq_ignore_ascii_case(phrase)) {
        return;
    }
    phrases.push(phrase.to_string());
}

fn push_id(ids: &mut Vec<String>, id: &str) {
    let id = id.trim();
    if !id.is_empty() && !ids.iter().any(|known| known == id) {
        ids.push(id.to_string());
    }
}

fn push_note(note: &mut Option<String>, extra: Option<&str>) {
    let Some(extra) = extra.map(str::trim).filter(|n| !n.is_empty()) else {
        return;
    };
    if let Some(existing) = note.as_mut() {
        if !existing.split("; ").any(|part| part == extra) {
            existing.push_str("; ");
            existing.push_str(extra);
        }
    } else {
        *note = Some(extra.to_string());
    }
}

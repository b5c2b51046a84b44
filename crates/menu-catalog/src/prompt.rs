//! Plain-text menu listing handed to the voice agent as context

use crate::index::CatalogIndex;
use std::fmt::Write;

pub fn render_menu_prompt(index: &CatalogIndex) -> String {
    let mut prompt = String::from("Here is the current menu:\n");

    for item in index.items() {
        let _ = writeln!(prompt, "• {} (item_id={})", item.name, item.id);
        if !item.variations.is_empty() {
            let variations: Vec<String> = item
                .variations
                .iter()
                .map(|v| format!("{}({})", v.name.as_deref().unwrap_or("Default"), v.id))
                .collect();
            let _ = writeln!(prompt, "  – Variations: {}", variations.join(", "));
        }
    }

    for modifier in index.modifiers() {
        let _ = writeln!(prompt, "• {} (modifier_id={})", modifier.name, modifier.id);
    }

    prompt
}

//! Order intake for voice conversations
//!
//! This crate turns transcribed customer speech into structured order lines,
//! merges them, resolves them against a catalog snapshot and assembles an
//! order request for the point-of-sale API. It performs no I/O; the catalog
//! comes in and the request goes out as plain data.

mod aggregator;
mod config;
mod error;
mod extractor;
pub mod lexicon;
mod lines;
mod pipeline;
mod request;
mod resolver;

pub use aggregator::aggregate;
pub use config::{IntakeConfig, DEFAULT_KNOWN_ITEMS, FALLBACK_PRICE_MINOR};
pub use error::{IntakeError, Result};
pub use extractor::TextOrderExtractor;
pub use lines::{CanonicalOrderLine, Quantity, RawOrderLine, ResolvedOrderLine};
pub use pipeline::{build_index, OrderIntake};
pub use request::{
    new_idempotency_key, LineItemPayload, ModifierPayload, OrderBody, OrderPayload, OrderRequest,
    OrderRequestBuilder, OrderSource,
};
pub use resolver::CatalogResolver;

/// Create an intake pipeline with default configuration for `location_id`
pub fn create_intake(location_id: &str) -> Result<OrderIntake> {
    let config = IntakeConfig {
        location_id: Some(location_id.to_string()),
        ..Default::default()
    };
    OrderIntake::new(&config)
}

/// Extract and merge order lines from text using the default vocabulary
pub fn extract_order(text: &str) -> Result<Vec<CanonicalOrderLine>> {
    let extractor = TextOrderExtractor::new(&IntakeConfig::default())?;
    Ok(aggregate(&extractor.extract(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_catalog::{parse_snapshot, CatalogIndex};

    fn catalog(json: &str) -> CatalogIndex {
        CatalogIndex::build(&parse_snapshot(json).unwrap()).unwrap()
    }

    #[test]
    fn test_basic_conversations() {
        let test_cases = vec![
            ("can I get two rebel burgers and one coke", 2),
            ("3 fries, 2 milkshakes.", 2),
            ("I'll get a coke", 1),
            ("just a water and a coffee", 2),
            ("fries 2 and a soda", 2),
        ];

        for (text, expected) in test_cases {
            let lines = extract_order(text).unwrap();
            assert_eq!(lines.len(), expected, "'{}' -> {:?}", text, lines);
            assert!(lines.iter().all(|l| l.quantity.get() >= 1));
        }
    }

    #[test]
    fn test_rebel_burger_order() {
        let index = catalog(
            r#"[{ "type": "ITEM", "id": "i1", "item_data": { "name": "Rebel Burger",
                 "variations": [{ "type": "ITEM_VARIATION", "id": "v1" }] } }]"#,
        );
        let intake = create_intake("L1").unwrap();

        let request = intake
            .prepare_from_text("can I get two rebel burgers and one coke", &index, None)
            .unwrap();
        let payload = serde_json::to_value(request.to_payload()).unwrap();
        let items = payload["order"]["line_items"].as_array().unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["catalog_object_id"], "v1");
        assert_eq!(items[0]["quantity"], "2");
        assert_eq!(items[1]["name"], "coke");
        assert_eq!(items[1]["quantity"], "1");
        assert_eq!(items[1]["base_price_money"]["amount"], FALLBACK_PRICE_MINOR);
    }

    #[test]
    fn test_fries_mentioned_once() {
        let lines = extract_order("some fries please").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].normalized_name, "fries");
        assert_eq!(lines[0].quantity.get(), 1);

        let lines = extract_order("two fries please").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity.get(), 2);
    }

    #[test]
    fn test_extra_cheese_without_cheese_modifier() {
        let index = catalog(
            r#"[
                { "type": "ITEM", "id": "i1", "item_data": { "name": "Burger" } },
                { "type": "MODIFIER", "id": "m1", "modifier_data": { "name": "Pickles" } }
            ]"#,
        );
        let intake = create_intake("L1").unwrap();
        let request = intake
            .prepare_from_text("one burger with extra cheese", &index, None)
            .unwrap();

        match &request.line_items[0] {
            ResolvedOrderLine::Catalog {
                catalog_object_id,
                modifier_ids,
                note,
                ..
            } => {
                assert_eq!(catalog_object_id, "i1");
                assert!(modifier_ids.is_empty());
                assert!(note.as_deref().unwrap().contains("extra cheese"));
            }
            other => panic!("expected catalog line, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_conversation() {
        assert!(extract_order("").unwrap().is_empty());
        let err = create_intake("L1")
            .unwrap()
            .prepare_from_text("", &CatalogIndex::default(), None)
            .unwrap_err();
        assert!(matches!(err, IntakeError::EmptyOrder));
    }
}

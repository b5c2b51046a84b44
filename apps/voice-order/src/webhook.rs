//! Normalization of voice-widget webhook bodies into order lines
//!
//! The widget and the automation tools around it post orders in a few
//! shapes. Everything is mapped to [`RawOrderLine`]s here so the intake
//! pipeline only ever sees one form.

use anyhow::{Context, Result};
use order_intake::{Quantity, RawOrderLine, TextOrderExtractor};
use serde::Deserialize;
use tracing::{debug, warn};

pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookFormat {
    /// `{"type": "elevenlabs-convai", "action": "order_confirmed", "data": {...}}`
    OrderConfirmed,
    /// `{"transcript": "...", "items": [...]?}`
    Transcript,
    /// `{"customer_name": "...", "items": [...]}`
    Direct,
}

#[derive(Debug, Clone)]
pub struct NormalizedOrder {
    pub format: WebhookFormat,
    pub customer_name: String,
    pub lines: Vec<RawOrderLine>,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    data: Option<EnvelopeData>,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    items: Option<Vec<IncomingItem>>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    items: Option<Vec<IncomingItem>>,
}

#[derive(Debug, Deserialize)]
struct IncomingItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Quantity,
    #[serde(default)]
    modifiers: Vec<IncomingModifier>,
    #[serde(default)]
    catalog_object_id: Option<String>,
    #[serde(default)]
    variation_id: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IncomingModifier {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        catalog_object_id: Option<String>,
    },
}

pub fn normalize(body: &str, extractor: &TextOrderExtractor) -> Result<NormalizedOrder> {
    let envelope: Envelope = serde_json::from_str(body).context("invalid JSON in webhook body")?;

    let confirmed = envelope.kind.as_deref() == Some("elevenlabs-convai")
        && envelope.action.as_deref() == Some("order_confirmed");

    let (format, customer, lines) = if confirmed {
        let data = envelope.data.unwrap_or_default();
        (
            WebhookFormat::OrderConfirmed,
            data.customer_name,
            convert_items(data.items.unwrap_or_default()),
        )
    } else if let Some(transcript) = envelope.transcript {
        let customer = envelope.name.or(envelope.customer_name);
        let lines = match envelope.items {
            Some(items) => convert_items(items),
            None => {
                debug!(chars = transcript.len(), "extracting order from transcript");
                extractor.extract(&transcript)
            }
        };
        (WebhookFormat::Transcript, customer, lines)
    } else {
        (
            WebhookFormat::Direct,
            envelope.customer_name,
            convert_items(envelope.items.unwrap_or_default()),
        )
    };

    let customer_name = customer
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());

    debug!(?format, customer = %customer_name, lines = lines.len(), "webhook normalized");
    Ok(NormalizedOrder {
        format,
        customer_name,
        lines,
    })
}

fn convert_items(items: Vec<IncomingItem>) -> Vec<RawOrderLine> {
    items
        .into_iter()
        .filter_map(|item| {
            let name = item.name.filter(|n| !n.trim().is_empty());
            let Some(name) = name else {
                warn!("skipping order item without a name");
                return None;
            };

            let mut phrases = Vec::new();
            let mut modifier_ids = Vec::new();
            for modifier in item.modifiers {
                match modifier {
                    IncomingModifier::Name(name) => phrases.push(name),
                    IncomingModifier::Object {
                        catalog_object_id: Some(id),
                        ..
                    } => modifier_ids.push(id),
                    IncomingModifier::Object {
                        name: Some(name), ..
                    } => phrases.push(name),
                    IncomingModifier::Object { .. } => {
                        warn!(item = %name, "skipping modifier without a name or id")
                    }
                }
            }

            let mut line = RawOrderLine::new(name, 1)
                .with_modifiers(phrases)
                .with_modifier_ids(modifier_ids);
            line.quantity = item.quantity;
            line.catalog_object_id = item.catalog_object_id;
            line.variation_id = item.variation_id;
            line.note = item.note.filter(|n| !n.trim().is_empty());
            Some(line)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_intake::IntakeConfig;

    fn extractor() -> TextOrderExtractor {
        TextOrderExtractor::new(&IntakeConfig::default()).unwrap()
    }

    #[test]
    fn test_order_confirmed_format() {
        let body = r#"{
            "type": "elevenlabs-convai",
            "action": "order_confirmed",
            "data": {
                "customer_name": "Jordan",
                "items": [
                    { "name": "Rebel Burger", "quantity": 2, "modifiers": ["bacon", { "name": "cheese" }] },
                    { "name": "Fries", "quantity": "3" }
                ]
            }
        }"#;
        let order = normalize(body, &extractor()).unwrap();

        assert_eq!(order.format, WebhookFormat::OrderConfirmed);
        assert_eq!(order.customer_name, "Jordan");
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].quantity.get(), 2);
        assert_eq!(order.lines[0].modifier_phrases, vec!["bacon", "cheese"]);
        assert!(order.lines[0].modifier_ids.is_empty());
        assert_eq!(order.lines[1].quantity.get(), 3);
    }

    #[test]
    fn test_transcript_without_items_is_extracted() {
        let body = r#"{ "transcript": "two rebel burgers and a coke", "name": "Riley" }"#;
        let order = normalize(body, &extractor()).unwrap();

        assert_eq!(order.format, WebhookFormat::Transcript);
        assert_eq!(order.customer_name, "Riley");
        let names: Vec<&str> = order.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["rebel burgers", "coke"]);
    }

    #[test]
    fn test_transcript_prefers_supplied_items() {
        let body = r#"{ "transcript": "two burgers", "customer_name": "Kai",
                        "items": [{ "name": "Milkshake", "catalog_object_id": "v9" }] }"#;
        let order = normalize(body, &extractor()).unwrap();

        assert_eq!(order.customer_name, "Kai");
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].catalog_object_id.as_deref(), Some("v9"));
        assert_eq!(order.lines[0].quantity.get(), 1);
    }

    #[test]
    fn test_direct_format_defaults() {
        let body = r#"{ "items": [
            { "name": "Coke", "quantity": 0 },
            { "quantity": 4 },
            { "name": "Soda", "quantity": "lots" }
        ] }"#;
        let order = normalize(body, &extractor()).unwrap();

        assert_eq!(order.format, WebhookFormat::Direct);
        assert_eq!(order.customer_name, UNKNOWN_CUSTOMER);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].quantity.get(), 1);
        assert_eq!(order.lines[1].quantity.get(), 1);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = normalize("{ nope", &extractor()).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_supplied_ids_and_note_carried() {
        let body = r#"{
            "customer_name": "Ash",
            "items": [{
                "name": "Rebel Burger",
                "quantity": "two",
                "variation_id": "v1-large",
                "note": "cut in half",
                "modifiers": [
                    { "catalog_object_id": "m1" },
                    { "name": "Bacon", "catalog_object_id": "m2" },
                    { "name": "extra pickles" },
                    {}
                ]
            }]
        }"#;
        let order = normalize(body, &extractor()).unwrap();
        let line = &order.lines[0];

        assert_eq!(line.quantity.get(), 2);
        assert_eq!(line.variation_id.as_deref(), Some("v1-large"));
        assert_eq!(line.note.as_deref(), Some("cut in half"));
        assert_eq!(line.modifier_ids, vec!["m1", "m2"]);
        assert_eq!(line.modifier_phrases, vec!["extra pickles"]);
    }

    #[test]
    fn test_quantity_forms() {
        let body = r#"{ "items": [
            { "name": "A", "quantity": 5 },
            { "name": "B", "quantity": 2.0 },
            { "name": "C", "quantity": "two" },
            { "name": "D", "quantity": -3 },
            { "name": "E" }
        ] }"#;
        let order = normalize(body, &extractor()).unwrap();
        let quantities: Vec<u32> = order.lines.iter().map(|l| l.quantity.get()).collect();
        assert_eq!(quantities, vec![5, 2, 2, 1, 1]);
    }
}

//! Order requests ready to hand to the order API

use crate::lines::ResolvedOrderLine;
use menu_catalog::Money;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A confirmed order, built once and submitted elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Unique per build; lets the order API drop retried submissions
    pub idempotency_key: String,
    pub location_id: String,
    pub line_items: Vec<ResolvedOrderLine>,
    pub customer_name: Option<String>,
    pub source_name: String,
}

impl OrderRequest {
    /// Lines the catalog did not recognise, for a human to review.
    pub fn custom_lines(&self) -> impl Iterator<Item = &ResolvedOrderLine> {
        self.line_items.iter().filter(|line| line.is_custom())
    }

    /// Wire shape accepted by the POS create-order endpoint.
    pub fn to_payload(&self) -> OrderPayload {
        OrderPayload {
            idempotency_key: self.idempotency_key.clone(),
            order: OrderBody {
                location_id: self.location_id.clone(),
                line_items: self.line_items.iter().map(LineItemPayload::from).collect(),
                state: "OPEN".to_string(),
                customer_note: self
                    .customer_name
                    .as_ref()
                    .map(|name| format!("Voice order for {}", name)),
                source: OrderSource {
                    name: self.source_name.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    pub idempotency_key: String,
    pub order: OrderBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBody {
    pub location_id: String,
    pub line_items: Vec<LineItemPayload>,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
    pub source: OrderSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSource {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemPayload {
    /// Positive integer rendered as a string, as the order API expects
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price_money: Option<Money>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub modifiers: Vec<ModifierPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierPayload {
    pub catalog_object_id: String,
}

impl From<&ResolvedOrderLine> for LineItemPayload {
    fn from(line: &ResolvedOrderLine) -> Self {
        match line {
            ResolvedOrderLine::Catalog {
                catalog_object_id,
                quantity,
                modifier_ids,
                note,
                ..
            } => LineItemPayload {
                quantity: quantity.to_string(),
                catalog_object_id: Some(catalog_object_id.clone()),
                name: None,
                base_price_money: None,
                modifiers: modifier_ids
                    .iter()
                    .map(|id| ModifierPayload {
                        catalog_object_id: id.clone(),
                    })
                    .collect(),
                note: note.clone(),
            },
            ResolvedOrderLine::Custom {
                name,
                quantity,
                base_price,
                note,
            } => LineItemPayload {
                quantity: quantity.to_string(),
                catalog_object_id: None,
                name: Some(name.clone()),
                base_price_money: Some(base_price.clone()),
                modifiers: Vec::new(),
                note: note.clone(),
            },
        }
    }
}

/// Assembles resolved lines into [`OrderRequest`]s for one location.
#[derive(Debug, Clone)]
pub struct OrderRequestBuilder {
    location_id: String,
    source_name: String,
}

impl OrderRequestBuilder {
    pub fn new(location_id: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            source_name: "Voice Ordering".to_string(),
        }
    }

    pub fn with_source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    /// Build a request with a fresh idempotency key.
    pub fn build(
        &self,
        line_items: Vec<ResolvedOrderLine>,
        customer_name: Option<&str>,
    ) -> OrderRequest {
        let customer_name = customer_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        let request = OrderRequest {
            idempotency_key: new_idempotency_key(),
            location_id: self.location_id.clone(),
            line_items,
            customer_name,
            source_name: self.source_name.clone(),
        };
        tracing::info!(
            idempotency_key = %request.idempotency_key,
            lines = request.line_items.len(),
            custom_lines = request.custom_lines().count(),
            "order request built"
        );
        request
    }
}

/// Millisecond timestamp plus a random v4 uuid, so concurrent builds in the
/// same millisecond still get distinct keys.
pub fn new_idempotency_key() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("voice-order-{}-{}", millis, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::Quantity;
    use std::collections::HashSet;

    fn lines() -> Vec<ResolvedOrderLine> {
        vec![
            ResolvedOrderLine::Catalog {
                catalog_object_id: "v1".to_string(),
                quantity: Quantity::new(2),
                modifier_ids: vec!["m1".to_string()],
                note: Some("Modifiers: bacon, no onions".to_string()),
                unmatched_modifiers: vec!["no onions".to_string()],
            },
            ResolvedOrderLine::Custom {
                name: "coke".to_string(),
                quantity: Quantity::ONE,
                base_price: Money::new(1000, "CAD"),
                note: None,
            },
        ]
    }

    #[test]
    fn test_build_attaches_customer_and_location() {
        let request = OrderRequestBuilder::new("L1").build(lines(), Some("  Sam "));
        assert_eq!(request.location_id, "L1");
        assert_eq!(request.customer_name.as_deref(), Some("Sam"));
        assert_eq!(request.source_name, "Voice Ordering");
        assert_eq!(request.custom_lines().count(), 1);
        assert!(request.idempotency_key.starts_with("voice-order-"));
    }

    #[test]
    fn test_blank_customer_name_dropped() {
        let request = OrderRequestBuilder::new("L1").build(lines(), Some("   "));
        assert!(request.customer_name.is_none());
        assert!(request.to_payload().order.customer_note.is_none());
    }

    #[test]
    fn test_idempotency_keys_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| (0..250).map(|_| new_idempotency_key()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                assert!(seen.insert(key));
            }
        }
        assert_eq!(seen.len(), 2000);
    }

    #[test]
    fn test_payload_wire_shape() {
        let request = OrderRequestBuilder::new("L1")
            .with_source_name("Burger Rebellion Voice")
            .build(lines(), Some("Sam"));
        let json = serde_json::to_value(request.to_payload()).unwrap();

        assert_eq!(json["idempotency_key"], request.idempotency_key.as_str());
        let order = &json["order"];
        assert_eq!(order["location_id"], "L1");
        assert_eq!(order["state"], "OPEN");
        assert_eq!(order["customer_note"], "Voice order for Sam");
        assert_eq!(order["source"]["name"], "Burger Rebellion Voice");

        let matched = &order["line_items"][0];
        assert_eq!(matched["quantity"], "2");
        assert_eq!(matched["catalog_object_id"], "v1");
        assert_eq!(matched["modifiers"][0]["catalog_object_id"], "m1");
        assert!(matched.get("base_price_money").is_none());

        let custom = &order["line_items"][1];
        assert_eq!(custom["quantity"], "1");
        assert_eq!(custom["name"], "coke");
        assert_eq!(custom["base_price_money"]["amount"], 1000);
        assert_eq!(custom["base_price_money"]["currency"], "CAD");
        assert!(custom.get("modifiers").is_none());
        assert!(custom.get("note").is_none());
    }
}

//! Order line shapes passed between pipeline stages

use crate::lexicon;
use menu_catalog::{normalize_name, Money};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of units on a line. Never below one.
///
/// Deserialization is lenient: numbers, digit strings and number words are
/// accepted, and anything that is not a positive count becomes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    /// Coerce a count into a valid quantity; zero becomes one.
    pub fn new(count: u32) -> Self {
        Self(count.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn merge(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(other.0))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<u32> for Quantity {
    fn from(count: u32) -> Self {
        Self::new(count)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuantityRepr {
    Count(u64),
    Signed(i64),
    Fractional(f64),
    Text(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let count = match QuantityRepr::deserialize(deserializer)? {
            QuantityRepr::Count(n) => u32::try_from(n).ok(),
            QuantityRepr::Fractional(f) if f >= 1.0 && f <= f64::from(u32::MAX) => Some(f as u32),
            QuantityRepr::Text(s) => lexicon::value_of(&s),
            QuantityRepr::Signed(_) | QuantityRepr::Fractional(_) | QuantityRepr::Other(_) => None,
        };
        Ok(Self::new(count.unwrap_or(1)))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate line as captured from speech or a structured payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrderLine {
    pub name: String,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub modifier_phrases: Vec<String>,
    /// Catalog id supplied by an upstream system that already knew the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_object_id: Option<String>,
    /// Specific variation requested for the item, checked against the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<String>,
    /// Modifier catalog ids supplied alongside (or instead of) phrases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifier_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RawOrderLine {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity: Quantity::new(quantity),
            modifier_phrases: Vec::new(),
            catalog_object_id: None,
            variation_id: None,
            modifier_ids: Vec::new(),
            note: None,
        }
    }

    pub fn with_modifiers<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifier_phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_catalog_object_id(mut self, id: impl Into<String>) -> Self {
        self.catalog_object_id = Some(id.into());
        self
    }

    pub fn with_variation_id(mut self, id: impl Into<String>) -> Self {
        self.variation_id = Some(id.into());
        self
    }

    pub fn with_modifier_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifier_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// One merged line per distinct item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOrderLine {
    pub normalized_name: String,
    pub display_name: String,
    pub quantity: Quantity,
    pub modifier_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifier_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<CanonicalOrderLine> for RawOrderLine {
    fn from(line: CanonicalOrderLine) -> Self {
        Self {
            name: line.display_name,
            quantity: line.quantity,
            modifier_phrases: line.modifier_phrases,
            catalog_object_id: line.catalog_object_id,
            variation_id: line.variation_id,
            modifier_ids: line.modifier_ids,
            note: line.note,
        }
    }
}

/// A line ready for the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedOrderLine {
    /// Matched to a catalog variation.
    Catalog {
        catalog_object_id: String,
        quantity: Quantity,
        modifier_ids: Vec<String>,
        note: Option<String>,
        /// Requested modifiers with no catalog counterpart.
        unmatched_modifiers: Vec<String>,
    },
    /// Free-text line for anything the catalog did not know.
    Custom {
        name: String,
        quantity: Quantity,
        base_price: Money,
        note: Option<String>,
    },
}

impl ResolvedOrderLine {
    pub fn quantity(&self) -> Quantity {
        match self {
            ResolvedOrderLine::Catalog { quantity, .. } => *quantity,
            ResolvedOrderLine::Custom { quantity, .. } => *quantity,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            ResolvedOrderLine::Catalog { note, .. } => note.as_deref(),
            ResolvedOrderLine::Custom { note, .. } => note.as_deref(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ResolvedOrderLine::Custom { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_never_zero() {
        assert_eq!(Quantity::new(0).get(), 1);
        assert_eq!(Quantity::from(7u32).get(), 7);
        assert_eq!(Quantity::default(), Quantity::ONE);
    }

    #[test]
    fn test_quantity_merge_saturates() {
        let big = Quantity::new(u32::MAX);
        assert_eq!(big.merge(Quantity::new(3)).get(), u32::MAX);
        assert_eq!(Quantity::new(2).merge(Quantity::new(1)).get(), 3);
    }

    #[test]
    fn test_zero_quantity_deserializes_as_one() {
        let line: RawOrderLine = serde_json::from_str(r#"{"name":"Coke","quantity":0}"#).unwrap();
        assert_eq!(line.quantity, Quantity::ONE);
        assert!(line.modifier_phrases.is_empty());
    }

    #[test]
    fn test_lenient_quantity_forms() {
        let cases = [
            (r#"5"#, 5),
            (r#""2""#, 2),
            (r#""three""#, 3),
            (r#"2.0"#, 2),
            (r#"-1"#, 1),
            (r#"0.5"#, 1),
            (r#""lots""#, 1),
            (r#"null"#, 1),
            (r#"[3]"#, 1),
            (r#"4294967296"#, 1),
        ];
        for (json, expected) in cases {
            let quantity: Quantity = serde_json::from_str(json).unwrap();
            assert_eq!(quantity.get(), expected, "{}", json);
        }
    }

    #[test]
    fn test_structured_items_with_odd_quantities_parse() {
        let lines: Vec<RawOrderLine> = serde_json::from_str(
            r#"[
                { "name": "Fries", "quantity": -1 },
                { "name": "Coke", "quantity": "2", "note": "no ice" },
                { "name": "Burger", "quantity": 2.0, "variation_id": "v1-large",
                  "modifier_ids": ["m1"] }
            ]"#,
        )
        .unwrap();

        let quantities: Vec<u32> = lines.iter().map(|l| l.quantity.get()).collect();
        assert_eq!(quantities, vec![1, 2, 2]);
        assert_eq!(lines[1].note.as_deref(), Some("no ice"));
        assert_eq!(lines[2].variation_id.as_deref(), Some("v1-large"));
        assert_eq!(lines[2].modifier_ids, vec!["m1"]);
    }

    #[test]
    fn test_quantity_serializes_as_number() {
        let json = serde_json::to_value(RawOrderLine::new("Coke", 3)).unwrap();
        assert_eq!(json["quantity"], 3);
        assert!(json.get("note").is_none());
    }
}

use serde::{Deserialize, Serialize};

/// Amount in minor currency units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// Discriminator carried by every object in a catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogObjectType {
    Item,
    ItemVariation,
    Modifier,
    #[serde(other)]
    Other,
}

/// One record of a raw catalog listing as returned by the POS catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogObject {
    #[serde(rename = "type")]
    pub kind: CatalogObjectType,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "itemData", skip_serializing_if = "Option::is_none")]
    pub item_data: Option<ItemData>,
    #[serde(
        default,
        alias = "itemVariationData",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_variation_data: Option<ItemVariationData>,
    #[serde(
        default,
        alias = "modifierData",
        skip_serializing_if = "Option::is_none"
    )]
    pub modifier_data: Option<ModifierData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub variations: Vec<CatalogObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemVariationData {
    #[serde(default, alias = "itemId")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "priceMoney")]
    pub price_money: Option<Money>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "priceMoney")]
    pub price_money: Option<Money>,
}

/// A purchasable SKU under an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationRef {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<Money>,
}

/// An orderable item and its variations, in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub variations: Vec<VariationRef>,
}

impl CatalogEntry {
    /// Id to order this item by: its first variation, or the item itself
    /// when the catalog lists no variations.
    pub fn primary_variation_id(&self) -> &str {
        self.variations
            .first()
            .map(|v| v.id.as_str())
            .unwrap_or(self.id.as_str())
    }

    pub fn has_variation(&self, variation_id: &str) -> bool {
        self.variations.iter().any(|v| v.id == variation_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierEntry {
    pub id: String,
    pub name: String,
    pub price: Option<Money>,
}

/// Best item found for a spoken name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub variation_id: &'a str,
    pub score: i32,
}

/// Lower-cases and trims a name for comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

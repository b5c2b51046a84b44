use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_KNOWN_ITEMS: [&str; 8] = [
    "burger",
    "fries",
    "coke",
    "milkshake",
    "drink",
    "coffee",
    "soda",
    "water",
];

/// Price in minor units given to lines the catalog could not match.
pub const FALLBACK_PRICE_MINOR: i64 = 1000;

/// Settings for turning conversations into order requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Location the orders are placed against
    pub location_id: Option<String>,
    /// Currency for fallback prices
    pub currency: String,
    /// Fallback price for unmatched items, in minor units
    pub fallback_price_minor: i64,
    /// Nouns picked up even when no quantity was spoken
    pub known_items: Vec<String>,
    /// Supplied catalog ids containing this marker are ignored
    pub placeholder_marker: String,
    /// Order source name reported to the POS
    pub source_name: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            location_id: None,
            currency: "CAD".to_string(),
            fallback_price_minor: FALLBACK_PRICE_MINOR,
            known_items: DEFAULT_KNOWN_ITEMS.iter().map(|s| s.to_string()).collect(),
            placeholder_marker: "placeholder".to_string(),
            source_name: "Voice Ordering".to_string(),
        }
    }
}

impl IntakeConfig {
    /// Read a JSON config file, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing config: {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

//! A tradable asset in the fixed allocation basket.

use serde::{Deserialize, Serialize};

/// One asset of the basket with its fixed base weight.
///
/// The base weight is the allocation at full conviction (scalar 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub base_weight: f64,
}

impl Asset {
    pub fn new(symbol: impl Into<String>, base_weight: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            base_weight,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

//! Inventory item documents as stored in the primary store.
//!
//! Items are read-only to the export pipeline. Field names mirror the store
//! documents; nested structures are optional because real documents are
//! frequently partial (missing price, stock, or reviews must never fail a
//! projection downstream).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque store identifier of an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Monetary values, arbitrary precision as delivered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemPrice {
    #[serde(rename = "basePrice")]
    pub base_price: Option<Decimal>,
    #[serde(rename = "sellingPrice")]
    pub selling_price: Option<Decimal>,
}

/// Stock quantities. `availableStock` may arrive as a decimal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockDetails {
    #[serde(rename = "availableStock")]
    pub available_stock: Option<Decimal>,
    #[serde(rename = "unitOfMeasure")]
    pub unit_of_measure: Option<String>,
}

/// A single customer review attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// An inventory item document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,
    #[serde(rename = "itemName")]
    pub item_name: Option<String>,
    /// May be absent or blank; blank means "no category" to the enricher.
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
    #[serde(rename = "itemPrice")]
    pub item_price: Option<ItemPrice>,
    #[serde(rename = "stockDetails")]
    pub stock_details: Option<StockDetails>,
    #[serde(rename = "specialProduct", default)]
    pub special_product: bool,
    #[serde(rename = "review", default)]
    pub reviews: Vec<Review>,
    /// Raw wire string; parsed (and validated) by the change detector.
    #[serde(rename = "lastUpdateDate")]
    pub last_update_date: Option<String>,
}

impl Item {
    /// Minimal item for construction in stores and tests.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            item_name: None,
            category_id: None,
            item_price: None,
            stock_details: None,
            special_product: false,
            reviews: Vec::new(),
            last_update_date: None,
        }
    }
}

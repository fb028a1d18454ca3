//! Pure projection of an enriched item into the three feed records.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use cartfeed_core::UNKNOWN_CATEGORY;

use crate::enrich::EnrichedItem;

/// Trend feed, serialized as XML under an `inventory` root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecord {
    pub category: TrendCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendCategory {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "categoryName")]
    pub category_name: TrendCategoryName,
    pub item: TrendItem,
}

/// Display pair: lowercase name as attribute, uppercase name as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendCategoryName {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "$text")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendItem {
    #[serde(rename = "availableStock")]
    pub available_stock: i64,
    #[serde(rename = "categoryId")]
    pub category_id: String,
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(rename = "sellingPrice")]
    pub selling_price: i64,
}

/// Review feed, serialized as XML under a `reviews` root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    #[serde(rename = "itemId")]
    pub item_id: String,
    #[serde(rename = "review")]
    pub reviews: Vec<ReviewEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewEntry {
    #[serde(rename = "reviewrating", skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(rename = "reviewcomment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Storefront feed, serialized as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "itemName")]
    pub item_name: String,
    #[serde(rename = "categoryName")]
    pub category_name: String,
    #[serde(rename = "specialProduct")]
    pub special_product: bool,
    #[serde(rename = "stockDetails")]
    pub stock_details: StoreStockDetails,
    #[serde(rename = "itemPrice")]
    pub item_price: StorePrice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStockDetails {
    #[serde(rename = "availableStock")]
    pub available_stock: i64,
    #[serde(rename = "unitOfMeasure")]
    pub unit_of_measure: String,
}

/// Prices keep their full decimal precision on the storefront feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorePrice {
    #[serde(rename = "basePrice")]
    pub base_price: Decimal,
    #[serde(rename = "sellingPrice")]
    pub selling_price: Decimal,
}

/// The three records produced for one item in one Run.
///
/// `review` is `None` when the item has no reviews; the review sink treats
/// that as a no-op rather than a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub trend: TrendRecord,
    pub review: Option<ReviewRecord>,
    pub store: StoreRecord,
}

/// Project an enriched item into its three feed records.
///
/// Missing nested structures never fail projection: absent price or stock
/// collapses to zero, absent unit of measure to empty. Integer-typed output
/// fields truncate decimals toward zero; decimal-typed fields keep full
/// precision.
pub fn project(enriched: &EnrichedItem) -> Projection {
    let item = &enriched.item;
    let item_id = item.id.to_string();
    let category_id = match item.category_id.as_deref().map(str::trim) {
        None | Some("") => UNKNOWN_CATEGORY.to_string(),
        Some(raw) => raw.to_string(),
    };

    let available_stock = truncate(
        item.stock_details
            .as_ref()
            .and_then(|stock| stock.available_stock),
    );
    let selling_price = item
        .item_price
        .as_ref()
        .and_then(|price| price.selling_price);

    let trend = TrendRecord {
        category: TrendCategory {
            id: category_id.clone(),
            category_name: TrendCategoryName {
                name: enriched.category_name.to_lowercase(),
                value: enriched.category_name.to_uppercase(),
            },
            item: TrendItem {
                available_stock,
                category_id,
                item_id: item_id.clone(),
                selling_price: truncate(selling_price),
            },
        },
    };

    let review = if item.reviews.is_empty() {
        None
    } else {
        Some(ReviewRecord {
            item_id: item_id.clone(),
            reviews: item
                .reviews
                .iter()
                .map(|review| ReviewEntry {
                    rating: review.rating,
                    comment: review.comment.clone(),
                })
                .collect(),
        })
    };

    let store = StoreRecord {
        id: item_id,
        item_name: item.item_name.clone().unwrap_or_default(),
        category_name: enriched.category_name.clone(),
        special_product: item.special_product,
        stock_details: StoreStockDetails {
            available_stock,
            unit_of_measure: item
                .stock_details
                .as_ref()
                .and_then(|stock| stock.unit_of_measure.clone())
                .unwrap_or_default(),
        },
        item_price: StorePrice {
            base_price: item
                .item_price
                .as_ref()
                .and_then(|price| price.base_price)
                .unwrap_or(Decimal::ZERO),
            selling_price: selling_price.unwrap_or(Decimal::ZERO),
        },
    };

    Projection {
        trend,
        review,
        store,
    }
}

/// Truncation toward zero; out-of-range values collapse to zero.
fn truncate(value: Option<Decimal>) -> i64 {
    value
        .and_then(|value| value.trunc().to_i64())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartfeed_core::{Item, ItemPrice, Review, StockDetails};
    use rust_decimal_macros::dec;

    fn enriched(item: Item, category: &str) -> EnrichedItem {
        EnrichedItem {
            item,
            category_name: category.to_string(),
        }
    }

    fn full_item() -> Item {
        let mut item = Item::new("item-1");
        item.item_name = Some("Desk Lamp".to_string());
        item.category_id = Some("65f1a2b3c4d5e6f708192a3b".to_string());
        item.item_price = Some(ItemPrice {
            base_price: Some(dec!(10.50)),
            selling_price: Some(dec!(12.99)),
        });
        item.stock_details = Some(StockDetails {
            available_stock: Some(dec!(25.7)),
            unit_of_measure: Some("pcs".to_string()),
        });
        item.special_product = true;
        item.reviews = vec![Review {
            rating: Some(4),
            comment: Some("solid".to_string()),
        }];
        item
    }

    #[test]
    fn trend_truncates_decimals_toward_zero() {
        let projection = project(&enriched(full_item(), "Lighting"));
        assert_eq!(projection.trend.category.item.available_stock, 25);
        assert_eq!(projection.trend.category.item.selling_price, 12);
    }

    #[test]
    fn trend_category_display_pair() {
        let projection = project(&enriched(full_item(), "Lighting"));
        assert_eq!(projection.trend.category.category_name.name, "lighting");
        assert_eq!(projection.trend.category.category_name.value, "LIGHTING");
        assert_eq!(projection.trend.category.id, "65f1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn storefront_preserves_decimal_precision() {
        let projection = project(&enriched(full_item(), "Lighting"));
        assert_eq!(projection.store.item_price.base_price, dec!(10.50));
        assert_eq!(projection.store.item_price.selling_price, dec!(12.99));
        assert_eq!(projection.store.stock_details.available_stock, 25);
        assert_eq!(projection.store.stock_details.unit_of_measure, "pcs");
        assert!(projection.store.special_product);
    }

    #[test]
    fn empty_reviews_project_to_none() {
        let mut item = full_item();
        item.reviews.clear();
        let projection = project(&enriched(item, "Lighting"));
        assert!(projection.review.is_none());
    }

    #[test]
    fn reviews_carry_over_in_order() {
        let mut item = full_item();
        item.reviews.push(Review {
            rating: None,
            comment: Some("meh".to_string()),
        });
        let projection = project(&enriched(item, "Lighting"));
        let record = projection.review.unwrap();
        assert_eq!(record.item_id, "item-1");
        assert_eq!(record.reviews.len(), 2);
        assert_eq!(record.reviews[0].rating, Some(4));
        assert_eq!(record.reviews[1].rating, None);
    }

    #[test]
    fn bare_item_projects_with_defaults() {
        let projection = project(&enriched(Item::new("bare"), "unknown"));

        assert_eq!(projection.trend.category.id, "unknown");
        assert_eq!(projection.trend.category.item.category_id, "unknown");
        assert_eq!(projection.trend.category.item.available_stock, 0);
        assert_eq!(projection.trend.category.item.selling_price, 0);

        assert!(projection.review.is_none());

        assert_eq!(projection.store.item_name, "");
        assert_eq!(projection.store.item_price.base_price, Decimal::ZERO);
        assert_eq!(projection.store.item_price.selling_price, Decimal::ZERO);
        assert_eq!(projection.store.stock_details.unit_of_measure, "");
    }

    #[test]
    fn negative_quantities_truncate_toward_zero() {
        assert_eq!(truncate(Some(dec!(-3.9))), -3);
        assert_eq!(truncate(Some(dec!(0.999))), 0);
        assert_eq!(truncate(None), 0);
    }
}

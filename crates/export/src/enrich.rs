//! Category enrichment of eligible items.

use std::sync::Arc;

use tracing::debug;

use cartfeed_core::{CategoryRef, Item, UNKNOWN_CATEGORY};
use cartfeed_store::{ItemStore, StoreError};

/// An item paired with its resolved category name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedItem {
    pub item: Item,
    pub category_name: String,
}

/// Resolves category names against the primary store.
pub struct Enricher<S> {
    store: Arc<S>,
}

impl<S> Clone for Enricher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ItemStore> Enricher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve the item's category name.
    ///
    /// A missing or blank `categoryId` resolves to [`UNKNOWN_CATEGORY`]
    /// without touching the store. A lookup that finds no category, or a
    /// category with an empty name, also resolves to unknown. Transient and
    /// hard store failures propagate; the caller decides whether the item
    /// fails this Run.
    pub async fn enrich(&self, item: Item) -> Result<EnrichedItem, StoreError> {
        let category_name = match item.category_id.as_deref().map(str::trim) {
            None | Some("") => UNKNOWN_CATEGORY.to_string(),
            Some(raw) => {
                let category_ref = CategoryRef::parse(raw);
                let resolved = self
                    .store
                    .find_category(&category_ref)
                    .await?
                    .and_then(|category| category.category_name)
                    .filter(|name| !name.trim().is_empty());
                match resolved {
                    Some(name) => name,
                    None => {
                        debug!(
                            item_id = %item.id,
                            category_ref = %category_ref.as_str(),
                            "category not found, using unknown"
                        );
                        UNKNOWN_CATEGORY.to_string()
                    }
                }
            }
        };

        Ok(EnrichedItem {
            item,
            category_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartfeed_core::Category;
    use cartfeed_store::{InMemoryStore, StoreError};

    fn item_with_category(id: &str, category_id: Option<&str>) -> Item {
        let mut item = Item::new(id);
        item.category_id = category_id.map(str::to_string);
        item
    }

    #[tokio::test]
    async fn resolves_known_category_by_object_ref() {
        let store = Arc::new(InMemoryStore::new());
        let hex = "507f1f77bcf86cd799439011";
        store.insert_category(CategoryRef::parse(hex), Category::named("Electronics"));

        let enricher = Enricher::new(store);
        let enriched = enricher
            .enrich(item_with_category("a", Some(hex)))
            .await
            .unwrap();
        assert_eq!(enriched.category_name, "Electronics");
    }

    #[tokio::test]
    async fn resolves_literal_category_key() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_category(CategoryRef::parse("groceries"), Category::named("Groceries"));

        let enricher = Enricher::new(store);
        let enriched = enricher
            .enrich(item_with_category("a", Some("groceries")))
            .await
            .unwrap();
        assert_eq!(enriched.category_name, "Groceries");
    }

    #[tokio::test]
    async fn blank_category_id_skips_the_store_entirely() {
        let store = Arc::new(InMemoryStore::new());
        // A scripted failure would surface if any query were issued.
        store.fail_next(StoreError::connection("unreachable"));

        let enricher = Enricher::new(store);
        for category_id in [None, Some(""), Some("   ")] {
            let enriched = enricher
                .enrich(item_with_category("a", category_id))
                .await
                .unwrap();
            assert_eq!(enriched.category_name, UNKNOWN_CATEGORY);
        }
    }

    #[tokio::test]
    async fn unresolved_and_empty_names_fall_back_to_unknown() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_category(CategoryRef::parse("blank"), Category::named("  "));

        let enricher = Enricher::new(store);
        let missing = enricher
            .enrich(item_with_category("a", Some("nowhere")))
            .await
            .unwrap();
        assert_eq!(missing.category_name, UNKNOWN_CATEGORY);

        let empty = enricher
            .enrich(item_with_category("b", Some("blank")))
            .await
            .unwrap();
        assert_eq!(empty.category_name, UNKNOWN_CATEGORY);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_next(StoreError::timeout("lookup timed out"));

        let enricher = Enricher::new(store);
        let err = enricher
            .enrich(item_with_category("a", Some("anything")))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}

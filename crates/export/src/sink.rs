//! Output sinks: encoding and destination writes.
//!
//! Every destination entry is named deterministically from the item id, so
//! re-writing an item is an overwrite, never a duplicate.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use cartfeed_core::ItemId;

use crate::project::{ReviewRecord, StoreRecord, TrendRecord};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// The three output destinations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Trend,
    Review,
    Storefront,
}

impl SinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkKind::Trend => "trend",
            SinkKind::Review => "review",
            SinkKind::Storefront => "storefront",
        }
    }

    /// Deterministic destination name for an item on this sink.
    pub fn file_name(self, item_id: &ItemId) -> String {
        match self {
            SinkKind::Trend => format!("trend_{item_id}.xml"),
            SinkKind::Review => format!("review_{item_id}.xml"),
            SinkKind::Storefront => format!("storefront_{item_id}.json"),
        }
    }
}

/// Hard failure of a sink write or record encoding.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink rejected write: {0}")]
    Rejected(String),
}

impl SinkError {
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// One destination accepting encoded records keyed by item id.
#[async_trait]
pub trait RecordSink: Send + Sync {
    fn kind(&self) -> SinkKind;

    /// Persist the payload under the item's deterministic destination name,
    /// overwriting any previous entry for the same item.
    async fn write(&self, item_id: &ItemId, payload: &[u8]) -> Result<(), SinkError>;
}

pub fn encode_trend(record: &TrendRecord) -> Result<Vec<u8>, SinkError> {
    encode_xml("inventory", record)
}

pub fn encode_review(record: &ReviewRecord) -> Result<Vec<u8>, SinkError> {
    encode_xml("reviews", record)
}

pub fn encode_store(record: &StoreRecord) -> Result<Vec<u8>, SinkError> {
    serde_json::to_vec_pretty(record).map_err(|err| SinkError::encode(err.to_string()))
}

fn encode_xml<T: Serialize>(root: &str, record: &T) -> Result<Vec<u8>, SinkError> {
    let body = quick_xml::se::to_string_with_root(root, record)
        .map_err(|err| SinkError::encode(err.to_string()))?;
    let mut out = String::with_capacity(XML_DECLARATION.len() + body.len());
    out.push_str(XML_DECLARATION);
    out.push_str(&body);
    Ok(out.into_bytes())
}

/// Filesystem-backed sink writing one file per item under a fixed directory.
pub struct FileSink {
    kind: SinkKind,
    dir: PathBuf,
}

impl FileSink {
    pub fn new(kind: SinkKind, dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl RecordSink for FileSink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    async fn write(&self, item_id: &ItemId, payload: &[u8]) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(self.kind.file_name(item_id));
        tokio::fs::write(&path, payload).await?;
        debug!(sink = self.kind.as_str(), path = %path.display(), "wrote record");
        Ok(())
    }
}

#[derive(Default)]
struct MemorySinkInner {
    contents: HashMap<String, Vec<u8>>,
    fail_once: HashMap<String, u32>,
    writes: u64,
}

/// In-memory sink for tests.
///
/// Failures are scripted per item with [`MemorySink::fail_writes`]; each
/// scripted count fails that many subsequent writes for the item before
/// writes succeed again.
pub struct MemorySink {
    kind: SinkKind,
    inner: Mutex<MemorySinkInner>,
}

impl MemorySink {
    pub fn new(kind: SinkKind) -> Self {
        Self {
            kind,
            inner: Mutex::new(MemorySinkInner::default()),
        }
    }

    /// Script the next `count` writes for `item_id` to fail.
    pub fn fail_writes(&self, item_id: &ItemId, count: u32) {
        self.lock().fail_once.insert(item_id.to_string(), count);
    }

    /// Stored payload for an item, if any write succeeded.
    pub fn payload_for(&self, item_id: &ItemId) -> Option<Vec<u8>> {
        let name = self.kind.file_name(item_id);
        self.lock().contents.get(&name).cloned()
    }

    /// Total write attempts, including failed ones.
    pub fn write_count(&self) -> u64 {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySinkInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    async fn write(&self, item_id: &ItemId, payload: &[u8]) -> Result<(), SinkError> {
        let mut inner = self.lock();
        inner.writes += 1;
        if let Some(remaining) = inner.fail_once.get_mut(item_id.as_str()) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SinkError::rejected(format!(
                    "scripted failure for {item_id}"
                )));
            }
        }
        let name = self.kind.file_name(item_id);
        inner.contents.insert(name, payload.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichedItem;
    use crate::project::project;
    use cartfeed_core::{Item, ItemPrice, Review, StockDetails};
    use rust_decimal_macros::dec;

    fn sample_projection() -> crate::project::Projection {
        let mut item = Item::new("item-1");
        item.item_name = Some("Desk Lamp".to_string());
        item.category_id = Some("cat-9".to_string());
        item.item_price = Some(ItemPrice {
            base_price: Some(dec!(10.50)),
            selling_price: Some(dec!(12.99)),
        });
        item.stock_details = Some(StockDetails {
            available_stock: Some(dec!(25)),
            unit_of_measure: Some("pcs".to_string()),
        });
        item.reviews = vec![Review {
            rating: Some(4),
            comment: Some("solid".to_string()),
        }];
        project(&EnrichedItem {
            item,
            category_name: "Lighting".to_string(),
        })
    }

    #[test]
    fn trend_xml_shape() {
        let projection = sample_projection();
        let xml = String::from_utf8(encode_trend(&projection.trend).unwrap()).unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<inventory><category id=\"cat-9\">"));
        assert!(xml.contains("<categoryName name=\"lighting\">LIGHTING</categoryName>"));
        assert!(xml.contains("<availableStock>25</availableStock>"));
        assert!(xml.contains("<sellingPrice>12</sellingPrice>"));
        assert!(xml.contains("<itemId>item-1</itemId>"));
        assert!(xml.ends_with("</inventory>"));
    }

    #[test]
    fn review_xml_shape() {
        let projection = sample_projection();
        let record = projection.review.unwrap();
        let xml = String::from_utf8(encode_review(&record).unwrap()).unwrap();

        assert!(xml.contains("<reviews><itemId>item-1</itemId>"));
        assert!(xml.contains("<review><reviewrating>4</reviewrating>"));
        assert!(xml.contains("<reviewcomment>solid</reviewcomment>"));
    }

    #[test]
    fn storefront_json_shape() {
        let projection = sample_projection();
        let json: serde_json::Value =
            serde_json::from_slice(&encode_store(&projection.store).unwrap()).unwrap();

        assert_eq!(json["_id"], "item-1");
        assert_eq!(json["itemName"], "Desk Lamp");
        assert_eq!(json["categoryName"], "Lighting");
        assert_eq!(json["stockDetails"]["availableStock"], 25);
        assert_eq!(json["itemPrice"]["sellingPrice"], "12.99");
    }

    #[test]
    fn file_names_are_deterministic_per_sink() {
        let id = ItemId::new("a1");
        assert_eq!(SinkKind::Trend.file_name(&id), "trend_a1.xml");
        assert_eq!(SinkKind::Review.file_name(&id), "review_a1.xml");
        assert_eq!(SinkKind::Storefront.file_name(&id), "storefront_a1.json");
    }

    #[tokio::test]
    async fn memory_sink_overwrites_per_item() {
        let sink = MemorySink::new(SinkKind::Trend);
        let id = ItemId::new("a");
        sink.write(&id, b"first").await.unwrap();
        sink.write(&id, b"second").await.unwrap();

        assert_eq!(sink.payload_for(&id).unwrap(), b"second");
        assert_eq!(sink.write_count(), 2);
    }

    #[tokio::test]
    async fn memory_sink_scripted_failures_then_recovers() {
        let sink = MemorySink::new(SinkKind::Review);
        let id = ItemId::new("a");
        sink.fail_writes(&id, 1);

        assert!(sink.write(&id, b"x").await.is_err());
        assert!(sink.payload_for(&id).is_none());
        assert!(sink.write(&id, b"x").await.is_ok());
        assert_eq!(sink.payload_for(&id).unwrap(), b"x");
    }

    #[tokio::test]
    async fn file_sink_writes_and_overwrites() {
        let dir = std::env::temp_dir().join(format!("cartfeed-sink-{}", std::process::id()));
        let sink = FileSink::new(SinkKind::Storefront, &dir);
        let id = ItemId::new("a");

        sink.write(&id, b"{\"v\":1}").await.unwrap();
        sink.write(&id, b"{\"v\":2}").await.unwrap();

        let path = dir.join("storefront_a.json");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"{\"v\":2}");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}

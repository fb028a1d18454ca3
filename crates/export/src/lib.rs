//! `cartfeed-export`: the incremental change-export pipeline.
//!
//! On a fixed period, a Run loads the per-item checkpoint map, queries the
//! primary store for changed items, enriches each eligible item with its
//! category, projects it into three feed records (trend XML, review XML,
//! storefront JSON), writes the three records through rate-limited sinks,
//! and advances the item's checkpoint only when no sink reported a hard
//! failure. Failed items keep their old checkpoint and are retried on the
//! next Run; sink writes are overwrite-idempotent, so re-processing is safe.

pub mod checkpoint;
pub mod config;
pub mod detect;
pub mod enrich;
pub mod limiter;
pub mod project;
pub mod run;
pub mod scheduler;
pub mod sink;


pub use checkpoint::build_checkpoint_map;
pub use config::{ConfigError, ExportConfig};
pub use detect::{Eligibility, FilterOutcome, filter_eligible, query_lower_bound};
pub use enrich::{EnrichedItem, Enricher};
pub use limiter::{RateLimiter, RateQuota};
pub use project::{Projection, ReviewRecord, StoreRecord, TrendRecord, project};
pub use run::{Pipeline, RunError, RunReport, SinkSet};
pub use scheduler::{ExportScheduler, SchedulerHandle};
pub use sink::{FileSink, MemorySink, RecordSink, SinkError, SinkKind};

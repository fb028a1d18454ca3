//! One export Run: load checkpoints, detect changes, fan out per item.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use cartfeed_core::{Item, ItemId, Timestamp};
use cartfeed_store::{CheckpointStore, ItemStore, StoreError};

use crate::checkpoint::build_checkpoint_map;
use crate::detect::{filter_eligible, query_lower_bound};
use crate::enrich::Enricher;
use crate::limiter::{RateLimiter, RateQuota};
use crate::project::project;
use crate::sink::{RecordSink, SinkError, encode_review, encode_store, encode_trend};

/// Pipeline-level failure aborting a whole Run before any item processing.
///
/// Item-level failures never surface here; they are counted in the
/// [`RunReport`] and retried on the next Run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to load checkpoints: {0}")]
    CheckpointLoad(#[source] StoreError),

    #[error("failed to query items: {0}")]
    ItemQuery(#[source] StoreError),
}

/// Outcome counters for one Run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub eligible: usize,
    pub not_eligible: usize,
    pub malformed: usize,
    pub exported: usize,
    pub failed: usize,
}

/// A sink paired with its Run-wide rate limiter.
#[derive(Clone)]
struct SinkHandle {
    sink: Arc<dyn RecordSink>,
    limiter: Arc<RateLimiter>,
}

impl SinkHandle {
    /// Acquire a limiter slot and write. `None` payload is a no-op: the
    /// record had nothing to say for this sink, which is not a failure.
    async fn write(&self, item_id: &ItemId, payload: Option<&[u8]>) -> Result<(), SinkError> {
        let Some(bytes) = payload else {
            return Ok(());
        };
        self.limiter.acquire().await;
        self.sink.write(item_id, bytes).await
    }
}

/// The three destinations of a Run, each with its own write quota.
#[derive(Clone)]
pub struct SinkSet {
    trend: SinkHandle,
    review: SinkHandle,
    storefront: SinkHandle,
}

impl SinkSet {
    pub fn new(
        trend: Arc<dyn RecordSink>,
        review: Arc<dyn RecordSink>,
        storefront: Arc<dyn RecordSink>,
        quota: RateQuota,
    ) -> Self {
        let handle = |sink| SinkHandle {
            sink,
            limiter: Arc::new(RateLimiter::new(quota)),
        };
        Self {
            trend: handle(trend),
            review: handle(review),
            storefront: handle(storefront),
        }
    }
}

/// The export pipeline over a primary store and a sink set.
pub struct Pipeline<S> {
    store: Arc<S>,
    enricher: Enricher<S>,
    sinks: SinkSet,
    workers: usize,
}

impl<S> Pipeline<S>
where
    S: ItemStore + CheckpointStore + 'static,
{
    pub fn new(store: Arc<S>, sinks: SinkSet, workers: usize) -> Self {
        Self {
            enricher: Enricher::new(Arc::clone(&store)),
            store,
            sinks,
            workers: workers.max(1),
        }
    }

    /// Execute one Run to completion.
    ///
    /// The Run timestamp is taken once at the start and becomes the new
    /// checkpoint value for every item committed in this Run. Cancelling the
    /// returned future aborts in-flight items before their commit, so a
    /// cancelled item keeps its prior checkpoint.
    pub async fn run_once(&self) -> Result<RunReport, RunError> {
        let run_ts = Timestamp::now();

        let raw_checkpoints = self
            .store
            .load_all()
            .await
            .map_err(RunError::CheckpointLoad)?;
        let checkpoints = build_checkpoint_map(raw_checkpoints);

        let bound = query_lower_bound(&checkpoints);
        let items = self
            .store
            .find_items(bound)
            .await
            .map_err(RunError::ItemQuery)?;

        let fetched = items.len();
        let outcome = filter_eligible(items, &checkpoints);
        let mut report = RunReport {
            fetched,
            eligible: outcome.eligible.len(),
            not_eligible: outcome.not_eligible,
            malformed: outcome.malformed,
            ..RunReport::default()
        };

        info!(
            fetched = report.fetched,
            eligible = report.eligible,
            skipped = report.not_eligible,
            malformed = report.malformed,
            "run started"
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        for item in outcome.eligible {
            let semaphore = Arc::clone(&semaphore);
            let store = Arc::clone(&self.store);
            let enricher = self.enricher.clone();
            let sinks = self.sinks.clone();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return false,
                };
                process_item(item, run_ts, &enricher, &sinks, store.as_ref()).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => report.exported += 1,
                Ok(false) => report.failed += 1,
                Err(err) => {
                    error!(error = %err, "item task aborted");
                    report.failed += 1;
                }
            }
        }

        info!(
            exported = report.exported,
            failed = report.failed,
            "run finished"
        );
        Ok(report)
    }
}

/// Process one eligible item end to end; `true` means its checkpoint was
/// advanced.
async fn process_item<S: ItemStore + CheckpointStore>(
    item: Item,
    run_ts: Timestamp,
    enricher: &Enricher<S>,
    sinks: &SinkSet,
    store: &S,
) -> bool {
    let item_id = item.id.clone();

    let enriched = match enricher.enrich(item).await {
        Ok(enriched) => enriched,
        Err(err) => {
            warn!(item_id = %item_id, error = %err, "enrichment failed, item deferred");
            return false;
        }
    };

    let projection = project(&enriched);
    let trend = encode_trend(&projection.trend);
    let review = projection.review.as_ref().map(encode_review).transpose();
    let storefront = encode_store(&projection.store);
    let (trend, review, storefront) = match (trend, review, storefront) {
        (Ok(t), Ok(r), Ok(s)) => (t, r, s),
        (t, r, s) => {
            for err in [t.err(), r.err(), s.err()].into_iter().flatten() {
                warn!(item_id = %item_id, error = %err, "record encoding failed");
            }
            return false;
        }
    };

    // All three writes are dispatched together; the commit decision waits
    // for every attempt to finish.
    let (trend_res, review_res, store_res) = tokio::join!(
        sinks.trend.write(&item_id, Some(&trend)),
        sinks.review.write(&item_id, review.as_deref()),
        sinks.storefront.write(&item_id, Some(&storefront)),
    );

    let mut committed = true;
    for (sink, result) in [
        ("trend", trend_res),
        ("review", review_res),
        ("storefront", store_res),
    ] {
        if let Err(err) = result {
            warn!(item_id = %item_id, sink, error = %err, "sink write failed");
            committed = false;
        }
    }
    if !committed {
        return false;
    }

    match store.upsert(&item_id, &run_ts).await {
        Ok(()) => true,
        Err(err) => {
            warn!(item_id = %item_id, error = %err, "checkpoint commit failed, item deferred");
            false
        }
    }
}

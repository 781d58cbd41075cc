use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tally_model::{LedgerRecord, MediaType, RequestId, TitleMeta};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::providers::MetaProvider;
use crate::store::{LedgerStore, StoreError};

/// Failures a tracking operation can surface. Validation rejections are
/// not failures; see [`TrackOutcome::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// The ledger could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a tracking operation did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// First accepted request for this identifier; a record was created.
    Created,
    /// An existing record got another hit.
    Updated,
    /// Episode identifier absent from the title's known episode list; the
    /// ledger was not touched.
    Rejected,
}

/// Orchestrates validate → aggregate → enrich → persist for one request.
pub struct RequestTracker {
    provider: Arc<dyn MetaProvider>,
    store: LedgerStore,
    /// Serializes every load-mutate-save cycle. Without it, two concurrent
    /// operations can load the same ledger snapshot and the second save
    /// silently drops the first one's update.
    write_gate: Mutex<()>,
}

impl fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTracker")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl RequestTracker {
    /// Build a tracker over a metadata provider and a ledger store.
    pub fn new(provider: Arc<dyn MetaProvider>, store: LedgerStore) -> Self {
        Self {
            provider,
            store,
            write_gate: Mutex::new(()),
        }
    }

    /// Fire-and-forget entry point: outcomes and failures are logged,
    /// nothing propagates to the caller.
    pub async fn track(&self, media_type: MediaType, full_id: &str) {
        match self.apply(media_type, full_id).await {
            Ok(outcome) => debug!(%full_id, ?outcome, "request tracked"),
            Err(err) => error!(%full_id, error = %err, "request tracking failed"),
        }
    }

    /// Run one full tracking operation and report what happened.
    pub async fn apply(
        &self,
        media_type: MediaType,
        full_id: &str,
    ) -> Result<TrackOutcome, TrackError> {
        let id = RequestId::new(full_id);

        // Episode-shaped identifiers are checked against the title's known
        // episode list before they may touch the ledger. An unknown title
        // fails open: missing metadata cannot prove an episode invalid.
        let mut snapshot: Option<TitleMeta> = None;
        if id.is_episode() {
            match self.provider.lookup(media_type, id.content_id()).await {
                Some(meta) if !meta.has_episode(id.full()) => {
                    debug!(full_id = %id.full(), "episode not in known episode list, dropped");
                    return Ok(TrackOutcome::Rejected);
                }
                known => snapshot = known,
            }
        }

        let _gate = self.write_gate.lock().await;

        let mut ledger = self.store.load().await?;
        let now = Utc::now();

        let outcome = match ledger.iter_mut().find(|record| record.full_id == id.full()) {
            Some(record) => {
                record.register_hit(now);
                if record.needs_enrichment()
                    && let Some(meta) = self.resolve_meta(snapshot, media_type, &id).await
                {
                    record.absorb(&meta);
                }
                TrackOutcome::Updated
            }
            None => {
                let meta = self.resolve_meta(snapshot, media_type, &id).await;
                ledger.push(LedgerRecord::new(media_type, &id, meta.as_ref(), now));
                TrackOutcome::Created
            }
        };

        self.store.save(&ledger).await?;
        Ok(outcome)
    }

    /// Reuse the validation snapshot when there is one; otherwise do the
    /// single enrichment lookup.
    async fn resolve_meta(
        &self,
        snapshot: Option<TitleMeta>,
        media_type: MediaType,
        id: &RequestId,
    ) -> Option<TitleMeta> {
        match snapshot {
            Some(meta) => Some(meta),
            None => self.provider.lookup(media_type, id.content_id()).await,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MediaType, RequestId};

/// Transient result of a metadata lookup. Lives for a single tracking
/// operation and is never persisted or cached across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleMeta {
    /// Human-readable title name.
    pub name: Option<String>,
    /// Release year, or the service's human-readable release-info string
    /// when no explicit year exists.
    pub year: Option<String>,
    /// Poster image URL.
    pub poster: Option<String>,
    /// Full identifiers of every known episode, in service order. Empty for
    /// movies and for titles the service has no episode data for.
    pub episode_ids: Vec<String>,
}

impl TitleMeta {
    /// Whether `full_id` names an episode the metadata service knows about.
    pub fn has_episode(&self, full_id: &str) -> bool {
        self.episode_ids.iter().any(|id| id == full_id)
    }
}

/// One aggregated demand record per distinct full identifier.
///
/// A record exists only if validation accepted at least one request for it;
/// `hit_count` equals the number of accepted requests for the exact full
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    /// Content kind the request was made under.
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Base title id shared by all episodes of the same title.
    pub content_id: String,
    /// Unique ledger key.
    pub full_id: String,
    /// Title name, filled opportunistically.
    pub name: Option<String>,
    /// Release year or release-info string, filled opportunistically.
    pub year: Option<String>,
    /// Poster URL, filled opportunistically.
    pub poster: Option<String>,
    /// When the identifier was first accepted.
    pub first_seen_at: DateTime<Utc>,
    /// When the identifier was most recently accepted.
    pub last_seen_at: DateTime<Utc>,
    /// Number of accepted requests, starting at 1.
    pub hit_count: u64,
}

impl LedgerRecord {
    /// Create the record for a newly accepted identifier.
    pub fn new(
        media_type: MediaType,
        id: &RequestId,
        meta: Option<&TitleMeta>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut record = Self {
            media_type,
            content_id: id.content_id().to_string(),
            full_id: id.full().to_string(),
            name: None,
            year: None,
            poster: None,
            first_seen_at: now,
            last_seen_at: now,
            hit_count: 1,
        };
        if let Some(meta) = meta {
            record.absorb(meta);
        }
        record
    }

    /// Register another accepted request for this identifier.
    pub fn register_hit(&mut self, now: DateTime<Utc>) {
        self.last_seen_at = now;
        self.hit_count += 1;
    }

    /// Whether the record still lacks human-readable metadata.
    pub fn needs_enrichment(&self) -> bool {
        self.name.is_none()
    }

    /// Fill the metadata fields from a lookup snapshot.
    pub fn absorb(&mut self, meta: &TitleMeta) {
        self.name = meta.name.clone();
        self.year = meta.year.clone();
        self.poster = meta.poster.clone();
    }
}

//! Metadata lookup providers.

mod cinemeta;

pub use cinemeta::{CinemetaProvider, DEFAULT_CINEMETA_URL, ProviderError};

use async_trait::async_trait;
use tally_model::{MediaType, TitleMeta};

/// Read-only metadata source consulted during validation and enrichment.
///
/// `None` means the lookup could not be completed (service unreachable,
/// error status, malformed payload) or the service does not know the id.
/// Callers must treat that as "unknown": it degrades enrichment quality
/// and is never proof that an identifier is invalid.
#[async_trait]
pub trait MetaProvider: Send + Sync {
    /// Fetch title metadata and the known episode list for a content id.
    async fn lookup(&self, media_type: MediaType, content_id: &str) -> Option<TitleMeta>;
}

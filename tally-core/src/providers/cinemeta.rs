use async_trait::async_trait;
use serde::Deserialize;
use tally_model::{MediaType, TitleMeta};
use tracing::debug;

use super::MetaProvider;

/// Public catalog service queried for title names and episode lists.
pub const DEFAULT_CINEMETA_URL: &str = "https://v3-cinemeta.strem.io";

/// Failure modes of a single metadata lookup. These never leave the
/// provider as errors ([`MetaProvider::lookup`] degrades them all to
/// `None`); they only make the debug log tell failures apart.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The service answered with a non-success status.
    #[error("metadata service returned {0}")]
    Status(reqwest::StatusCode),

    /// The response parsed but carried no metadata document.
    #[error("metadata document missing from response")]
    MissingMeta,

    /// Transport failure or undecodable payload.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Client for the Cinemeta metadata endpoint.
///
/// One GET per lookup, no retries, default client timeout.
#[derive(Debug, Clone)]
pub struct CinemetaProvider {
    client: reqwest::Client,
    base_url: String,
}

impl CinemetaProvider {
    /// Build a provider against `base_url` (trailing slash tolerated).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn try_lookup(
        &self,
        media_type: MediaType,
        content_id: &str,
    ) -> Result<TitleMeta, ProviderError> {
        let url = format!(
            "{}/meta/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            media_type,
            content_id
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status()));
        }

        let payload: MetaPayload = response.json().await?;
        let meta = payload.meta.ok_or(ProviderError::MissingMeta)?;

        Ok(TitleMeta {
            name: meta.name,
            // Some older entries have no year field, only the
            // human-readable release-info string.
            year: meta.year.or(meta.release_info),
            poster: meta.poster,
            episode_ids: meta
                .videos
                .into_iter()
                .filter_map(|video| video.id)
                .collect(),
        })
    }
}

#[async_trait]
impl MetaProvider for CinemetaProvider {
    async fn lookup(&self, media_type: MediaType, content_id: &str) -> Option<TitleMeta> {
        match self.try_lookup(media_type, content_id).await {
            Ok(meta) => Some(meta),
            Err(err) => {
                debug!(%content_id, error = %err, "metadata lookup failed, treating as unknown");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetaPayload {
    meta: Option<MetaDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaDocument {
    name: Option<String>,
    #[serde(default, deserialize_with = "year_string")]
    year: Option<String>,
    release_info: Option<String>,
    poster: Option<String>,
    #[serde(default)]
    videos: Vec<VideoEntry>,
}

#[derive(Debug, Deserialize)]
struct VideoEntry {
    id: Option<String>,
}

/// Cinemeta serves `year` as a string for most titles but as a bare number
/// for a few older ones.
fn year_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;

    /// Serve a fixed body on every meta route and return the base URL.
    async fn serve_fixture(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/meta/{media_type}/{id}",
            get(move || async move {
                (
                    status,
                    [(axum::http::header::CONTENT_TYPE, "application/json")],
                    body,
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn parses_full_metadata_document() {
        let base = serve_fixture(
            StatusCode::OK,
            r#"{"meta":{"name":"The Wire","year":"2002-2008","poster":"https://img/p.jpg",
                "videos":[{"id":"tt0306414:1:1"},{"id":"tt0306414:1:2"}]}}"#,
        )
        .await;

        let provider = CinemetaProvider::new(base);
        let meta = provider.lookup(MediaType::Series, "tt0306414").await.unwrap();

        assert_eq!(meta.name.as_deref(), Some("The Wire"));
        assert_eq!(meta.year.as_deref(), Some("2002-2008"));
        assert_eq!(meta.poster.as_deref(), Some("https://img/p.jpg"));
        assert_eq!(meta.episode_ids, vec!["tt0306414:1:1", "tt0306414:1:2"]);
        assert!(meta.has_episode("tt0306414:1:2"));
        assert!(!meta.has_episode("tt0306414:1:99"));
    }

    #[tokio::test]
    async fn year_falls_back_to_release_info() {
        let base = serve_fixture(
            StatusCode::OK,
            r#"{"meta":{"name":"Old Show","releaseInfo":"1964-1967"}}"#,
        )
        .await;

        let provider = CinemetaProvider::new(base);
        let meta = provider.lookup(MediaType::Series, "tt0057730").await.unwrap();

        assert_eq!(meta.year.as_deref(), Some("1964-1967"));
        assert!(meta.episode_ids.is_empty());
    }

    #[tokio::test]
    async fn numeric_year_is_accepted() {
        let base = serve_fixture(
            StatusCode::OK,
            r#"{"meta":{"name":"Some Movie","year":1994}}"#,
        )
        .await;

        let provider = CinemetaProvider::new(base);
        let meta = provider.lookup(MediaType::Movie, "tt0111161").await.unwrap();

        assert_eq!(meta.year.as_deref(), Some("1994"));
    }

    #[tokio::test]
    async fn error_status_degrades_to_unknown() {
        let base = serve_fixture(StatusCode::NOT_FOUND, r#"{"error":"not found"}"#).await;

        let provider = CinemetaProvider::new(base);
        assert!(provider.lookup(MediaType::Series, "tt0000000").await.is_none());
    }

    #[tokio::test]
    async fn malformed_payload_degrades_to_unknown() {
        let base = serve_fixture(StatusCode::OK, "not json at all").await;

        let provider = CinemetaProvider::new(base);
        assert!(provider.lookup(MediaType::Series, "tt0306414").await.is_none());
    }

    #[tokio::test]
    async fn missing_meta_document_degrades_to_unknown() {
        let base = serve_fixture(StatusCode::OK, r#"{"meta":null}"#).await;

        let provider = CinemetaProvider::new(base);
        assert!(provider.lookup(MediaType::Series, "tt0306414").await.is_none());
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_unknown() {
        // Nothing listens on the substituted port.
        let provider = CinemetaProvider::new("http://127.0.0.1:1");
        assert!(provider.lookup(MediaType::Movie, "tt0111161").await.is_none());
    }
}

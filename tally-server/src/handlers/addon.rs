use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tally_model::MediaType;
use tracing::{debug, warn};

use crate::state::AppState;

/// The manifest is static; let clients keep it for a day.
const MANIFEST_CACHE_CONTROL: &str = "max-age=86400";
/// Stream responses must never be cached or tracking would only ever see
/// the first request per client.
const STREAM_CACHE_CONTROL: &str = "max-age=0, no-cache";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resources: &'static [&'static str],
    pub types: &'static [&'static str],
    pub id_prefixes: &'static [&'static str],
    pub catalogs: &'static [&'static str],
}

/// The addon's fixed manifest document.
pub fn manifest() -> Manifest {
    Manifest {
        id: "org.tally.addon",
        version: env!("CARGO_PKG_VERSION"),
        name: "Tally",
        description: "Records which titles and episodes people are looking for, \
                      so the catalog can grow to meet demand",
        resources: &["stream"],
        types: &["movie", "series"],
        id_prefixes: &["tt"],
        catalogs: &[],
    }
}

pub async fn manifest_handler() -> Response {
    (
        [(header::CACHE_CONTROL, MANIFEST_CACHE_CONTROL)],
        Json(manifest()),
    )
        .into_response()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEntry {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub behavior_hints: BehaviorHints,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub not_web_ready: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreamResponse {
    pub streams: Vec<StreamEntry>,
}

fn placeholder_stream(help_url: Option<&str>) -> StreamEntry {
    StreamEntry {
        name: "Tally".to_string(),
        description: "This title is not available yet.\n\
                      Your request has been recorded and helps decide what gets added next."
            .to_string(),
        external_url: help_url.map(str::to_string),
        behavior_hints: BehaviorHints { not_web_ready: true },
    }
}

/// `GET /stream/{type}/{id}.json`
///
/// Kicks off tracking in the background and answers with the fixed
/// placeholder right away. The response is the same whether the identifier
/// was known, valid, or brand new, and does not wait on the tracker.
pub async fn stream_handler(
    State(state): State<AppState>,
    Path((media_type, id)): Path<(String, String)>,
) -> Response {
    let Ok(media_type) = media_type.parse::<MediaType>() else {
        warn!(%media_type, "stream request for unknown media type");
        return StatusCode::BAD_REQUEST.into_response();
    };

    let full_id = id.strip_suffix(".json").unwrap_or(&id).to_string();
    debug!(%media_type, %full_id, "stream request");

    let tracker = state.tracker.clone();
    tokio::spawn(async move {
        tracker.track(media_type, &full_id).await;
    });

    let body = StreamResponse {
        streams: vec![placeholder_stream(state.config.help_url.as_deref())],
    };

    ([(header::CACHE_CONTROL, STREAM_CACHE_CONTROL)], Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_advertises_the_stream_resource_only() {
        let manifest = manifest();
        assert_eq!(manifest.resources, ["stream"]);
        assert_eq!(manifest.types, ["movie", "series"]);
        assert_eq!(manifest.id_prefixes, ["tt"]);
        assert!(manifest.catalogs.is_empty());
    }

    #[test]
    fn placeholder_omits_external_url_when_unset() {
        let json = serde_json::to_value(placeholder_stream(None)).unwrap();
        assert!(json.get("externalUrl").is_none());
        assert_eq!(json["behaviorHints"]["notWebReady"], true);

        let json = serde_json::to_value(placeholder_stream(Some("https://ops.example/help"))).unwrap();
        assert_eq!(json["externalUrl"], "https://ops.example/help");
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the base title id and the season/episode components.
pub const ID_DELIMITER: char = ':';

/// Full request identifier: `baseId` or `baseId:season:episode`.
///
/// The full string is the unique ledger key. The prefix before the first
/// delimiter is the content identifier shared by every episode of a title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap a raw identifier as received from the stream path.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The complete identifier, unique per ledger record.
    pub fn full(&self) -> &str {
        &self.0
    }

    /// The base title id: everything before the first delimiter, or the
    /// whole string when there is none.
    pub fn content_id(&self) -> &str {
        match self.0.find(ID_DELIMITER) {
            Some(index) => &self.0[..index],
            None => &self.0,
        }
    }

    /// Whether the identifier names a specific episode.
    pub fn is_episode(&self) -> bool {
        self.0.contains(ID_DELIMITER)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

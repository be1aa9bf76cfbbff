//! Playable item model.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A single playable episode or track.
///
/// Items are immutable once constructed and compared by identity: two items
/// with the same id are the same item regardless of metadata differences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayableItem {
    /// Unique opaque identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Author / artist string.
    pub author: String,
    /// Optional artwork location, fetched best-effort for the OS controls.
    pub artwork_url: Option<String>,
    /// Playback source locator handed to the media engine.
    pub stream_url: String,
}

impl PlayableItem {
    /// Construct an item with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            artwork_url: None,
            stream_url: stream_url.into(),
        }
    }

    /// Construct an item with an existing identifier.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Attach an artwork URL.
    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }
}

impl PartialEq for PlayableItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PlayableItem {}

impl Hash for PlayableItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
